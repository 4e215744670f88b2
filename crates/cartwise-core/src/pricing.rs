//! # Pricing Engine
//!
//! Turns a cart snapshot and a role into a [`PriceQuote`].
//!
//! ## Decision Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Promotion Rules                                 │
//! │                                                                         │
//! │  lines == 0  ──────────────────────────────────► (0, 0)                 │
//! │                                                                         │
//! │  lines <= 2  ──┬── VIP    ─────────────────────► total × 0.85           │
//! │                └── COMMON ─────────────────────► total                  │
//! │                                                                         │
//! │  lines >  2  ──┬── VIP and total × 0.85 < bundle ► total × 0.85         │
//! │                └── otherwise ──────────────────► bundle                 │
//! │                                                                         │
//! │  bundle = total − cheapest single line                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Line prices are whole cents, so the total and the bundle price are exact.
//! Only the VIP price needs rounding, and it is rounded half-up once, after
//! the VIP/bundle comparison has been made on the exact value.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::{DiscountRate, Money};
use crate::types::{AppliedDiscount, PriceQuote, ProductLine, UserRole};
use crate::validation::validate_bundle_min_lines;
use crate::{BUNDLE_MIN_LINES, VIP_DISCOUNT_BPS};

// =============================================================================
// Pricing Rules
// =============================================================================

/// Tunable parameters of the two promotions.
///
/// The defaults are 15% for VIP and "more than two lines" for the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Flat reduction for VIP customers.
    pub vip_discount: DiscountRate,

    /// Minimum number of lines for the cheapest-line-free bundle.
    pub bundle_min_lines: usize,
}

impl PricingRules {
    /// Creates rules after checking the bundle threshold.
    ///
    /// ## Errors
    /// `OutOfRange` if `bundle_min_lines` is zero.
    pub fn new(vip_discount: DiscountRate, bundle_min_lines: usize) -> Result<Self, ValidationError> {
        validate_bundle_min_lines(bundle_min_lines)?;
        Ok(PricingRules {
            vip_discount,
            bundle_min_lines,
        })
    }

    /// True when a cart of `line_count` lines qualifies for the bundle.
    #[inline]
    pub fn bundle_applies(&self, line_count: usize) -> bool {
        line_count >= self.bundle_min_lines
    }
}

impl Default for PricingRules {
    fn default() -> Self {
        PricingRules {
            vip_discount: DiscountRate::from_bps(VIP_DISCOUNT_BPS).unwrap_or_default(),
            bundle_min_lines: BUNDLE_MIN_LINES,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Computes the total and the payable price for a cart's lines.
///
/// Pure: same lines and role always give the same quote.
///
/// ## Example
/// ```rust
/// use cartwise_core::money::Money;
/// use cartwise_core::pricing::{calculate_price, PricingRules};
/// use cartwise_core::types::{ProductId, ProductLine, UserRole};
///
/// let t_shirt = ProductId::parse("T_SHIRT").unwrap();
/// let lines = vec![
///     ProductLine::new(t_shirt.clone(), "Tee", Money::from_cents(3599)),
///     ProductLine::new(t_shirt.clone(), "Tee", Money::from_cents(3599)),
///     ProductLine::new(t_shirt, "Tee", Money::from_cents(3599)),
/// ];
///
/// let quote = calculate_price(&lines, UserRole::Common, &PricingRules::default());
/// assert_eq!(quote.final_price.cents(), 7198); // one tee free
/// ```
pub fn calculate_price(lines: &[ProductLine], role: UserRole, rules: &PricingRules) -> PriceQuote {
    let cheapest = match lines.iter().map(ProductLine::price).min() {
        Some(price) => price,
        None => return PriceQuote::empty(),
    };

    let total: Money = lines.iter().map(ProductLine::price).sum();
    let vip_price = total.apply_percentage_discount(rules.vip_discount);

    if !rules.bundle_applies(lines.len()) {
        return if role.is_vip() {
            quote(total, vip_price, AppliedDiscount::Vip)
        } else {
            quote(total, total, AppliedDiscount::None)
        };
    }

    let bundle_price = total - cheapest;

    // compared on the exact value; the rounded VIP price could tie
    if role.is_vip() && total.discounted_is_below(rules.vip_discount, bundle_price) {
        quote(total, vip_price, AppliedDiscount::Vip)
    } else {
        quote(total, bundle_price, AppliedDiscount::Bundle)
    }
}

fn quote(total: Money, final_price: Money, applied_discount: AppliedDiscount) -> PriceQuote {
    PriceQuote {
        cart_total_price: total,
        final_price,
        applied_discount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn lines(ids: &[&str]) -> Vec<ProductLine> {
        let catalog = Catalog::standard();
        ids.iter()
            .map(|id| {
                let (product_id, price) = catalog.lookup(id).unwrap();
                ProductLine::new(product_id, *id, price)
            })
            .collect()
    }

    fn price(ids: &[&str], role: UserRole) -> PriceQuote {
        calculate_price(&lines(ids), role, &PricingRules::default())
    }

    #[test]
    fn test_empty_cart_is_zero_for_any_role() {
        for role in [UserRole::Common, UserRole::Vip] {
            let quote = price(&[], role);
            assert_eq!(quote, PriceQuote::empty());
        }
    }

    #[test]
    fn test_vip_two_lines() {
        let quote = price(&["T_SHIRT", "DRESS"], UserRole::Vip);
        assert_eq!(quote.cart_total_price.cents(), 11674);
        assert_eq!(quote.final_price.cents(), 9923);
        assert_eq!(quote.applied_discount, AppliedDiscount::Vip);
    }

    #[test]
    fn test_vip_beats_bundle_on_large_cart() {
        let quote = price(
            &["T_SHIRT", "T_SHIRT", "T_SHIRT", "T_SHIRT", "JEANS", "DRESS"],
            UserRole::Vip,
        );
        assert_eq!(quote.cart_total_price.cents(), 29021);
        assert_eq!(quote.final_price.cents(), 24668);
        assert_ne!(quote.final_price.cents(), 25422);
        assert_eq!(quote.applied_discount, AppliedDiscount::Vip);
    }

    #[test]
    fn test_common_three_tees_one_free() {
        let quote = price(&["T_SHIRT", "T_SHIRT", "T_SHIRT"], UserRole::Common);
        assert_eq!(quote.cart_total_price.cents(), 10797);
        assert_eq!(quote.final_price.cents(), 7198);
        assert_eq!(quote.applied_discount, AppliedDiscount::Bundle);
    }

    #[test]
    fn test_common_mixed_bundle_drops_cheapest() {
        let quote = price(&["T_SHIRT", "T_SHIRT", "JEANS", "JEANS"], UserRole::Common);
        assert_eq!(quote.cart_total_price.cents(), 20298);
        assert_eq!(quote.final_price.cents(), 16699);
    }

    #[test]
    fn test_vip_takes_bundle_when_cheaper() {
        let quote = price(&["DRESS", "DRESS", "DRESS"], UserRole::Vip);
        assert_eq!(quote.cart_total_price.cents(), 24225);
        assert_eq!(quote.final_price.cents(), 16150);
        assert_eq!(quote.applied_discount, AppliedDiscount::Bundle);
    }

    #[test]
    fn test_common_jeans_and_dresses() {
        let quote = price(&["JEANS", "JEANS", "DRESS", "DRESS"], UserRole::Common);
        assert_eq!(quote.cart_total_price.cents(), 29250);
        assert_eq!(quote.final_price.cents(), 22700);
    }

    #[test]
    fn test_common_four_tees_and_jeans() {
        let quote = price(
            &["T_SHIRT", "T_SHIRT", "T_SHIRT", "T_SHIRT", "JEANS"],
            UserRole::Common,
        );
        assert_eq!(quote.cart_total_price.cents(), 20946);
        assert_eq!(quote.final_price.cents(), 17347);
    }

    #[test]
    fn test_common_small_cart_pays_total() {
        for ids in [&["JEANS"][..], &["DRESS", "T_SHIRT"][..]] {
            let quote = price(ids, UserRole::Common);
            assert_eq!(quote.final_price, quote.cart_total_price);
            assert_eq!(quote.applied_discount, AppliedDiscount::None);
        }
    }

    #[test]
    fn test_final_never_exceeds_total() {
        let carts: [&[&str]; 5] = [
            &["T_SHIRT"],
            &["JEANS", "DRESS"],
            &["DRESS", "DRESS", "DRESS", "DRESS"],
            &["T_SHIRT", "JEANS", "DRESS"],
            &["T_SHIRT", "T_SHIRT", "T_SHIRT", "T_SHIRT", "T_SHIRT", "T_SHIRT"],
        ];
        for ids in carts {
            for role in [UserRole::Common, UserRole::Vip] {
                let quote = price(ids, role);
                assert!(quote.final_price <= quote.cart_total_price);
            }
        }
    }

    #[test]
    fn test_exact_tie_goes_to_bundle() {
        // 100 × 0.75 = 75 exactly, bundle is 100 − 25 = 75: not strictly below
        let id = crate::types::ProductId::parse("COIN").unwrap();
        let lines = vec![
            ProductLine::new(id.clone(), "coin", Money::from_cents(25)),
            ProductLine::new(id.clone(), "coin", Money::from_cents(25)),
            ProductLine::new(id, "coin", Money::from_cents(50)),
        ];
        let rules = PricingRules::new(DiscountRate::from_percent(25).unwrap(), 3).unwrap();
        let quote = calculate_price(&lines, UserRole::Vip, &rules);
        assert_eq!(quote.final_price.cents(), 75);
        assert_eq!(quote.applied_discount, AppliedDiscount::Bundle);
    }

    #[test]
    fn test_custom_rules() {
        let rules = PricingRules::new(DiscountRate::from_percent(10).unwrap(), 2).unwrap();
        let quote = calculate_price(&lines(&["JEANS", "DRESS"]), UserRole::Common, &rules);
        assert_eq!(quote.final_price.cents(), 8075);

        assert!(PricingRules::new(DiscountRate::zero(), 0).is_err());
    }

    #[test]
    fn test_default_rules() {
        let rules = PricingRules::default();
        assert_eq!(rules.vip_discount.bps(), 1500);
        assert!(!rules.bundle_applies(2));
        assert!(rules.bundle_applies(3));
    }

    #[test]
    fn test_huge_prices_do_not_overflow() {
        let gold = crate::types::ProductId::parse("GOLD").unwrap();
        let line = ProductLine::new(gold, "Gold bar", Money::from_cents(i64::MAX / 2 + 1));

        for count in [2, 3] {
            let lines = vec![line.clone(); count];
            for role in [UserRole::Common, UserRole::Vip] {
                let quote = calculate_price(&lines, role, &PricingRules::default());
                assert_eq!(quote.cart_total_price.cents(), i64::MAX);
                assert!(quote.final_price <= quote.cart_total_price);
                assert!(!quote.final_price.is_negative());
            }
        }
    }
}
