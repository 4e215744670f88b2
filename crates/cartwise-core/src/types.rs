//! # Domain Types
//!
//! Core domain types used throughout Cartwise.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Cart       │   │   ProductLine   │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  cart_id (UUID) │◄──│  id (ProductId) │   │  id             │       │
//! │  │  user_id        │   │  name           │   │  name           │       │
//! │  │  products[]     │   │  price_cents    │   │  role           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │    UserRole     │   │   PriceQuote    │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  Common         │   │  total          │                              │
//! │  │  Vip            │   │  final          │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `ProductLine` freezes the catalog price at the moment it is added.
//! Later catalog changes never reprice lines already in a cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::validate_product_id;

// =============================================================================
// Product Id
// =============================================================================

/// Catalog key such as `T_SHIRT`.
///
/// Constructed through [`ProductId::parse`], which enforces the key format.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct ProductId(String);

impl ProductId {
    /// Parses and validates a product id.
    ///
    /// ## Example
    /// ```rust
    /// use cartwise_core::types::ProductId;
    ///
    /// assert!(ProductId::parse("T_SHIRT").is_ok());
    /// assert!(ProductId::parse("").is_err());
    /// assert!(ProductId::parse("t-shirt").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        validate_product_id(raw)?;
        Ok(ProductId(raw.to_string()))
    }

    /// Wraps a key already known to be well-formed (built-in catalog).
    pub(crate) fn from_trusted(raw: &str) -> Self {
        ProductId(raw.to_string())
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductId::parse(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Product Line
// =============================================================================

/// One unit of a product in a cart.
///
/// Duplicate ids are allowed: three T-shirts are three lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    /// Catalog key.
    pub id: ProductId,

    /// Display name supplied by the client at insertion.
    pub name: String,

    /// Unit price in cents at time of adding (frozen).
    pub price_cents: i64,
}

impl ProductLine {
    /// Creates a line with the given frozen price.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Self {
        ProductLine {
            id,
            name: name.into(),
            price_cents: price.cents(),
        }
    }

    /// Returns the frozen price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A user's cart.
///
/// ## Invariants
/// - One cart per `user_id` (enforced by the store)
/// - `products` keeps insertion order
/// - `cart_id` never changes after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Opaque id assigned at creation. Never parse it.
    pub cart_id: String,

    /// Owner of the cart.
    pub user_id: String,

    /// Lines in insertion order.
    pub products: Vec<ProductLine>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart with a fresh UUID v4 id.
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Cart {
            cart_id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            products: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a line to the end of the sequence.
    pub fn push_line(&mut self, line: ProductLine) {
        self.products.push(line);
        self.updated_at = Utc::now();
    }

    /// Removes the first line whose id matches, scanning in insertion order.
    ///
    /// ## Returns
    /// `true` if exactly one line was removed, `false` if none matched.
    pub fn remove_first(&mut self, product_id: &ProductId) -> bool {
        match self.products.iter().position(|line| &line.id == product_id) {
            Some(index) => {
                self.products.remove(index);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Number of lines (units) in the cart.
    pub fn line_count(&self) -> usize {
        self.products.len()
    }

    /// Number of lines carrying the given id.
    pub fn count_of(&self, product_id: &ProductId) -> usize {
        self.products.iter().filter(|line| &line.id == product_id).count()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Sum of all frozen line prices.
    pub fn total(&self) -> Money {
        self.products.iter().map(ProductLine::price).sum()
    }
}

// =============================================================================
// User
// =============================================================================

/// Customer tier driving the promotion rules.
///
/// Closed on purpose: the rule table has exactly two rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular customer.
    #[default]
    Common,
    /// Gets the flat percentage discount.
    Vip,
}

impl UserRole {
    /// Returns true for VIP customers.
    #[inline]
    pub const fn is_vip(&self) -> bool {
        matches!(self, UserRole::Vip)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Common => write!(f, "COMMON"),
            UserRole::Vip => write!(f, "VIP"),
        }
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "COMMON" => Ok(UserRole::Common),
            "VIP" => Ok(UserRole::Vip),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["COMMON".to_string(), "VIP".to_string()],
            }),
        }
    }
}

/// Authenticated caller, resolved by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
}

impl User {
    /// Creates a user reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        User {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

// =============================================================================
// Price Quote
// =============================================================================

/// Which promotion produced the final price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliedDiscount {
    /// Final price equals the cart total.
    #[default]
    None,
    /// Flat VIP percentage.
    Vip,
    /// Cheapest line free.
    Bundle,
}

/// Output of the pricing engine. Both amounts are whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Sum of line prices, before any discount.
    pub cart_total_price: Money,

    /// What the customer pays.
    pub final_price: Money,

    pub applied_discount: AppliedDiscount,
}

impl PriceQuote {
    /// Quote for a cart with no lines.
    pub const fn empty() -> Self {
        PriceQuote {
            cart_total_price: Money::zero(),
            final_price: Money::zero(),
            applied_discount: AppliedDiscount::None,
        }
    }

    /// Amount saved by the applied discount.
    pub fn savings(&self) -> Money {
        self.cart_total_price - self.final_price
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, cents: i64) -> ProductLine {
        ProductLine::new(ProductId::parse(id).unwrap(), id, Money::from_cents(cents))
    }

    #[test]
    fn test_new_cart_is_empty_with_uuid() {
        let cart = Cart::new("user-1");
        assert!(cart.is_empty());
        assert_eq!(cart.user_id, "user-1");
        assert!(Uuid::parse_str(&cart.cart_id).is_ok());
    }

    #[test]
    fn test_remove_first_only_removes_one_duplicate() {
        let mut cart = Cart::new("user-1");
        cart.push_line(line("T_SHIRT", 3599));
        cart.push_line(line("JEANS", 6550));
        cart.push_line(line("T_SHIRT", 3599));

        let t_shirt = ProductId::parse("T_SHIRT").unwrap();
        assert!(cart.remove_first(&t_shirt));
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.count_of(&t_shirt), 1);
        // the earliest T_SHIRT went, so JEANS is now first
        assert_eq!(cart.products[0].id.as_str(), "JEANS");
    }

    #[test]
    fn test_remove_first_missing_returns_false() {
        let mut cart = Cart::new("user-1");
        cart.push_line(line("DRESS", 8075));

        let jeans = ProductId::parse("JEANS").unwrap();
        assert!(!cart.remove_first(&jeans));
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_cart_total() {
        let mut cart = Cart::new("user-1");
        cart.push_line(line("T_SHIRT", 3599));
        cart.push_line(line("DRESS", 8075));
        assert_eq!(cart.total().cents(), 11674);
    }

    #[test]
    fn test_user_role_parsing_and_serde() {
        assert_eq!("vip".parse::<UserRole>().unwrap(), UserRole::Vip);
        assert_eq!("COMMON".parse::<UserRole>().unwrap(), UserRole::Common);
        assert!("ADMIN".parse::<UserRole>().is_err());

        assert_eq!(serde_json::to_string(&UserRole::Vip).unwrap(), "\"VIP\"");
        let role: UserRole = serde_json::from_str("\"COMMON\"").unwrap();
        assert_eq!(role, UserRole::Common);
    }

    #[test]
    fn test_price_quote_serializes_camel_case() {
        let quote = PriceQuote {
            cart_total_price: Money::from_cents(11674),
            final_price: Money::from_cents(9923),
            applied_discount: AppliedDiscount::Vip,
        };
        let json = serde_json::to_value(quote).unwrap();
        assert_eq!(json["cartTotalPrice"], 11674);
        assert_eq!(json["finalPrice"], 9923);
        assert_eq!(json["appliedDiscount"], "VIP");
        assert_eq!(quote.savings().cents(), 1751);
    }
}
