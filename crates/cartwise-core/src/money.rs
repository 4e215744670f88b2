//! # Money Module
//!
//! Provides the `Money` type for monetary values and `DiscountRate` for
//! percentage reductions.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    35.99 + 65.50 + 80.75 = 182.23999999999998  ❌                       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3599 + 6550 + 8075 = 18224 cents = $182.24  ✅                       │
//! │                                                                         │
//! │  Rounding happens exactly once, when a percentage is applied.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cartwise_core::money::{DiscountRate, Money};
//!
//! let total = Money::from_cents(11674); // $116.74
//! let vip = DiscountRate::from_bps(1500).unwrap(); // 15%
//! assert_eq!(total.apply_percentage_discount(vip).cents(), 9923); // $99.23
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::error::ValidationError;

/// Basis points in 100%.
const FULL_BPS: u32 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Catalog price ──► ProductLine.price_cents (frozen at insert)          │
/// │                           │                                             │
/// │                           ▼                                             │
/// │                    Σ lines = cart total ──► VIP / Bundle ──► final     │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use cartwise_core::money::Money;
    ///
    /// let price = Money::from_cents(3599); // $35.99
    /// assert_eq!(price.cents(), 3599);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from dollars and cents.
    ///
    /// ## Example
    /// ```rust
    /// use cartwise_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(65, 50).cents(), 6550);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the amount in dollars as a float. Display only.
    #[inline]
    pub fn as_major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns what remains payable after a percentage discount, rounded
    /// half-up to the cent.
    ///
    /// ## Rounding
    /// The payable amount is rounded, not the discount:
    /// `(cents × (10000 − bps) + 5000) / 10000`.
    /// For $290.21 at 15% off: 29021 × 8500 = 246678500 → 24667.85 → 24668.
    ///
    /// ## Example
    /// ```rust
    /// use cartwise_core::money::{DiscountRate, Money};
    ///
    /// let total = Money::from_cents(29021);
    /// let rate = DiscountRate::from_bps(1500).unwrap();
    /// assert_eq!(total.apply_percentage_discount(rate).cents(), 24668);
    /// ```
    pub fn apply_percentage_discount(&self, rate: DiscountRate) -> Money {
        let scaled = self.0 as i128 * rate.remaining_bps() as i128;
        let half = FULL_BPS as i128 / 2;
        let rounded = if scaled < 0 {
            (scaled - half) / FULL_BPS as i128
        } else {
            (scaled + half) / FULL_BPS as i128
        };
        Money(rounded as i64)
    }

    /// Compares the *unrounded* discounted value of `self` against `other`.
    ///
    /// Returns true when `self × (1 − rate)` is strictly less than `other`,
    /// evaluated exactly in basis points so that rounding can never flip the
    /// comparison.
    pub fn discounted_is_below(&self, rate: DiscountRate, other: Money) -> bool {
        let lhs = self.0 as i128 * rate.remaining_bps() as i128;
        let rhs = other.0 as i128 * FULL_BPS as i128;
        lhs < rhs
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$35.99`. Debug/log output only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Arithmetic saturates at the i64 bounds instead of overflowing, so summing
// any cart is total.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Percentage reduction in basis points (1 bps = 0.01%).
///
/// ## Why Basis Points?
/// 1500 bps = 15% keeps the rate an integer, so `Money × rate` stays in
/// integer arithmetic until the final rounding step.
///
/// ## Valid Range
/// `0..=10000` (0% to 100%). Construction outside that range fails, so a
/// `DiscountRate` in hand is always applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    pub fn from_bps(bps: u32) -> Result<Self, ValidationError> {
        if bps > FULL_BPS {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: FULL_BPS as i64,
            });
        }
        Ok(DiscountRate(bps))
    }

    /// Creates a discount rate from a whole percentage.
    ///
    /// ## Example
    /// ```rust
    /// use cartwise_core::money::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::from_percent(15).unwrap().bps(), 1500);
    /// assert!(DiscountRate::from_percent(101).is_err());
    /// ```
    pub fn from_percent(percent: u32) -> Result<Self, ValidationError> {
        if percent > 100 {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(DiscountRate(percent * 100))
    }

    /// No discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Share of the price that is still paid, in basis points.
    #[inline]
    pub const fn remaining_bps(&self) -> u32 {
        FULL_BPS - self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

impl TryFrom<u32> for DiscountRate {
    type Error = ValidationError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        DiscountRate::from_bps(bps)
    }
}

impl From<DiscountRate> for u32 {
    fn from(rate: DiscountRate) -> Self {
        rate.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
