//! # cartwise-core: Pure Business Logic for Cartwise
//!
//! This crate holds every rule that decides what a customer pays. It has
//! zero I/O dependencies: carts arrive as snapshots, quotes leave as values.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cartwise Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            API layer (routing, auth, schema) - external         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ User { id, role }                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         cartwise-cart (CartService, CartStore)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cartwise-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  catalog  │  │  pricing  │  │   │
//! │  │   │   Cart    │  │   Money   │  │ T_SHIRT.. │  │ VIP/Bundle│  │   │
//! │  │   │ UserRole  │  │ Discount  │  │           │  │   quote   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Cart, ProductLine, User, UserRole, ...)
//! - [`money`] - Money in integer cents and validated discount rates
//! - [`catalog`] - Fixed price list keyed by product id
//! - [`pricing`] - The promotion engine
//! - [`validation`] - Input checks shared by the service layer
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cartwise_core::catalog::Catalog;
//! use cartwise_core::pricing::{calculate_price, PricingRules};
//! use cartwise_core::types::{ProductLine, UserRole};
//!
//! let catalog = Catalog::standard();
//! let lines: Vec<ProductLine> = ["T_SHIRT", "DRESS"]
//!     .iter()
//!     .map(|id| {
//!         let (product_id, price) = catalog.lookup(id).unwrap();
//!         ProductLine::new(product_id, "demo", price)
//!     })
//!     .collect();
//!
//! let quote = calculate_price(&lines, UserRole::Vip, &PricingRules::default());
//! assert_eq!(quote.cart_total_price.cents(), 11674); // $116.74
//! assert_eq!(quote.final_price.cents(), 9923);       // $99.23
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{CoreError, ValidationError};
pub use money::{DiscountRate, Money};
pub use pricing::{calculate_price, PricingRules};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat VIP reduction in basis points (1500 = 15%).
pub const VIP_DISCOUNT_BPS: u32 = 1500;

/// Number of lines at which the "cheapest unit free" bundle kicks in.
///
/// A cart needs MORE than two lines, so the threshold is three.
pub const BUNDLE_MIN_LINES: usize = 3;

/// Largest accepted unit price in cents ($1,000,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Maximum length of a product id key.
pub const MAX_PRODUCT_ID_LEN: usize = 50;

/// Maximum length of a product display name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;
