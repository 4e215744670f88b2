//! # Validation Module
//!
//! Input validation for cart operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API schema (external)                                        │
//! │  ├── productId ∈ catalog keys                                          │
//! │  └── name is a string                                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CartService (Rust)                                           │
//! │  └── THIS MODULE + catalog lookup: reject again if layer 1 slipped     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (price_cents >= 0)                               │
//! │  └── UNIQUE (user_id)                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_PRICE_CENTS, MAX_PRODUCT_ID_LEN, MAX_PRODUCT_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog product id.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Uppercase ASCII letters, digits and underscores only (`T_SHIRT`)
///
/// ## Example
/// ```rust
/// use cartwise_core::validation::validate_product_id;
///
/// assert!(validate_product_id("JEANS").is_ok());
/// assert!(validate_product_id("jeans").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }

    if id.len() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "productId".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "productId".to_string(),
            reason: "must contain only uppercase letters, digits, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product display name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates the user key the auth layer resolved.
///
/// Only emptiness is checked; the id is otherwise opaque.
pub fn validate_user_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "userId".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (zero is a free item)
/// - At most [`MAX_PRICE_CENTS`]
///
/// ## Example
/// ```rust
/// use cartwise_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(3599).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates the bundle threshold (minimum lines for cheapest-unit-free).
pub fn validate_bundle_min_lines(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::OutOfRange {
            field: "bundle_min_lines".to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("T_SHIRT").is_ok());
        assert!(validate_product_id("DRESS").is_ok());
        assert!(validate_product_id("SKU_42").is_ok());

        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id("T-SHIRT").is_err());
        assert!(validate_product_id("t_shirt").is_err());
        assert!(validate_product_id(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Blue T-Shirt").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("  ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("1").is_ok());
        assert!(validate_user_id("").is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(8075).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
    }

    #[test]
    fn test_validate_bundle_min_lines() {
        assert!(validate_bundle_min_lines(3).is_ok());
        assert!(validate_bundle_min_lines(0).is_err());
    }
}
