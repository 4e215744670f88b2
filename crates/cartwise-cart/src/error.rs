//! # Cart Error Types
//!
//! What the store, the service and the configuration loader can fail with,
//! plus the serializable envelope handed to the API layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Cartwise                               │
//! │                                                                         │
//! │  DbError ──► StoreError ──┐                                            │
//! │                           ├──► CartError ──► ApiError { code, message } │
//! │  ValidationError ─────────┘                                             │
//! │                                                                         │
//! │  ┌──────────────────┬───────────────────┬────────────────────────────┐ │
//! │  │ CartError        │ ErrorCode         │ message                    │ │
//! │  ├──────────────────┼───────────────────┼────────────────────────────┤ │
//! │  │ NotFound         │ NOT_FOUND         │ Cart not found! ...        │ │
//! │  │ Validation       │ VALIDATION_ERROR  │ field detail               │ │
//! │  │ MutationFailure  │ CART_ERROR        │ An error has occurred ...  │ │
//! │  │ ProductNotInCart │ CART_ERROR        │ No product were found ...  │ │
//! │  │ Store            │ DATABASE_ERROR    │ generic, detail logged     │ │
//! │  └──────────────────┴───────────────────┴────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use cartwise_core::{CoreError, ValidationError};
use cartwise_db::DbError;

// =============================================================================
// Store Error
// =============================================================================

/// Failure of a cart store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite backend failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Backend cannot serve requests at all.
    #[error("Cart store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Cart Error
// =============================================================================

/// Failures signalled by the cart mutation service.
///
/// The `Display` text of the first four variants is shown to end users as-is.
#[derive(Debug, Error)]
pub enum CartError {
    /// The user has no cart.
    #[error("Cart not found! Try add some products.")]
    NotFound,

    /// Input rejected before touching the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store accepted the insert but produced no cart id.
    #[error("An error has occurred while trying to insert the product.")]
    MutationFailure,

    /// Delete matched no line in an existing cart.
    #[error("No product were found to be removed from the cart.")]
    ProductNotInCart,

    /// Backend failure, fatal to the request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for service operations.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    /// Config file could not be written.
    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    /// A value is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The configured store could not be opened.
    #[error("Failed to open cart store: {0}")]
    StoreInit(#[from] DbError),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

impl From<CoreError> for ConfigError {
    fn from(err: CoreError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// API Error
// =============================================================================

/// Error envelope for the API layer.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Cart not found! Try add some products."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No cart for the user
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart mutation could not be applied
    CartError,

    /// Store backend failed
    DatabaseError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts cart errors to API errors.
///
/// Store failures are logged with full detail; the client only sees a
/// generic message.
impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotFound => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CartError::Validation(e) => ApiError::validation(e.to_string()),
            CartError::MutationFailure | CartError::ProductNotInCart => {
                ApiError::cart(err.to_string())
            }
            CartError::Store(StoreError::Database(e)) => {
                tracing::error!("Cart store database failure: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            CartError::Store(StoreError::Unavailable(e)) => {
                tracing::error!("Cart store unavailable: {}", e);
                ApiError::internal("Cart store unavailable")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            CartError::NotFound.to_string(),
            "Cart not found! Try add some products."
        );
        assert_eq!(
            CartError::MutationFailure.to_string(),
            "An error has occurred while trying to insert the product."
        );
        assert_eq!(
            CartError::ProductNotInCart.to_string(),
            "No product were found to be removed from the cart."
        );
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: CartError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, CartError::Validation(_)));
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(ApiError::from(err).code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_api_error_codes() {
        assert_eq!(ApiError::from(CartError::NotFound).code, ErrorCode::NotFound);
        assert_eq!(
            ApiError::from(CartError::ProductNotInCart).code,
            ErrorCode::CartError
        );
        assert_eq!(
            ApiError::from(CartError::MutationFailure).code,
            ErrorCode::CartError
        );
    }

    #[test]
    fn test_database_detail_is_hidden() {
        let err = CartError::Store(StoreError::Database(DbError::QueryFailed(
            "no such table: carts".to_string(),
        )));
        let api = ApiError::from(err);
        assert_eq!(api.code, ErrorCode::DatabaseError);
        assert!(!api.message.contains("carts"));
    }

    #[test]
    fn test_api_error_serialization() {
        let api = ApiError::from(CartError::NotFound);
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Cart not found! Try add some products.");
    }
}
