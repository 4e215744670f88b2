//! # cartwise-cart: Cart Store and Mutation Service
//!
//! Wires the pure rules from `cartwise-core` to a shared, per-user cart store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cartwise Request Flow                            │
//! │                                                                         │
//! │  API layer (external) resolves User { id, name, role }                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  cartwise-cart (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   CartService ──── Catalog lookup, validation, pricing          │   │
//! │  │       │                                                         │   │
//! │  │       ▼                                                         │   │
//! │  │   Arc<dyn CartStore>                                            │   │
//! │  │       ├── InMemoryCartStore  (DashMap of per-user Mutex slots)  │   │
//! │  │       └── SqliteCartStore    (cartwise-db transactions)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Result<_, CartError> ──► ApiError { code, message } for the client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - The `CartStore` capability and its two backends
//! - [`service`] - Cart mutation service and price calculation
//! - [`config`] - TOML + environment configuration
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - Store, cart, config and API error types
//!
//! ## Usage
//!
//! ```rust
//! use cartwise_cart::service::{CartService, InsertProduct};
//! use cartwise_core::{User, UserRole};
//!
//! # tokio_test_block(async {
//! let service = CartService::in_memory();
//! let user = User::new("42", "Ada", UserRole::Vip);
//!
//! service
//!     .insert_product(&user, InsertProduct::new("T_SHIRT", "Basic tee"))
//!     .await
//!     .unwrap();
//! service
//!     .insert_product(&user, InsertProduct::new("DRESS", "Summer dress"))
//!     .await
//!     .unwrap();
//!
//! let quote = service.calculate_price(&user).await.unwrap();
//! assert_eq!(quote.final_price.cents(), 9923);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, StoreBackend};
pub use error::{ApiError, CartError, ConfigError, ErrorCode, StoreError};
pub use service::{CartService, DeleteProduct, InsertProduct};
pub use store::{CartStore, InMemoryCartStore, SqliteCartStore};
