//! # Cart Store
//!
//! The keyed, shared collection of per-user carts.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartStore Contract                               │
//! │                                                                         │
//! │  find(user)            → Some(cart) | None            no side effects   │
//! │  insert(user, line)    → Some(cart_id) | None         creates lazily    │
//! │  delete(user, product) → true | false                 first match only  │
//! │  clear(user)           → ()                           idempotent        │
//! │                                                                         │
//! │  Every operation on one user key is serialized.                         │
//! │  Operations on different keys never share a lock.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backends
//! - [`InMemoryCartStore`] - process-local, default, used by tests
//! - [`SqliteCartStore`] - transactional, backed by `cartwise-db`

use async_trait::async_trait;

use cartwise_core::{Cart, ProductId, ProductLine};

use crate::error::StoreResult;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryCartStore;
pub use sqlite::SqliteCartStore;

/// Capability the service uses to read and mutate carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the user's cart, or `None` if the user has none.
    async fn find(&self, user_id: &str) -> StoreResult<Option<Cart>>;

    /// Appends a line, creating the cart if absent.
    ///
    /// ## Returns
    /// The cart id. `None` means the backend produced no id even though it
    /// reported no error; the service treats that as a failed insert.
    async fn insert(&self, user_id: &str, line: ProductLine) -> StoreResult<Option<String>>;

    /// Removes the first line (in insertion order) whose id matches.
    ///
    /// ## Returns
    /// `false` when the user has no cart or no line matched.
    async fn delete(&self, user_id: &str, product_id: &ProductId) -> StoreResult<bool>;

    /// Empties the user's cart. A later `find` returns `None`.
    async fn clear(&self, user_id: &str) -> StoreResult<()>;
}
