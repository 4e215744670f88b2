//! # SQLite Cart Store
//!
//! [`CartStore`] over `cartwise-db`. Each call maps to one repository
//! method, and each mutation is one transaction.

use async_trait::async_trait;

use cartwise_core::{Cart, ProductId, ProductLine};
use cartwise_db::Database;

use super::CartStore;
use crate::error::StoreResult;

/// Durable cart store.
#[derive(Debug, Clone)]
pub struct SqliteCartStore {
    db: Database,
}

impl SqliteCartStore {
    /// Wraps an open, migrated database.
    pub fn new(db: Database) -> Self {
        SqliteCartStore { db }
    }

    /// Underlying database handle (health checks, shutdown).
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl CartStore for SqliteCartStore {
    async fn find(&self, user_id: &str) -> StoreResult<Option<Cart>> {
        Ok(self.db.carts().find_by_user(user_id).await?)
    }

    async fn insert(&self, user_id: &str, line: ProductLine) -> StoreResult<Option<String>> {
        let cart_id = self.db.carts().append_line(user_id, &line).await?;
        Ok(Some(cart_id))
    }

    async fn delete(&self, user_id: &str, product_id: &ProductId) -> StoreResult<bool> {
        Ok(self.db.carts().remove_first_line(user_id, product_id).await?)
    }

    async fn clear(&self, user_id: &str) -> StoreResult<()> {
        self.db.carts().clear(user_id).await?;
        Ok(())
    }
}
