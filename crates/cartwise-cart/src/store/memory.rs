//! # In-Memory Cart Store
//!
//! Per-user locking over a sharded map.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DashMap<user_id, Arc<Mutex<Option<Cart>>>>                             │
//! │                                                                         │
//! │  "user-1" ──► Arc ──► Mutex ──► Some(Cart { products: [..] })          │
//! │  "user-2" ──► Arc ──► Mutex ──► None        (cleared)                  │
//! │                                                                         │
//! │  1. Shard lock: fetch or create the slot, clone the Arc, release        │
//! │  2. Slot lock:  await the user's Mutex, mutate, release                 │
//! │                                                                         │
//! │  Clear empties the slot, then drops it from the map only if no other   │
//! │  task holds a clone. Clones are only taken under the shard lock, so    │
//! │  two tasks racing on one user always contend on the same Mutex.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use cartwise_core::{Cart, ProductId, ProductLine};

use super::CartStore;
use crate::error::StoreResult;

type Slot = Arc<Mutex<Option<Cart>>>;

/// Process-local cart store.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    slots: DashMap<String, Slot>,
}

impl InMemoryCartStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing slot for the user, without creating one.
    fn existing_slot(&self, user_id: &str) -> Option<Slot> {
        self.slots.get(user_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drops the user's slot if it is empty and referenced only by the map.
    ///
    /// Runs under the shard write lock, so no task can clone the slot
    /// between the reference check and the removal.
    fn prune(&self, user_id: &str) -> bool {
        self.slots
            .remove_if(user_id, |_, slot| {
                Arc::strong_count(slot) == 1
                    && slot.try_lock().map_or(false, |cart| cart.is_none())
            })
            .is_some()
    }

    /// Number of users currently holding a slot.
    pub fn tracked_users(&self) -> usize {
        self.slots.len()
    }

    /// Slot for the user, created on first use.
    fn slot(&self, user_id: &str) -> Slot {
        // the shard guard drops at the end of this statement, before any await
        Arc::clone(&self.slots.entry(user_id.to_string()).or_default())
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find(&self, user_id: &str) -> StoreResult<Option<Cart>> {
        let Some(slot) = self.existing_slot(user_id) else {
            return Ok(None);
        };

        let guard = slot.lock().await;
        Ok(guard.clone())
    }

    async fn insert(&self, user_id: &str, line: ProductLine) -> StoreResult<Option<String>> {
        let slot = self.slot(user_id);
        let mut guard = slot.lock().await;

        let cart = guard.get_or_insert_with(|| {
            debug!(user_id = %user_id, "Creating cart");
            Cart::new(user_id)
        });

        debug!(user_id = %user_id, product_id = %line.id, "Appending cart line");
        cart.push_line(line);

        Ok(Some(cart.cart_id.clone()))
    }

    async fn delete(&self, user_id: &str, product_id: &ProductId) -> StoreResult<bool> {
        let Some(slot) = self.existing_slot(user_id) else {
            return Ok(false);
        };

        let mut guard = slot.lock().await;
        let removed = match guard.as_mut() {
            Some(cart) => cart.remove_first(product_id),
            None => false,
        };

        debug!(user_id = %user_id, product_id = %product_id, removed, "Removed cart line");
        Ok(removed)
    }

    async fn clear(&self, user_id: &str) -> StoreResult<()> {
        if let Some(slot) = self.existing_slot(user_id) {
            slot.lock().await.take();
            debug!(user_id = %user_id, "Cleared cart");
        }
        self.prune(user_id);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
