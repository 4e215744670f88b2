//! # Cart Repository
//!
//! Database operations for carts and their lines.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Lifecycle                                    │
//! │                                                                         │
//! │  1. FIRST INSERT                                                       │
//! │     └── append_line() → carts row created, line at position 1          │
//! │                                                                         │
//! │  2. MORE INSERTS                                                       │
//! │     └── append_line() → same cart_id, position = MAX + 1               │
//! │                                                                         │
//! │  3. DELETE                                                             │
//! │     └── remove_first_line() → lowest position with that product_id    │
//! │                                                                         │
//! │  4. CLEAR                                                              │
//! │     └── clear() → carts row dropped, lines cascade                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Every mutation opens its transaction with a write statement. SQLite then
//! takes the writer lock up front, so concurrent mutations of the same cart
//! queue behind each other instead of failing a read-to-write upgrade.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cartwise_core::{Cart, ProductId, ProductLine};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    cart_id: String,
    user_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    product_id: ProductId,
    name: String,
    price_cents: i64,
}

impl From<LineRow> for ProductLine {
    fn from(row: LineRow) -> Self {
        ProductLine {
            id: row.product_id,
            name: row.name,
            price_cents: row.price_cents,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads a user's cart with its lines in insertion order.
    ///
    /// Both reads share one transaction so the lines match the cart row.
    pub async fn find_by_user(&self, user_id: &str) -> DbResult<Option<Cart>> {
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let row: Option<CartRow> = sqlx::query_as(
            r#"
            SELECT cart_id, user_id, created_at, updated_at
            FROM carts
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await.map_err(DbError::transaction)?;
            return Ok(None);
        };

        let lines: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT product_id, name, price_cents
            FROM cart_lines
            WHERE cart_id = ?1
            ORDER BY position
            "#,
        )
        .bind(&row.cart_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        Ok(Some(Cart {
            cart_id: row.cart_id,
            user_id: row.user_id,
            products: lines.into_iter().map(ProductLine::from).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    /// Appends a line to the user's cart, creating the cart if needed.
    ///
    /// ## Returns
    /// The cart id (unchanged if the cart already existed).
    pub async fn append_line(&self, user_id: &str, line: &ProductLine) -> DbResult<String> {
        let now = Utc::now();
        let candidate_id = Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        // Upsert first: takes the writer lock and creates the cart lazily.
        sqlx::query(
            r#"
            INSERT INTO carts (cart_id, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = excluded.updated_at
            "#,
        )
        .bind(&candidate_id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let cart_id: String = sqlx::query_scalar("SELECT cart_id FROM carts WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        sqlx::query(
            r#"
            INSERT INTO cart_lines (cart_id, position, product_id, name, price_cents, added_at)
            VALUES (
                ?1,
                COALESCE((SELECT MAX(position) FROM cart_lines WHERE cart_id = ?1), 0) + 1,
                ?2, ?3, ?4, ?5
            )
            "#,
        )
        .bind(&cart_id)
        .bind(line.id.as_str())
        .bind(&line.name)
        .bind(line.price_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(
            user_id = %user_id,
            cart_id = %cart_id,
            product_id = %line.id,
            created = cart_id == candidate_id,
            "Appended cart line"
        );

        Ok(cart_id)
    }

    /// Removes the earliest line carrying `product_id`.
    ///
    /// ## Returns
    /// `true` if a line was removed, `false` if the user has no cart or no
    /// line matched.
    pub async fn remove_first_line(&self, user_id: &str, product_id: &ProductId) -> DbResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let removed = sqlx::query(
            r#"
            DELETE FROM cart_lines
            WHERE id = (
                SELECT l.id
                FROM cart_lines l
                JOIN carts c ON c.cart_id = l.cart_id
                WHERE c.user_id = ?1 AND l.product_id = ?2
                ORDER BY l.position
                LIMIT 1
            )
            "#,
        )
        .bind(user_id)
        .bind(product_id.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed > 0 {
            sqlx::query("UPDATE carts SET updated_at = ?2 WHERE user_id = ?1")
                .bind(user_id)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(user_id = %user_id, product_id = %product_id, removed, "Removed cart line");
        Ok(removed > 0)
    }

    /// Drops the user's cart and all of its lines.
    ///
    /// ## Returns
    /// `true` if a cart existed. Clearing an absent cart is not an error.
    pub async fn clear(&self, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM carts WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let existed = result.rows_affected() > 0;
        debug!(user_id = %user_id, existed, "Cleared cart");
        Ok(existed)
    }

    /// Number of lines in the user's cart (0 when there is no cart).
    pub async fn line_count(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM cart_lines l
            JOIN carts c ON c.cart_id = l.cart_id
            WHERE c.user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
