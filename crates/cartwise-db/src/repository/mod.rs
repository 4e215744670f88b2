//! # Repository Module
//!
//! Database repository implementations for Cartwise.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteCartStore                                                       │
//! │       │                                                                 │
//! │       │  db.carts().append_line("user-1", &line)                       │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── find_by_user(&self, user_id)                                      │
//! │  ├── append_line(&self, user_id, line)                                 │
//! │  ├── remove_first_line(&self, user_id, product_id)                     │
//! │  ├── clear(&self, user_id)                                             │
//! │  └── line_count(&self, user_id)                                        │
//! │       │                                                                 │
//! │       │  SQL (one transaction per mutation)                             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`cart::CartRepository`] - Cart and cart line operations

pub mod cart;
