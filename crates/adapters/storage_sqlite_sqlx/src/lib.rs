//! # homelink-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `KeyValueStore` port defined in `homelink-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//!
//! ## Dependency rule
//! Depends on `homelink-app` (for port traits) and `homelink-domain` (for error types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod kv_store;
pub mod pool;

pub use kv_store::SqliteKeyValueStore;
pub use pool::{Config, Database};
