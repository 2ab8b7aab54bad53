//! # rainhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `RainStateStore` port defined in `rainhub-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between [`RainState`](rainhub_domain::rain::RainState) and database rows
//!
//! ## Dependency rule
//! Depends on `rainhub-app` (for port traits) and `rainhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod rain_state_store;

pub use pool::{Config, Database};
pub use rain_state_store::SqliteRainStateStore;
