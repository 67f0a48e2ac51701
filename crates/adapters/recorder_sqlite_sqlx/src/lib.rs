//! # mapcard-adapter-recorder-sqlite-sqlx
//!
//! `SQLite` state recorder using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Record entity states and answer bounded history queries
//! - Implement the `HistoryProvider` port defined in `mapcard-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `mapcard-app` (for port traits) and `mapcard-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod recorder;

pub use error::RecorderError;
pub use pool::connect;
pub use recorder::SqliteRecorder;
