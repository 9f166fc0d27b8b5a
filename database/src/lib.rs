//! SQLite persistence for the task backend
//!
//! This crate implements the repository traits from `taskd-core` on top of a
//! resilient single-connection session. Statements that fail with transient
//! connection-class errors are re-bound and re-issued after a reconnect, up
//! to a fixed budget; deterministic failures propagate immediately.
//!
//! # Features
//!
//! - Single-connection sessions with bounded reconnect-and-retry
//! - A [`Connect`] seam so tests can script connection failures
//! - Owned statement parameters that survive retry re-binding
//! - Embedded schema migrations
//! - WAL mode for file databases, memory journal for `:memory:`
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use taskd_db::{Database, SqliteTaskRepository};
//! use taskd_core::repository::TaskRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(Database::from_url(":memory:")?);
//!     db.migrate().await?;
//!
//!     let repo = SqliteTaskRepository::new(db);
//!     repo.health_check().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod params;
pub mod session;
pub mod tasks;
pub mod users;

pub use params::SqlParam;
pub use session::{Connect, Database, DbSession, SqliteConnector, MAX_ATTEMPTS, RECONNECT_BACKOFF};
pub use tasks::SqliteTaskRepository;
pub use users::SqliteUserRepository;

// Re-export commonly used types from taskd-core for convenience
pub use taskd_core::{
    error::{Result, TaskError},
    models::{NewTask, NewUser, Task, UpdateTask, User},
    repository::{TaskRepository, UserRepository},
};

/// Schema migrations embedded at compile time
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
