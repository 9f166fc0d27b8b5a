//! HTTP API for the task service
//!
//! This crate implements the REST surface over the core repository traits:
//! user registration and login under `/auth`, bearer-token protected task
//! CRUD under `/api/v1/tasks`, and a `/health` endpoint.
//!
//! # Overview
//!
//! The crate is organized around a handful of small modules:
//!
//! - [`server`] builds the router and runs it with graceful shutdown
//! - [`auth`] holds the register/login handlers and the [`AuthUser`] extractor
//! - [`tasks`] holds the CRUD handlers
//! - [`credentials`] does password hashing and token mint/verify
//! - [`error`] maps domain errors onto HTTP status codes and JSON bodies
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskd_db::{Database, SqliteTaskRepository, SqliteUserRepository};
//! use taskd_http::{ApiServer, JwtKeys};
//!
//! async fn start_server() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let db = Arc::new(Database::from_url("tasks.db")?);
//!     db.migrate().await?;
//!
//!     let server = ApiServer::new(
//!         Arc::new(SqliteTaskRepository::new(db.clone())),
//!         Arc::new(SqliteUserRepository::new(db)),
//!         JwtKeys::new(b"change-me", chrono::Duration::hours(1)),
//!     );
//!     server.serve("127.0.0.1:3000", async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod credentials;
pub mod error;
pub mod request_logger;
pub mod server;
pub mod tasks;

// Re-export key types for easier usage
pub use auth::AuthUser;
pub use credentials::{Claims, JwtKeys};
pub use error::ApiError;
pub use server::{ApiServer, AppState};

// Re-export core types for external consumers
pub use taskd_core::{
    error::{Result, TaskError},
    models::{Credentials, NewTask, NewUser, Task, UpdateTask, User},
    repository::{TaskRepository, UserRepository},
};
