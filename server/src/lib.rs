//! Task Server Library
//!
//! This library provides the wiring for the task management API server:
//! configuration management, logging setup, database initialization, and
//! server construction.

pub mod config;
pub mod logging;
pub mod setup;

pub use config::Config;
pub use logging::{init_logging, LogGuards};
pub use setup::{create_database, create_server, ensure_database_directory, initialize_app};
