//! Task Core Library
//!
//! This crate provides the foundational domain models, business logic, and
//! trait interfaces for the task backend. All other crates depend on the
//! types and interfaces defined here.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`models`] - Core domain models (Task, User, update payloads)
//! - [`error`] - Error types and result handling
//! - [`repository`] - Repository traits for data persistence
//! - [`validation`] - Input validation utilities
//! - [`stamp`] - Correlation stamps for log lines
//!
//! # Example
//!
//! ```rust
//! use taskd_core::{
//!     models::{NewTask, Task},
//!     validation::TaskValidator,
//! };
//!
//! let input = NewTask {
//!     title: "Write spec".to_string(),
//!     description: String::new(),
//!     completed: false,
//! };
//!
//! // Validate the input before building the task
//! TaskValidator::validate_new_task(&input).unwrap();
//! let task = Task::new(input);
//! assert!(task.id.is_none());
//! ```

pub mod error;
pub mod models;
pub mod repository;
pub mod stamp;
pub mod validation;

// Re-export commonly used types at the crate root for convenience
pub use error::{Result, TaskError};
pub use models::{Credentials, NewTask, NewUser, Task, UpdateTask, User};
pub use repository::{TaskRepository, UserRepository};
pub use stamp::Stamp;
pub use validation::{CredentialValidator, TaskValidator};

/// Current version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_crate_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(CRATE_NAME, "taskd-core");
    }

    #[test]
    fn test_re_exports() {
        use crate::{Stamp, TaskError};

        let error = TaskError::not_found_id(1);
        assert!(error.is_not_found());

        let stamp = Stamp::next();
        assert!(stamp.to_string().contains('['));
    }
}
