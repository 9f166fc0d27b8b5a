//! Mock implementations and test utilities for the task backend
//!
//! This crate provides testing infrastructure including:
//! - Mock implementations of the repository traits with error injection
//!   and call tracking
//! - A connector double that fails a scripted number of opens, for
//!   exercising the session retry budget
//! - Standard fixtures for tasks and credentials

pub mod connector;
pub mod fixtures;
pub mod repository;

pub use connector::FlakyConnector;
pub use repository::{MockTaskRepository, MockUserRepository};
