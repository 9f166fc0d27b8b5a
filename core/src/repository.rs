use crate::{
    error::Result,
    models::{NewUser, Task, User},
};
use async_trait::async_trait;

/// Repository trait for task persistence and retrieval operations
///
/// This trait defines the interface for all task data operations.
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// List every stored task in insertion order
    ///
    /// # Returns
    /// * `Ok(Vec<Task>)` - All tasks; an empty vector when none exist
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn get_all(&self) -> Result<Vec<Task>>;

    /// Get a task by its numeric ID
    ///
    /// # Arguments
    /// * `id` - The task ID to find
    ///
    /// # Returns
    /// * `Ok(Some(Task))` - The task if found
    /// * `Ok(None)` - If no task exists with that ID
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn get_by_id(&self, id: i64) -> Result<Option<Task>>;

    /// Insert or update a task, keyed on whether it carries an identifier
    ///
    /// An insert assigns the identifier and stamps `created_at` and
    /// `updated_at` with the same instant; an update refreshes `updated_at`
    /// and leaves `created_at` untouched.
    ///
    /// # Arguments
    /// * `task` - The task to persist
    ///
    /// # Returns
    /// * `Ok(Task)` - The stored task with identifier and fresh timestamps
    /// * `Err(TaskError::NotFound)` - If an update targets a vanished row
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn save(&self, task: Task) -> Result<Task>;

    /// Delete a task by its numeric ID
    ///
    /// # Arguments
    /// * `id` - The task ID to delete
    ///
    /// # Returns
    /// * `Ok(())` - The task was deleted
    /// * `Err(TaskError::NotFound)` - If no task exists with that ID
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn delete(&self, id: i64) -> Result<()>;

    /// Get repository health status for monitoring
    ///
    /// # Returns
    /// * `Ok(())` - Repository is healthy and connected
    /// * `Err(TaskError::Database)` - Repository is unhealthy
    async fn health_check(&self) -> Result<()>;
}

/// Repository trait for user credential storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by username
    ///
    /// # Returns
    /// * `Ok(Some(User))` - The stored credential record if found
    /// * `Ok(None)` - If no user exists with that username
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert a new user record
    ///
    /// Uniqueness is checked before the write; the storage layer's unique
    /// index catches registrations that race past that check.
    ///
    /// # Returns
    /// * `Ok(())` - The user was stored
    /// * `Err(TaskError::Conflict)` - If the username is already registered
    /// * `Err(TaskError::Database)` - If the database operation fails
    async fn create(&self, user: NewUser) -> Result<()>;
}
