use thiserror::Error;

/// Result type alias for task operations
pub type Result<T> = std::result::Result<T, TaskError>;

/// Error taxonomy for the task backend.
///
/// The variants separate client faults (validation, conflict, bad
/// credentials), expected mutation misses (not found), and server faults
/// (database, connection, retry exhaustion). Lookups never report absence
/// through this type; they return `Ok(None)` instead.
///
/// # Examples
///
/// ```rust
/// use taskd_core::error::TaskError;
///
/// let not_found = TaskError::not_found_id(42);
/// assert!(not_found.is_not_found());
/// assert_eq!(not_found.status_code(), 404);
///
/// let conflict = TaskError::username_taken("alice");
/// assert!(conflict.is_conflict());
/// assert_eq!(conflict.status_code(), 409);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Mutation keyed on an identifier with no matching row
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Input rejected before any statement was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique-constraint style conflict, e.g. a duplicate username
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Login with an unknown username or a wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session establishment failed before any retry budget applied
    #[error("Unable to establish database connection: {0}")]
    Connection(String),

    /// A statement kept hitting transient failures until the budget ran out
    #[error("Query retry limit exceeded after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    /// The reconnect loop used up its budget without a live session
    #[error("Unable to reconnect after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// Non-transient database failure (bad statement, constraint, type error)
    #[error("Database error: {0}")]
    Database(String),

    /// Internal system error (hashing, token minting, poisoned state)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskError {
    /// Create a not found error for a task ID
    pub fn not_found_id(id: i64) -> Self {
        Self::NotFound(format!("Task with ID {id} not found"))
    }

    /// Create a conflict error for an already-registered username
    pub fn username_taken(username: &str) -> Self {
        Self::Conflict(format!("User '{username}' already exists"))
    }

    /// Create a validation error with a caller-facing message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a database error from any displayable source
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an internal error from any displayable source
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error indicates a not found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskError::NotFound(_))
    }

    /// Check if this error indicates a validation problem
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }

    /// Check if this error indicates a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, TaskError::Conflict(_))
    }

    /// Check if this error belongs to the connection-failure class
    /// (establishment, retry exhaustion, reconnect exhaustion)
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            TaskError::Connection(_)
                | TaskError::RetryExhausted { .. }
                | TaskError::ReconnectExhausted { .. }
        )
    }

    /// Check if this error indicates a database problem
    pub fn is_database(&self) -> bool {
        matches!(self, TaskError::Database(_))
    }

    /// Check if this error is a client fault rather than a server fault
    pub fn is_client_fault(&self) -> bool {
        self.status_code() < 500
    }

    /// Convert to appropriate HTTP status code equivalent
    pub fn status_code(&self) -> u16 {
        match self {
            TaskError::NotFound(_) => 404,
            TaskError::Validation(_) => 400,
            TaskError::Conflict(_) => 409,
            TaskError::InvalidCredentials => 401,
            TaskError::Connection(_) => 500,
            TaskError::RetryExhausted { .. } => 500,
            TaskError::ReconnectExhausted { .. } => 500,
            TaskError::Database(_) => 500,
            TaskError::Internal(_) => 500,
        }
    }
}
