use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Core task representation.
///
/// A task is the unit of work tracked by the system. The identifier is
/// assigned by the storage backend on first save and is immutable afterwards;
/// `created_at` is set once at insert time while `updated_at` is refreshed on
/// every successful save.
///
/// # Examples
///
/// ```rust
/// use taskd_core::models::{NewTask, Task, UpdateTask};
///
/// let mut task = Task::new(NewTask {
///     title: "Write spec".to_string(),
///     description: String::new(),
///     completed: false,
/// });
/// assert!(task.id.is_none());
/// assert!(!task.completed);
///
/// task.apply(UpdateTask {
///     completed: Some(true),
///     ..Default::default()
/// });
/// assert!(task.completed);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Auto-increment primary key; `None` until first persisted
    pub id: Option<i64>,
    /// Non-empty task title
    pub title: String,
    /// Free-form details, empty when the caller supplied none
    pub description: String,
    /// Completion flag
    pub completed: bool,
    /// Set once when the task is first inserted
    pub created_at: DateTime<Utc>,
    /// Refreshed on every save
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build an unsaved task from creation input. Timestamps are provisional
    /// until the storage layer stamps the insert.
    pub fn new(input: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title: input.title,
            description: input.description,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold a partial update into the task. Absent fields keep their current
    /// values; `updated_at` is left for the storage layer to refresh.
    pub fn apply(&mut self, update: UpdateTask) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
    }

    /// Whether the task has been persisted at least once
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Data transfer object for creating new tasks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTask {
    /// Task title; validated non-empty before any write
    pub title: String,
    /// Optional details, defaulting to empty
    #[serde(default)]
    pub description: String,
    /// Defaults to not completed
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    false
}

/// Data transfer object for partial task updates
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UpdateTask {
    /// Optional new title
    pub title: Option<String>,
    /// Optional new description
    pub description: Option<String>,
    /// Optional new completion flag
    pub completed: Option<bool>,
}

impl UpdateTask {
    /// True when no field is present, i.e. the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Stored user credential record.
///
/// Only the one-way hash of the password is ever stored or carried; the hash
/// is excluded from serialized output so a `User` can never leak it through a
/// response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique username, case-sensitive as stored
    pub username: String,
    /// Argon2 hash of the password, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Data transfer object for inserting a user; the password is already hashed
/// by the time this exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// Plaintext credentials as submitted to register/login
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
