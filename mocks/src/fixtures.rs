//! Standard test fixtures for consistent testing
//!
//! Provides pre-built test data including:
//! - Tasks before and after persistence
//! - Credential records with a valid Argon2 hash shape
//! - Bulk task generators

use chrono::Utc;
use taskd_core::models::{NewTask, NewUser, Task, User};

/// Create an unsaved task with the given title
pub fn unsaved_task(title: &str) -> Task {
    Task::new(NewTask {
        title: title.to_string(),
        description: format!("Description for {title}"),
        completed: false,
    })
}

/// Create a task that looks freshly loaded from storage
pub fn persisted_task(id: i64, title: &str) -> Task {
    let now = Utc::now();
    Task {
        id: Some(id),
        title: title.to_string(),
        description: format!("Description for {title}"),
        completed: false,
        created_at: now,
        updated_at: now,
    }
}

/// Create a completed persisted task
pub fn completed_task(id: i64, title: &str) -> Task {
    let mut task = persisted_task(id, title);
    task.completed = true;
    task
}

/// Create multiple unique persisted tasks
pub fn persisted_tasks(count: usize) -> Vec<Task> {
    (1..=count)
        .map(|i| {
            let mut task = persisted_task(i as i64, &format!("Task {i}"));
            task.completed = i % 2 == 0;
            task
        })
        .collect()
}

/// Create a new task payload as it would arrive from a client
pub fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: format!("Description for {title}"),
        completed: false,
    }
}

/// Create a registration record with a plausible Argon2 hash
pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password_hash: sample_password_hash().to_string(),
    }
}

/// Create a stored credential record
pub fn user(username: &str) -> User {
    User {
        username: username.to_string(),
        password_hash: sample_password_hash().to_string(),
    }
}

/// A syntactically valid Argon2id hash for fixtures that never verify it
pub fn sample_password_hash() -> &'static str {
    "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$K5c0WFWiBjGnX5eGYrOpDmCMlJenFJzAisfpSYWmvp0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsaved_task_has_no_id() {
        let task = unsaved_task("fixture");
        assert!(!task.is_persisted());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_persisted_tasks_are_unique() {
        let tasks = persisted_tasks(5);
        assert_eq!(tasks.len(), 5);
        for (index, task) in tasks.iter().enumerate() {
            assert_eq!(task.id, Some(index as i64 + 1));
        }
    }
}
