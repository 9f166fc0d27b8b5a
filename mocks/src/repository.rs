//! Mock implementations of the repository traits
//!
//! Provides thread-safe in-memory repositories with:
//! - Error injection capabilities
//! - Call tracking for verification
//! - The same timestamp and absence semantics as the SQLite backend

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use taskd_core::{
    error::{Result, TaskError},
    models::{NewUser, Task, User},
    repository::{TaskRepository, UserRepository},
};

/// Mock implementation of TaskRepository for testing
///
/// Behaves like the SQLite backend: inserts assign identifiers and stamp
/// both timestamps with one instant, updates refresh `updated_at`, lookups
/// report absence as `Ok(None)`, and mutations of missing rows fail with
/// `TaskError::NotFound`.
pub struct MockTaskRepository {
    tasks: Arc<Mutex<HashMap<i64, Task>>>,
    next_id: Arc<AtomicI64>,
    error_injection: Arc<Mutex<Option<TaskError>>>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl Default for MockTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            error_injection: Arc::new(Mutex::new(None)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock repository pre-populated with persisted tasks.
    /// Unpersisted tasks (no identifier) are assigned one.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.tasks.lock();
            let mut max_id = 0;
            for mut task in tasks {
                let id = match task.id {
                    Some(id) => id,
                    None => {
                        let id = max_id + 1;
                        task.id = Some(id);
                        id
                    }
                };
                max_id = max_id.max(id);
                map.insert(id, task);
            }
            repo.next_id.store(max_id + 1, Ordering::SeqCst);
        }
        repo
    }

    /// Inject an error for the next operation
    pub fn inject_error(&self, error: TaskError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Clear any pending injected error
    pub fn clear_error(&self) {
        *self.error_injection.lock() = None;
    }

    /// Number of stored tasks
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    /// Assert a method was called
    pub fn assert_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            history.iter().any(|call| call.contains(method)),
            "Method '{}' was not called. Call history: {:?}",
            method,
            *history
        );
    }

    /// Check if an error should be injected, consuming it if so
    fn check_error_injection(&self) -> Result<()> {
        let mut error_opt = self.error_injection.lock();
        if let Some(error) = error_opt.take() {
            return Err(error);
        }
        Ok(())
    }

    fn record_call(&self, method: &str) {
        self.call_history.lock().push(format!("{method}()"));
    }

    fn record_call_with_params(&self, method: &str, params: &str) {
        self.call_history.lock().push(format!("{method}({params})"));
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn get_all(&self) -> Result<Vec<Task>> {
        self.record_call("get_all");
        self.check_error_injection()?;

        let tasks = self.tasks.lock();
        let mut all: Vec<Task> = tasks.values().cloned().collect();
        all.sort_by_key(|task| task.id);
        Ok(all)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        self.record_call_with_params("get_by_id", &format!("id={id}"));
        self.check_error_injection()?;

        Ok(self.tasks.lock().get(&id).cloned())
    }

    async fn save(&self, task: Task) -> Result<Task> {
        self.record_call_with_params("save", &format!("title={}", task.title));
        self.check_error_injection()?;

        let now = Utc::now();
        match task.id {
            Some(id) => {
                let mut tasks = self.tasks.lock();
                if !tasks.contains_key(&id) {
                    return Err(TaskError::not_found_id(id));
                }
                let mut stored = task;
                stored.updated_at = now;
                tasks.insert(id, stored.clone());
                Ok(stored)
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let stored = Task {
                    id: Some(id),
                    created_at: now,
                    updated_at: now,
                    ..task
                };
                self.tasks.lock().insert(id, stored.clone());
                Ok(stored)
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.record_call_with_params("delete", &format!("id={id}"));
        self.check_error_injection()?;

        match self.tasks.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(TaskError::not_found_id(id)),
        }
    }

    async fn health_check(&self) -> Result<()> {
        self.record_call("health_check");
        self.check_error_injection()
    }
}

/// Mock implementation of UserRepository for testing
pub struct MockUserRepository {
    users: Arc<Mutex<HashMap<String, User>>>,
    error_injection: Arc<Mutex<Option<TaskError>>>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUserRepository {
    /// Create a new empty mock user store
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
            error_injection: Arc::new(Mutex::new(None)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock store pre-populated with users
    pub fn with_users(users: Vec<User>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.users.lock();
            for user in users {
                map.insert(user.username.clone(), user);
            }
        }
        repo
    }

    /// Inject an error for the next operation
    pub fn inject_error(&self, error: TaskError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Number of stored users
    pub fn user_count(&self) -> usize {
        self.users.lock().len()
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    fn check_error_injection(&self) -> Result<()> {
        let mut error_opt = self.error_injection.lock();
        if let Some(error) = error_opt.take() {
            return Err(error);
        }
        Ok(())
    }

    fn record_call_with_params(&self, method: &str, params: &str) {
        self.call_history.lock().push(format!("{method}({params})"));
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.record_call_with_params("find_by_username", &format!("username={username}"));
        self.check_error_injection()?;

        Ok(self.users.lock().get(username).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<()> {
        self.record_call_with_params("create", &format!("username={}", user.username));
        self.check_error_injection()?;

        let mut users = self.users.lock();
        if users.contains_key(&user.username) {
            return Err(TaskError::username_taken(&user.username));
        }
        users.insert(
            user.username.clone(),
            User {
                username: user.username,
                password_hash: user.password_hash,
            },
        );
        Ok(())
    }
}
