use crate::common::row_to_task;
use crate::params;
use crate::session::{Database, DbSession};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use taskd_core::error::{Result, TaskError};
use taskd_core::models::Task;
use taskd_core::repository::TaskRepository;

/// SQLite-backed task repository.
///
/// Every operation acquires a session from the shared [`Database`] handle,
/// runs its statements through the retrying session layer, and releases the
/// session again. Writes are wrapped in an explicit transaction.
#[derive(Debug, Clone)]
pub struct SqliteTaskRepository {
    db: Arc<Database>,
}

impl SqliteTaskRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn insert_task(session: &mut DbSession, task: Task) -> Result<Task> {
        // A fresh row carries one instant in both timestamp columns
        let now = Utc::now();
        session.begin().await?;
        let inserted = session
            .insert(
                r#"
                INSERT INTO tasks (title, description, completed, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
                &params![&task.title, &task.description, task.completed, now, now],
            )
            .await;
        match inserted {
            Ok(id) => {
                session.commit().await?;
                Ok(Task {
                    id: Some(id),
                    created_at: now,
                    updated_at: now,
                    ..task
                })
            }
            Err(e) => {
                session.rollback().await;
                Err(e)
            }
        }
    }

    async fn update_task(session: &mut DbSession, id: i64, mut task: Task) -> Result<Task> {
        let now = Utc::now();
        session.begin().await?;
        let updated = session
            .update(
                r#"
                UPDATE tasks
                SET title = ?, description = ?, completed = ?, updated_at = ?
                WHERE id = ?
                "#,
                &params![&task.title, &task.description, task.completed, now, id],
            )
            .await;
        match updated {
            // The row vanished between load and store
            Ok(0) => {
                session.rollback().await;
                Err(TaskError::not_found_id(id))
            }
            Ok(_) => {
                session.commit().await?;
                task.updated_at = now;
                Ok(task)
            }
            Err(e) => {
                session.rollback().await;
                Err(e)
            }
        }
    }

    async fn delete_task(session: &mut DbSession, id: i64) -> Result<()> {
        session.begin().await?;
        match session
            .delete("DELETE FROM tasks WHERE id = ?", &params![id])
            .await
        {
            Ok(0) => {
                session.rollback().await;
                Err(TaskError::not_found_id(id))
            }
            Ok(_) => session.commit().await,
            Err(e) => {
                session.rollback().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn get_all(&self) -> Result<Vec<Task>> {
        let mut session = self.db.acquire().await?;
        let fetched = session
            .select_all(
                r#"
                SELECT id, title, description, completed, created_at, updated_at
                FROM tasks
                ORDER BY id
                "#,
                &[],
            )
            .await;
        self.db.release(session).await;
        fetched?.iter().map(row_to_task).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        let mut session = self.db.acquire().await?;
        let fetched = session
            .select_one(
                r#"
                SELECT id, title, description, completed, created_at, updated_at
                FROM tasks
                WHERE id = ?
                "#,
                &params![id],
            )
            .await;
        self.db.release(session).await;
        match fetched? {
            Some(row) => Ok(Some(row_to_task(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, task: Task) -> Result<Task> {
        let mut session = self.db.acquire().await?;
        let result = match task.id {
            Some(id) => Self::update_task(&mut session, id, task).await,
            None => Self::insert_task(&mut session, task).await,
        };
        self.db.release(session).await;
        result
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut session = self.db.acquire().await?;
        let result = Self::delete_task(&mut session, id).await;
        self.db.release(session).await;
        result
    }

    async fn health_check(&self) -> Result<()> {
        self.db.health_check().await
    }
}
