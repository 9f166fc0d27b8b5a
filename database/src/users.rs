use crate::common::row_to_user;
use crate::params;
use crate::session::{Database, DbSession};
use async_trait::async_trait;
use std::sync::Arc;
use taskd_core::error::{Result, TaskError};
use taskd_core::models::{NewUser, User};
use taskd_core::repository::UserRepository;

/// SQLite-backed credential store
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    db: Arc<Database>,
}

impl SqliteUserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn insert_user(session: &mut DbSession, user: &NewUser) -> Result<()> {
        // Friendly conflict before the write; the unique index on username
        // still catches a racing registration.
        let existing = session
            .select_one(
                "SELECT username FROM users WHERE username = ?",
                &params![&user.username],
            )
            .await?;
        if existing.is_some() {
            return Err(TaskError::username_taken(&user.username));
        }

        session.begin().await?;
        match session
            .insert(
                "INSERT INTO users (username, password) VALUES (?, ?)",
                &params![&user.username, &user.password_hash],
            )
            .await
        {
            Ok(_) => session.commit().await,
            Err(e) => {
                session.rollback().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut session = self.db.acquire().await?;
        let fetched = session
            .select_one(
                "SELECT username, password FROM users WHERE username = ?",
                &params![username],
            )
            .await;
        self.db.release(session).await;
        match fetched? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, user: NewUser) -> Result<()> {
        let mut session = self.db.acquire().await?;
        let result = Self::insert_user(&mut session, &user).await;
        self.db.release(session).await;
        result
    }
}
