use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use taskd_core::{
    error::{Result, TaskError},
    models::{Task, User},
};

/// Convert a SQLite row to a Task model
pub fn row_to_task(row: &SqliteRow) -> Result<Task> {
    let id: i64 = row.try_get("id").map_err(sqlx_error_to_task_error)?;
    let title: String = row.try_get("title").map_err(sqlx_error_to_task_error)?;
    let description: String = row
        .try_get("description")
        .map_err(sqlx_error_to_task_error)?;
    let completed: bool = row.try_get("completed").map_err(sqlx_error_to_task_error)?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(sqlx_error_to_task_error)?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(sqlx_error_to_task_error)?;

    Ok(Task {
        id: Some(id),
        title,
        description,
        completed,
        created_at,
        updated_at,
    })
}

/// Convert a SQLite row to a User model
pub fn row_to_user(row: &SqliteRow) -> Result<User> {
    let username: String = row.try_get("username").map_err(sqlx_error_to_task_error)?;
    let password_hash: String = row.try_get("password").map_err(sqlx_error_to_task_error)?;

    Ok(User {
        username,
        password_hash,
    })
}

/// Classify a sqlx error as transient (connection-class, worth a reconnect
/// and retry) or deterministic.
///
/// Transient: I/O and protocol failures, pool lifecycle errors, and SQLite's
/// busy/locked/ioerr result codes. Everything else, notably constraint
/// violations and malformed statements, would fail identically on retry.
pub fn is_transient_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Protocol(_) => true,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().unwrap_or_default();
            // SQLite extended result codes keep the primary code in the low
            // byte: 5 = BUSY, 6 = LOCKED, 10 = IOERR.
            if let Ok(numeric) = code.as_ref().parse::<u32>() {
                if matches!(numeric & 0xff, 5 | 6 | 10) {
                    return true;
                }
            }
            db_err.message().contains("database is locked")
        }
        _ => false,
    }
}

/// Convert a sqlx error to a TaskError
pub fn sqlx_error_to_task_error(err: sqlx::Error) -> TaskError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().unwrap_or_default();
            let message = db_err.message();

            // Handle SQLite unique-constraint violations
            if code == "2067" || message.contains("UNIQUE constraint failed") {
                if message.contains("users.username") {
                    return TaskError::Conflict("User already exists".to_string());
                }
                return TaskError::Conflict(format!("Unique constraint violated: {message}"));
            }
            TaskError::Database(format!("Database constraint error: {message}"))
        }
        sqlx::Error::RowNotFound => {
            // Absence is handled with fetch_optional at the call sites
            TaskError::Database("Unexpected RowNotFound error".to_string())
        }
        sqlx::Error::PoolTimedOut => TaskError::Database("Connection pool timeout".to_string()),
        sqlx::Error::Io(io_err) => TaskError::Database(format!("Database I/O error: {io_err}")),
        _ => TaskError::Database(format!("Database operation failed: {err}")),
    }
}
