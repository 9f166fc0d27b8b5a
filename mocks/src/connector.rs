//! Connector doubles for exercising the session retry budget

use async_trait::async_trait;
use parking_lot::Mutex;
use sqlx::sqlite::SqliteConnection;
use std::sync::atomic::{AtomicU32, Ordering};
use taskd_core::error::Result;
use taskd_db::{Connect, SqliteConnector};

/// A connector that fails a scripted number of opens before delegating to a
/// real SQLite connector.
///
/// Every call to `open` is counted, so tests can assert exactly how many
/// connection attempts a retry loop made. More failures can be scheduled
/// mid-test with [`fail_next`](FlakyConnector::fail_next).
pub struct FlakyConnector {
    inner: SqliteConnector,
    failures: Mutex<u32>,
    attempts: AtomicU32,
}

impl FlakyConnector {
    /// Build a connector for `database_url` that fails the first `failures`
    /// opens.
    pub fn new(database_url: &str, failures: u32) -> Result<Self> {
        Ok(Self {
            inner: SqliteConnector::from_url(database_url)?,
            failures: Mutex::new(failures),
            attempts: AtomicU32::new(0),
        })
    }

    /// Schedule the next `failures` opens to fail
    pub fn fail_next(&self, failures: u32) {
        *self.failures.lock() = failures;
    }

    /// Total number of opens attempted so far, failed and successful alike
    pub fn open_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Scripted failures not yet consumed
    pub fn remaining_failures(&self) -> u32 {
        *self.failures.lock()
    }
}

#[async_trait]
impl Connect for FlakyConnector {
    async fn open(&self) -> std::result::Result<SqliteConnection, sqlx::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        {
            let mut failures = self.failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "injected connection failure",
                )));
            }
        }
        self.inner.open().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_failures_then_success() {
        let connector = FlakyConnector::new(":memory:", 2).expect("connector");

        assert!(connector.open().await.is_err());
        assert!(connector.open().await.is_err());
        assert!(connector.open().await.is_ok());

        assert_eq!(connector.open_attempts(), 3);
        assert_eq!(connector.remaining_failures(), 0);
    }

    #[tokio::test]
    async fn test_fail_next_reschedules() {
        let connector = FlakyConnector::new(":memory:", 0).expect("connector");
        assert!(connector.open().await.is_ok());

        connector.fail_next(1);
        assert!(connector.open().await.is_err());
        assert!(connector.open().await.is_ok());
        assert_eq!(connector.open_attempts(), 3);
    }
}
