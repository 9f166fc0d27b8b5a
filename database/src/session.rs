use crate::common::{is_transient_error, sqlx_error_to_task_error};
use crate::params::SqlParam;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqliteRow};
use sqlx::{ConnectOptions, Connection};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use taskd_core::error::{Result, TaskError};
use tokio::sync::Mutex;

/// Retry budget shared by the statement loop and the reconnect loop
pub const MAX_ATTEMPTS: u32 = 5;

/// Fixed pause between reconnection attempts
pub const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Session-opening seam.
///
/// Production code uses [`SqliteConnector`]; tests substitute a connector
/// that fails a scripted number of opens to exercise the retry budget.
#[async_trait]
pub trait Connect: Send + Sync {
    /// Open a raw connection. Liveness checking is the session's job, not
    /// the connector's.
    async fn open(&self) -> std::result::Result<SqliteConnection, sqlx::Error>;
}

/// Opens SQLite connections from a database URL
pub struct SqliteConnector {
    options: SqliteConnectOptions,
}

impl SqliteConnector {
    /// Build a connector from a database URL.
    ///
    /// Accepts `:memory:`, `sqlite::memory:`, `sqlite://path`, `sqlite:path`,
    /// and bare paths. File databases are created if missing and use WAL;
    /// in-memory databases use the memory journal.
    pub fn from_url(database_url: &str) -> Result<Self> {
        let url = database_url.trim();
        let is_memory =
            url == ":memory:" || url == "sqlite::memory:" || url == "sqlite://:memory:";

        let options = if is_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| TaskError::Connection(e.to_string()))?
                .journal_mode(SqliteJournalMode::Memory)
        } else {
            let path = url
                .strip_prefix("sqlite://")
                .or_else(|| url.strip_prefix("sqlite:"))
                .unwrap_or(url);
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(Self {
            options: options
                .busy_timeout(Duration::from_secs(5))
                .foreign_keys(true),
        })
    }
}

#[async_trait]
impl Connect for SqliteConnector {
    async fn open(&self) -> std::result::Result<SqliteConnection, sqlx::Error> {
        self.options.connect().await
    }
}

/// How a statement's outcome should be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Execute,
    FetchOne,
    FetchAll,
}

/// Outcome of one statement attempt
enum Fetched {
    Done(sqlx::sqlite::SqliteQueryResult),
    Row(Option<SqliteRow>),
    Rows(Vec<SqliteRow>),
}

/// A single database session with bounded reconnect-and-retry.
///
/// The session owns one live connection. Statements that fail with a
/// transient connection-class error are re-bound and re-issued after a
/// reconnect, up to [`MAX_ATTEMPTS`] tries; deterministic errors (bad SQL,
/// constraint violations) propagate immediately. The reconnect loop itself
/// shares the same budget and sleeps [`RECONNECT_BACKOFF`] between attempts.
///
/// A transient failure while an explicit transaction is open is never
/// retried: part of the transaction may already be applied, and replaying it
/// on a fresh session cannot be exactly-once. The session is marked dead and
/// the error propagates instead.
pub struct DbSession {
    connector: Arc<dyn Connect>,
    conn: Option<SqliteConnection>,
    connected: bool,
    in_transaction: bool,
}

impl DbSession {
    /// Open a session and verify it with a liveness check.
    ///
    /// # Returns
    /// * `Ok(DbSession)` - Connected session that answered `SELECT 1`
    /// * `Err(TaskError::Connection)` - If opening or the check failed
    pub async fn connect(connector: Arc<dyn Connect>) -> Result<Self> {
        match Self::open_checked(connector.as_ref()).await {
            Ok(conn) => {
                tracing::info!("Database connection established");
                Ok(Self {
                    connector,
                    conn: Some(conn),
                    connected: true,
                    in_transaction: false,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Unable to establish database connection");
                Err(TaskError::Connection(e.to_string()))
            }
        }
    }

    /// Open a raw connection and prove it can execute a statement. A session
    /// must not be reported connected if it cannot answer a trivial query.
    async fn open_checked(
        connector: &dyn Connect,
    ) -> std::result::Result<SqliteConnection, sqlx::Error> {
        let mut conn = connector.open().await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        Ok(conn)
    }

    /// Whether the session currently believes it holds a live connection
    pub fn is_connected(&self) -> bool {
        self.connected && self.conn.is_some()
    }

    /// Whether an explicit transaction is open on this session
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Liveness-check the session in place. Marks the session disconnected
    /// (and returns false) when the trivial query fails.
    pub async fn ping(&mut self) -> bool {
        let Some(conn) = self.conn.as_mut() else {
            return false;
        };
        match sqlx::query("SELECT 1").execute(&mut *conn).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Session failed liveness check");
                self.connected = false;
                false
            }
        }
    }

    /// Re-establish the session, up to [`MAX_ATTEMPTS`] tries with
    /// [`RECONNECT_BACKOFF`] between them.
    ///
    /// # Returns
    /// * `Ok(())` - A fresh connection passed the liveness check
    /// * `Err(TaskError::ReconnectExhausted)` - Every attempt failed
    pub async fn reconnect(&mut self) -> Result<()> {
        self.discard_connection().await;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match Self::open_checked(self.connector.as_ref()).await {
                Ok(conn) => {
                    self.conn = Some(conn);
                    self.connected = true;
                    self.in_transaction = false;
                    tracing::info!(attempt, "Database connection re-established");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        "Reconnection attempt failed"
                    );
                    if attempt >= MAX_ATTEMPTS {
                        tracing::error!(attempts = attempt, "Unable to reconnect, giving up");
                        return Err(TaskError::ReconnectExhausted { attempts: attempt });
                    }
                    tokio::time::sleep(RECONNECT_BACKOFF).await;
                }
            }
        }
    }

    /// Drop the current connection without reporting errors
    async fn discard_connection(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close().await {
                tracing::warn!(error = %e, "Error closing stale connection");
            }
        }
        self.connected = false;
        self.in_transaction = false;
    }

    /// One bind-and-run attempt against the current connection
    async fn attempt(
        &mut self,
        sql: &str,
        params: &[SqlParam],
        mode: RunMode,
    ) -> std::result::Result<Fetched, sqlx::Error> {
        let Some(conn) = self.conn.as_mut() else {
            // Treated as a transient failure so the retry loop reconnects
            return Err(sqlx::Error::PoolClosed);
        };

        let mut query = sqlx::query(sql);
        for param in params {
            query = param.bind_to(query);
        }

        match mode {
            RunMode::Execute => query.execute(&mut *conn).await.map(Fetched::Done),
            RunMode::FetchOne => query.fetch_optional(&mut *conn).await.map(Fetched::Row),
            RunMode::FetchAll => query.fetch_all(&mut *conn).await.map(Fetched::Rows),
        }
    }

    /// Statement driver: reconnect if stale, then attempt with bounded retry
    /// on transient failures.
    async fn run(&mut self, sql: &str, params: &[SqlParam], mode: RunMode) -> Result<Fetched> {
        if !self.is_connected() {
            self.reconnect().await?;
        }

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self.attempt(sql, params, mode).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) if is_transient_error(&err) => {
                    self.connected = false;
                    if self.in_transaction {
                        self.in_transaction = false;
                        tracing::error!(
                            error = %err,
                            "Connection lost inside a transaction, aborting"
                        );
                        return Err(TaskError::Database(format!(
                            "Connection lost during transaction: {err}"
                        )));
                    }
                    if attempts >= MAX_ATTEMPTS {
                        tracing::error!(attempts, "Query retry limit exceeded");
                        return Err(TaskError::RetryExhausted { attempts });
                    }
                    tracing::warn!(
                        error = %err,
                        attempts,
                        "Query failed on connection error, attempting to reconnect"
                    );
                    self.reconnect().await?;
                }
                Err(err) => return Err(sqlx_error_to_task_error(err)),
            }
        }
    }

    /// Execute a statement and report the affected row count
    pub async fn execute(&mut self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        match self.run(sql, params, RunMode::Execute).await? {
            Fetched::Done(result) => Ok(result.rows_affected()),
            _ => Err(TaskError::internal("execute produced a row set")),
        }
    }

    /// Fetch at most one row
    pub async fn select_one(
        &mut self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Option<SqliteRow>> {
        tracing::debug!(params = params.len(), "Executing SELECT statement (single)");
        match self.run(sql, params, RunMode::FetchOne).await? {
            Fetched::Row(row) => Ok(row),
            _ => Err(TaskError::internal("single select produced a non-row outcome")),
        }
    }

    /// Fetch every matching row; an empty match is an empty vector
    pub async fn select_all(&mut self, sql: &str, params: &[SqlParam]) -> Result<Vec<SqliteRow>> {
        tracing::debug!(params = params.len(), "Executing SELECT statement (multi)");
        match self.run(sql, params, RunMode::FetchAll).await? {
            Fetched::Rows(rows) => Ok(rows),
            _ => Err(TaskError::internal("multi select produced a non-row outcome")),
        }
    }

    /// Execute an INSERT and report the backend-assigned row identifier
    pub async fn insert(&mut self, sql: &str, params: &[SqlParam]) -> Result<i64> {
        tracing::info!(params = params.len(), "Executing INSERT statement");
        match self.run(sql, params, RunMode::Execute).await? {
            Fetched::Done(result) => Ok(result.last_insert_rowid()),
            _ => Err(TaskError::internal("insert produced a row set")),
        }
    }

    /// Execute an UPDATE and report the affected row count
    pub async fn update(&mut self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        tracing::info!(params = params.len(), "Executing UPDATE statement");
        self.execute(sql, params).await
    }

    /// Execute a DELETE and report the affected row count
    pub async fn delete(&mut self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        tracing::info!(params = params.len(), "Executing DELETE statement");
        self.execute(sql, params).await
    }

    /// Open an explicit transaction
    pub async fn begin(&mut self) -> Result<()> {
        self.execute("BEGIN", &[]).await?;
        self.in_transaction = true;
        Ok(())
    }

    /// Commit the open transaction; a no-op when none is open
    pub async fn commit(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        let result = self.run("COMMIT", &[], RunMode::Execute).await.map(|_| ());
        self.in_transaction = false;
        result
    }

    /// Roll back the open transaction.
    ///
    /// Never fails: when the session already lost its connection the
    /// transaction died with it, and a rollback failure is only logged.
    pub async fn rollback(&mut self) {
        if !self.in_transaction {
            return;
        }
        self.in_transaction = false;
        if !self.is_connected() {
            tracing::debug!("Skipping rollback on a dead session");
            return;
        }
        if let Err(e) = self.attempt("ROLLBACK", &[], RunMode::Execute).await {
            tracing::warn!(error = %e, "Rollback failed");
            self.connected = false;
        }
    }

    /// Apply embedded migrations over this session's connection
    pub async fn run_migrations(&mut self) -> Result<()> {
        let Some(conn) = self.conn.as_mut() else {
            return Err(TaskError::database("migration attempted on a closed session"));
        };
        crate::MIGRATOR
            .run(&mut *conn)
            .await
            .map_err(|e| TaskError::Database(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations completed successfully");
        Ok(())
    }

    /// Release the connection. Safe to call repeatedly; failures during
    /// cleanup are logged, never raised.
    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close().await {
                Ok(()) => tracing::info!("Database connection closed successfully"),
                Err(e) => tracing::warn!(error = %e, "Error while closing database connection"),
            }
        }
        self.connected = false;
        self.in_transaction = false;
    }
}

impl fmt::Debug for DbSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSession")
            .field("connected", &self.connected)
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

/// Owned handle to the process-wide session cache.
///
/// At most one idle session is kept between logical operations. `acquire`
/// hands out the cached session after a liveness check (or opens a fresh one),
/// `release` returns a still-healthy session to the slot and closes it
/// otherwise. Overlapping operations simply get their own short-lived
/// sessions.
pub struct Database {
    connector: Arc<dyn Connect>,
    slot: Mutex<Option<DbSession>>,
}

impl Database {
    /// Build a handle over an arbitrary connector
    pub fn new(connector: Arc<dyn Connect>) -> Self {
        Self {
            connector,
            slot: Mutex::new(None),
        }
    }

    /// Build a handle for a SQLite database URL
    pub fn from_url(database_url: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(SqliteConnector::from_url(database_url)?)))
    }

    /// Take a validated session: the cached one when it still answers a
    /// liveness check, a fresh one otherwise.
    pub async fn acquire(&self) -> Result<DbSession> {
        let cached = self.slot.lock().await.take();
        if let Some(mut session) = cached {
            if session.ping().await {
                tracing::debug!("Reusing cached database session");
                return Ok(session);
            }
            tracing::debug!("Cached session failed liveness check, replacing");
            session.close().await;
        }
        DbSession::connect(Arc::clone(&self.connector)).await
    }

    /// Return a session after a logical operation. Healthy sessions go back
    /// to the slot for reuse; anything else is closed.
    pub async fn release(&self, mut session: DbSession) {
        if session.is_connected() && !session.in_transaction() {
            let mut slot = self.slot.lock().await;
            if slot.is_none() {
                *slot = Some(session);
                return;
            }
        }
        session.close().await;
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        let mut session = self.acquire().await?;
        let result = session.run_migrations().await;
        self.release(session).await;
        result
    }

    /// Answer whether the store accepts a trivial statement
    pub async fn health_check(&self) -> Result<()> {
        let mut session = self.acquire().await?;
        let result = session.select_one("SELECT 1", &[]).await.map(|_| ());
        self.release(session).await;
        result
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
