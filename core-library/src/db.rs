//! # Database Connection Pool Module
//!
//! SQLite connection pooling and explicit transactions for the music catalog.
//!
//! ## Features
//!
//! - **WAL Mode**: Enabled for better concurrency (multiple readers, one writer)
//! - **Connection Pooling**: Configurable min/max connections with timeouts
//! - **Foreign Keys**: Enforced, so deleting a record cascades to its verses
//! - **Automatic Migrations**: Runs on initialization
//! - **Isolation Levels**: [`StoreTransaction`] begins on a dedicated connection
//!   at the requested [`IsolationLevel`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_library::db::{create_pool, DatabaseConfig, IsolationLevel, StoreTransaction};
//!
//! let pool = create_pool(DatabaseConfig::new("catalog.db")).await?;
//!
//! let mut tx = StoreTransaction::begin(&pool, IsolationLevel::Serializable).await?;
//! sqlx::query("DELETE FROM music WHERE id = ?")
//!     .bind(id)
//!     .execute(tx.conn())
//!     .await?;
//! tx.commit().await?;
//! ```
//!
//! ## Testing
//!
//! ```rust,ignore
//! let pool = create_test_pool().await?;
//! ```

use crate::{LibraryError, Result};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
    SqliteSynchronous,
};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Database configuration for SQLite connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite://catalog.db` or `sqlite::memory:`
    pub database_url: String,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Maximum time to wait for a connection from the pool
    pub acquire_timeout: Duration,

    /// Maximum lifetime of a connection
    pub max_lifetime: Option<Duration>,

    /// Maximum idle time for a connection before being closed
    pub idle_timeout: Option<Duration>,

    /// Number of prepared statements cached per connection
    pub statement_cache_capacity: usize,
}

impl DatabaseConfig {
    /// Create a configuration for the database file at `database_path`
    ///
    /// ```rust,ignore
    /// let config = DatabaseConfig::new("catalog.db");
    /// ```
    pub fn new(database_path: impl AsRef<str>) -> Self {
        Self::from_url(format!("sqlite://{}", database_path.as_ref()))
    }

    /// Create a configuration from a full connection URL
    pub fn from_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            min_connections: 1,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(10),
            max_lifetime: Some(Duration::from_secs(1800)), // 30 minutes
            idle_timeout: Some(Duration::from_secs(600)),  // 10 minutes
            statement_cache_capacity: 100,
        }
    }

    /// Create a configuration for an in-memory database (useful for testing)
    ///
    /// Every SQLite connection to `:memory:` opens its own private database, so
    /// the pool is pinned to exactly one connection that is never recycled.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            max_lifetime: None,
            idle_timeout: None,
            statement_cache_capacity: 100,
        }
    }

    /// Set the minimum number of connections
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Set the maximum number of connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection acquire timeout
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the maximum connection lifetime
    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Set the idle timeout
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the statement cache capacity
    pub fn statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Create a configured SQLite connection pool
///
/// Configures connection options, opens the pool, runs migrations and
/// performs a health check.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, migrations fail or the
/// health check query fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<Pool<Sqlite>> {
    info!(
        database_url = %config.database_url,
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        "Creating database connection pool"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(LibraryError::Database)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true)
        .busy_timeout(config.acquire_timeout)
        .statement_cache_capacity(config.statement_cache_capacity);

    debug!("SQLite connection options configured");

    let pool = SqlitePoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create connection pool");
            LibraryError::Database(e)
        })?;

    info!(
        connections = pool.size(),
        "Database connection pool created successfully"
    );

    run_migrations(&pool).await?;
    health_check(&pool).await?;

    Ok(pool)
}

/// Create an in-memory pool with migrations applied
pub async fn create_test_pool() -> Result<Pool<Sqlite>> {
    create_pool(DatabaseConfig::in_memory()).await
}

/// Apply the embedded migrations from `migrations/`
async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Migration failed");
            LibraryError::Migration(e.to_string())
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Verify the pool can serve a trivial query
pub async fn health_check(pool: &Pool<Sqlite>) -> Result<()> {
    debug!("Performing database health check");

    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| {
        warn!(error = %e, "Database health check failed");
        LibraryError::Database(e)
    })?;

    debug!("Database health check passed");
    Ok(())
}

// =============================================================================
// Transactions
// =============================================================================

/// Isolation requested when a transaction begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    /// Store default; the write lock is taken on the first write
    #[default]
    Default,
    /// Write lock taken up front, so no other writer can interleave
    Serializable,
}

impl IsolationLevel {
    fn begin_statement(self) -> &'static str {
        match self {
            IsolationLevel::Default => "BEGIN DEFERRED",
            IsolationLevel::Serializable => "BEGIN IMMEDIATE",
        }
    }
}

/// A transaction pinned to one pooled connection
///
/// Statements run through [`StoreTransaction::conn`]. Finish with
/// [`commit`](Self::commit) or [`rollback`](Self::rollback). If the value is
/// dropped while still open (an error path or a cancelled future) its
/// connection is closed instead of returned to the pool, which makes SQLite
/// discard the uncommitted work.
pub struct StoreTransaction {
    conn: PoolConnection<Sqlite>,
    isolation: IsolationLevel,
    open: bool,
}

impl StoreTransaction {
    /// Acquire a connection and begin a transaction on it
    pub async fn begin(pool: &Pool<Sqlite>, isolation: IsolationLevel) -> Result<Self> {
        let mut conn = pool.acquire().await?;

        debug!(?isolation, "Beginning transaction");
        sqlx::query(isolation.begin_statement())
            .execute(&mut *conn)
            .await?;

        Ok(Self {
            conn,
            isolation,
            open: true,
        })
    }

    /// Connection to run statements on
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    pub async fn commit(mut self) -> Result<()> {
        debug!(isolation = ?self.isolation, "Committing transaction");
        sqlx::query("COMMIT").execute(&mut *self.conn).await?;
        self.open = false;
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<()> {
        debug!(isolation = ?self.isolation, "Rolling back transaction");
        let result = sqlx::query("ROLLBACK").execute(&mut *self.conn).await;
        self.open = false;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_no_active_transaction(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Roll back after a failed statement, logging instead of returning a
    /// rollback error so the caller keeps reporting the original failure
    pub async fn rollback_after(self, cause: &LibraryError) {
        if let Err(e) = self.rollback().await {
            warn!(error = %e, cause = %cause, "Transaction rollback failed");
        }
    }
}

impl Drop for StoreTransaction {
    fn drop(&mut self) {
        if self.open {
            warn!(isolation = ?self.isolation, "Transaction dropped while open, closing its connection");
            self.conn.close_on_drop();
        }
    }
}

fn is_no_active_transaction(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.message().contains("no transaction is active"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_in_memory_pool() {
        let pool = create_pool(DatabaseConfig::in_memory()).await;
        assert!(pool.is_ok(), "Should create in-memory pool successfully");
    }

    #[tokio::test]
    async fn test_health_check() {
        let pool = create_test_pool().await.unwrap();
        assert!(health_check(&pool).await.is_ok());
    }

    #[test]
    fn test_database_config_builder() {
        let config = DatabaseConfig::new("catalog.db")
            .min_connections(2)
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(3))
            .statement_cache_capacity(200);

        assert_eq!(config.database_url, "sqlite://catalog.db");
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.statement_cache_capacity, 200);
    }

    #[test]
    fn test_default_pool_limits() {
        let config = DatabaseConfig::from_url("sqlite://catalog.db");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));

        let memory = DatabaseConfig::in_memory();
        assert_eq!(memory.max_connections, 1);
        assert!(memory.idle_timeout.is_none());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_test_pool().await.unwrap();

        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(result.0, 1, "Foreign keys should be enabled");
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let pool = create_test_pool().await.unwrap();

        for table in ["music", "verses"] {
            let result: (i32,) = sqlx::query_as(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();

            assert_eq!(result.0, 1, "{} table should exist", table);
        }
    }

    #[tokio::test]
    async fn test_transaction_commit_persists() {
        let pool = create_test_pool().await.unwrap();

        let mut tx = StoreTransaction::begin(&pool, IsolationLevel::Default)
            .await
            .unwrap();
        sqlx::query("INSERT INTO music (title, group_name) VALUES ('sonne', 'rammstein')")
            .execute(tx.conn())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM music")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_serializable_transaction_rollback_discards() {
        let pool = create_test_pool().await.unwrap();

        let mut tx = StoreTransaction::begin(&pool, IsolationLevel::Serializable)
            .await
            .unwrap();
        assert_eq!(tx.isolation(), IsolationLevel::Serializable);
        sqlx::query("INSERT INTO music (title, group_name) VALUES ('sonne', 'rammstein')")
            .execute(tx.conn())
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM music")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_rollback_after_closed_transaction_is_quiet() {
        let pool = create_test_pool().await.unwrap();

        let mut tx = StoreTransaction::begin(&pool, IsolationLevel::Default)
            .await
            .unwrap();
        // End the transaction behind the wrapper's back.
        sqlx::query("COMMIT").execute(tx.conn()).await.unwrap();

        assert!(tx.rollback().await.is_ok());
    }
}
