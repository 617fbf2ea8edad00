//! Database connection management using Diesel ORM.
//!
//! [`PoolManager`] owns a lazily built r2d2 pool of SQLite connections.
//! The application constructs one manager at startup, shares it (behind an
//! `Arc`) with every recorder, and calls [`PoolManager::shutdown`] on exit.

use std::time::Duration;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection, State};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// A checked-out connection. Dropping it returns it to the pool.
pub type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Per-connection SQLite settings applied when r2d2 opens a connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        configure_sqlite_connection(conn, self.busy_timeout_ms)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Configure SQLite connection pragmas used for status writes.
///
/// # Errors
/// Returns an error if a pragma fails to apply.
pub fn configure_sqlite_connection(
    conn: &mut SqliteConnection,
    busy_timeout_ms: u32,
) -> QueryResult<()> {
    diesel::sql_query(format!("PRAGMA busy_timeout={busy_timeout_ms}")).execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys=ON").execute(conn)?;
    Ok(())
}

/// Build a connection pool for the given configuration.
///
/// Blocks until `min_connections` connections are open or
/// `connect_timeout_secs` elapses.
///
/// # Errors
/// Returns [`Error::Config`] for invalid pool bounds and
/// [`Error::PoolInit`] if the store cannot be opened in time.
pub fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    config.validate()?;

    let manager = ConnectionManager::<SqliteConnection>::new(&config.path);
    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connection_customizer(Box::new(SqlitePragmas {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .build(manager)
        .map_err(|e| Error::PoolInit(e.to_string()))?;

    // WAL lets readers proceed while a stage holds the write lock.
    match pool.get() {
        Ok(mut conn) => {
            if let Err(e) = diesel::sql_query("PRAGMA journal_mode=WAL").execute(&mut conn) {
                warn!(error = %e, "Failed to enable WAL journal mode");
            }
        }
        Err(e) => return Err(Error::PoolInit(e.to_string())),
    }

    Ok(pool)
}

/// Run all pending database migrations.
///
/// Migrations run under the write lock, so a second process or pool
/// initializing the same file waits and then finds nothing pending.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool
        .get()
        .map_err(|e| Error::PoolExhausted(e.to_string()))?;
    conn.immediate_transaction(|conn| {
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|e| Error::Migration(e.to_string()))
    })
}

/// Lazily initialized, explicitly owned connection pool.
///
/// The first [`acquire`](Self::acquire) builds the pool and migrates the
/// schema; later calls reuse it. [`shutdown`](Self::shutdown) drops the pool
/// and returns the manager to its uninitialized state.
pub struct PoolManager {
    config: DatabaseConfig,
    pool: Mutex<Option<DbPool>>,
}

impl PoolManager {
    /// Create an uninitialized manager. No connection is opened here.
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Initialize the pool now instead of on first use.
    ///
    /// # Errors
    /// Returns the initialization error; there is no recording without a pool.
    pub fn init(&self) -> Result<()> {
        self.pool().map(|_| ())
    }

    /// Check out a connection, initializing the pool on first use.
    ///
    /// Blocks while every connection is in use, up to the connect timeout.
    ///
    /// # Errors
    /// Returns [`Error::PoolInit`] / [`Error::Migration`] if lazy
    /// initialization fails, or [`Error::PoolExhausted`] if no connection
    /// becomes available in time.
    pub fn acquire(&self) -> Result<PooledConn> {
        let pool = self.pool()?;
        pool.get().map_err(|e| Error::PoolExhausted(e.to_string()))
    }

    /// Return a connection to the pool.
    ///
    /// Equivalent to dropping the connection.
    pub fn release(&self, conn: PooledConn) {
        drop(conn);
    }

    /// Drop the pool and reset to uninitialized. Safe to call repeatedly.
    ///
    /// Connections still checked out close when their holders drop them.
    pub fn shutdown(&self) {
        let pool = self.pool.lock().take();
        if let Some(pool) = pool {
            debug!(connections = pool.state().connections, "Closing status database pool");
            drop(pool);
            info!(path = %self.config.path, "Status database pool closed");
        }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.pool.lock().is_some()
    }

    /// Pool occupancy, or `None` before initialization.
    #[must_use]
    pub fn state(&self) -> Option<State> {
        self.pool.lock().as_ref().map(Pool::state)
    }

    /// Current pool, building one if none is installed.
    ///
    /// The pool is built without holding the lock, so concurrent first
    /// callers each wait at most one connect timeout. If two of them race,
    /// the first to install wins and the other pool is dropped.
    fn pool(&self) -> Result<DbPool> {
        if let Some(pool) = self.pool.lock().as_ref() {
            return Ok(pool.clone());
        }

        let pool = create_pool(&self.config)?;
        run_migrations(&pool)?;

        let mut guard = self.pool.lock();
        if let Some(installed) = guard.as_ref() {
            debug!("Discarding duplicate status database pool");
            return Ok(installed.clone());
        }
        info!(
            path = %self.config.path,
            min = self.config.min_connections,
            max = self.config.max_connections,
            "Status database pool initialized"
        );
        *guard = Some(pool.clone());
        Ok(pool)
    }
}

impl std::fmt::Debug for PoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolManager")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Drop for PoolManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
