//! Database handle - SQLite file with per-call sessions
//!
//! The handle is built once per process from a [`StorageConfig`] and shared
//! by reference (it is cheap to clone). It owns no open connection: every
//! operation opens its own session on a blocking worker thread and drops it
//! when the closure returns, on success and failure alike.
//!
//! # Layout
//! ```text
//! <data_dir>/
//!   fillwatch.db        locations, bins, fill_events
//!   fillwatch.db-wal    WAL journal
//! ```

use crate::storage::error::{StorageError, StorageResult};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        details TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS bins (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        location_id INTEGER NOT NULL REFERENCES locations(id) ON DELETE CASCADE,
        description TEXT NOT NULL DEFAULT ''
    );

    CREATE INDEX IF NOT EXISTS idx_bins_location ON bins(location_id);

    CREATE TABLE IF NOT EXISTS fill_events (
        bin_id INTEGER NOT NULL REFERENCES bins(id) ON DELETE CASCADE,
        timestamp INTEGER NOT NULL,
        fill_level REAL NOT NULL,
        status INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_fill_events_bin_ts ON fill_events(bin_id, timestamp);
";

/// Configuration for the database handle
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for the database file
    pub data_dir: PathBuf,
    /// File name of the SQLite database inside `data_dir`
    pub database_file: String,
    /// How long a session waits on a locked database (default: 5000)
    pub busy_timeout_ms: u64,
    /// Enforce bin/location references on write
    pub enforce_foreign_keys: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("fillwatch_data"),
            database_file: "fillwatch.db".to_string(),
            busy_timeout_ms: 5000,
            enforce_foreign_keys: true,
        }
    }
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Get path to the database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

/// Shared data-access handle
#[derive(Debug, Clone)]
pub struct Database {
    config: Arc<StorageConfig>,
}

impl Database {
    /// Create the data directory and schema, then return the handle
    pub async fn open(config: StorageConfig) -> StorageResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let path = config.database_path();
        let setup_path = path.clone();

        tokio::task::spawn_blocking(move || -> StorageResult<()> {
            let conn = Connection::open_with_flags(
                &setup_path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;

            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await??;

        tracing::info!(path = %path.display(), "Database ready");

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Path of the underlying database file
    pub fn path(&self) -> PathBuf {
        self.config.database_path()
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Open a fresh session
    ///
    /// The file must already exist; a missing database is reported as
    /// unavailable rather than silently recreated without a schema.
    fn connect(config: &StorageConfig) -> StorageResult<Connection> {
        let path = config.database_path();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            StorageError::Unavailable(format!("cannot open {}: {}", path.display(), e))
        })?;

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        if config.enforce_foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }

        Ok(conn)
    }

    /// Run `f` against a session scoped to this call
    pub async fn run<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let config = Arc::clone(&self.config);

        tokio::task::spawn_blocking(move || {
            let mut conn = Self::connect(&config)?;
            f(&mut conn)
        })
        .await?
    }

    /// Round-trip a trivial statement to verify the store is reachable
    pub async fn ping(&self) -> StorageResult<()> {
        self.run(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}
