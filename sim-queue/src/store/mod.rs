mod connection;
mod projections;
mod rows;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::Result;

pub use connection::StageCounts;
pub use projections::{CompletedJob, QueuedJob, RunningJob};
pub use rows::Listing;

/// Schema script creating the `simulator`, `simulation`, `queue`, `running`
/// and `complete` tables.
pub const SCHEMA: &str = include_str!("../../sql/tables.sql");

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

const TABLES: [&str; 5] = ["simulator", "simulation", "queue", "running", "complete"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// How long a statement waits on a lock held by another process before
    /// failing with `SQLITE_BUSY`.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

/// SQLite-backed simulation store.
///
/// Owns the location of the database file and hands out one [`Connection`]
/// per unit of work. The schema is guaranteed to exist once [`Store::open`]
/// returns.
#[derive(Debug, Clone)]
pub struct Store {
    db_path: PathBuf,
    config: StoreConfig,
}

/// Transactional handle over the store.
///
/// Nothing written through a connection is durable until [`Connection::commit`]
/// (or [`Connection::close`]) runs. A transaction is opened lazily by the first
/// write after a commit or rollback.
pub struct Connection {
    conn: rusqlite::Connection,
}

impl Store {
    /// Open (or create) the database at `db_path` with the bundled schema.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(db_path, StoreConfig::default(), SCHEMA)
    }

    /// Open (or create) the database, running `schema_script` if any of the
    /// store tables is missing. Missing parent directories are created.
    pub fn open_with(
        db_path: impl AsRef<Path>,
        config: StoreConfig,
        schema_script: &str,
    ) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let store = Self { db_path, config };
        store.with_connection(|conn| {
            if conn.has_schema()? {
                return Ok(());
            }
            tracing::info!(path = %store.db_path.display(), "creating simulation tables");
            conn.execute_script(schema_script)
        })?;

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open a new connection with foreign keys enforced.
    ///
    /// Prefer [`Store::with_connection`], which guarantees the handle is
    /// released.
    pub fn connect(&self) -> Result<Connection> {
        let conn = rusqlite::Connection::open(&self.db_path)?;
        conn.busy_timeout(self.config.busy_timeout)?;
        // Off by default in SQLite; has no effect once a transaction is open.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        tracing::debug!(path = %self.db_path.display(), "opened store connection");
        Ok(Connection { conn })
    }

    /// Run `f` against a fresh connection and release it on every exit path.
    ///
    /// When `f` returns `Ok` the connection is closed, which commits whatever
    /// is still pending. When `f` returns `Err` nothing is committed: the
    /// handle is dropped with its open transaction and SQLite discards the
    /// uncommitted work. Work the closure already committed explicitly stays
    /// committed in both cases.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connect()?;
        match f(&conn) {
            Ok(value) => {
                conn.close()?;
                Ok(value)
            }
            Err(err) => {
                if conn.in_transaction() {
                    tracing::warn!(error = %err, "unit of work failed; discarding uncommitted changes");
                }
                drop(conn);
                Err(err)
            }
        }
    }
}
