//! SQLite-backed repositories.
//!
//! A single rusqlite connection is shared behind `Arc<Mutex<_>>`; every
//! repository call locks it for one statement (or one read-modify-read
//! sequence), so concurrent edits are last-write-wins.

mod company_store;
mod job_store;
mod migrations;

use std::error::Error as StdError;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{ffi, types::Type, Connection};
use serde::{de::DeserializeOwned, Serialize};

use super::RepositoryError;

pub const IN_MEMORY: &str = ":memory:";

/// Shared handle over one SQLite connection. Cloning is cheap.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and applies pending migrations.
    /// `:memory:` opens an ephemeral store.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        if path.as_os_str() == IN_MEMORY {
            return Self::open_in_memory();
        }

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| {
                RepositoryError::Unavailable(format!(
                    "cannot create {}: {error}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        migrations::run_all(&conn)?;
        tracing::info!(path = %path.display(), "careers database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::run_all(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection lock poisoned".to_string()))?;
        f(&conn).map_err(RepositoryError::from)
    }

    /// Runs `f` inside `BEGIN IMMEDIATE`, committing on `Ok` and rolling back
    /// on `Err` or when `f` unwinds. Other callers sharing this store join the
    /// open transaction, so it is meant for single-writer batch work such as
    /// imports.
    pub fn run_in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.with_conn(|conn| conn.execute_batch("BEGIN IMMEDIATE"))?;
        let guard = RollbackGuard {
            store: self,
            armed: true,
        };

        let value = f(self)?;
        guard.commit()?;
        Ok(value)
    }
}

/// Rolls the open transaction back when dropped without `commit`.
struct RollbackGuard<'a> {
    store: &'a SqliteStore,
    armed: bool,
}

impl RollbackGuard<'_> {
    fn commit(mut self) -> Result<(), RepositoryError> {
        self.store.with_conn(|conn| conn.execute_batch("COMMIT"))?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for RollbackGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // A poisoned lock means the connection itself panicked mid-statement.
        let conn = match self.store.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        if conn.is_autocommit() {
            return;
        }
        if let Err(error) = conn.execute_batch("ROLLBACK") {
            tracing::error!(error = %error, "rollback failed");
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, _)
                if matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                ) =>
            {
                Self::Conflict
            }
            _ => Self::Unavailable(error.to_string()),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|error| RepositoryError::Unavailable(error.to_string()))
}

fn conversion_error(
    column: usize,
    error: impl Into<Box<dyn StdError + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, error.into())
}

fn json_column<T: DeserializeOwned>(column: usize, raw: &str) -> Result<T, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|error| conversion_error(column, error))
}

fn timestamp_column(column: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| conversion_error(column, error))
}
