//! SQLite access with one short-lived connection per logical operation.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::config::DatabaseConfig;
use crate::error::{PipelineError, Result};

/// Table layout the pipeline reads from and writes to. The tables are
/// provisioned outside this crate; the statement is kept here for tooling
/// and tests.
pub const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS params (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        date     TEXT NOT NULL,
        PS       REAL NOT NULL,
        QV2M     REAL NOT NULL,
        TS       REAL NOT NULL,
        TQV      REAL NOT NULL,
        Var_TQV  REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS prediction (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        country          TEXT NOT NULL,
        region           TEXT NOT NULL,
        city             TEXT NOT NULL,
        latitude         REAL NOT NULL,
        longitude        REAL NOT NULL,
        paramsID         INTEGER NOT NULL REFERENCES params(id),
        date             TEXT NOT NULL,
        predictedWeather REAL NOT NULL
    );";

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(&config.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection to an existing database file.
    ///
    /// The file is never created here: a missing database is a connection
    /// failure.
    pub fn open(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&self.path, flags).map_err(|source| {
            PipelineError::Connection {
                path: self.path.clone(),
                source,
            }
        })?;

        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|source| PipelineError::Connection {
                path: self.path.clone(),
                source,
            })?;

        Ok(conn)
    }

    /// Run `f` on a fresh connection and close it on every exit path.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.open()?;
        let result = f(&mut conn);

        if let Err((_conn, e)) = conn.close() {
            tracing::warn!("Failed to close connection to {}: {}", self.path.display(), e);
        }

        result
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        self.with_connection(|conn| {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            conn.query_row(&sql, [], |row| row.get(0))
                .map_err(PipelineError::Query)
        })
    }
}
