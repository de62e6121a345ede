//! The `llmprof.db` handle
//!
//! One SQLite file per data directory holds the `profiles` table and the
//! `app_state` key/value table. Opening it always brings the schema up to
//! the current version.

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use super::migrations;

/// Failures below the profile store
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    /// A stored `data` column no longer decodes as a profile
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Open profile database
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the profile database at `path`, creating and migrating it as needed
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or its schema is newer
    /// than this build understands
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path)?;
        // Concurrent CLI invocations read while another writes
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::prepare(conn)
    }

    /// Fresh private database, used by tests and throwaway stores
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created
    pub fn in_memory() -> Result<Self, DatabaseError> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self, DatabaseError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Connection for building a [`ProfileStore`](super::ProfileStore)
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
