//! Database migrations

use rusqlite::Connection;

use super::db::DatabaseError;

/// Layout version recorded in `PRAGMA user_version`
pub const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
///
/// # Errors
/// Returns an error if migrations fail or the database is newer than this build
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version > CURRENT_VERSION {
        return Err(DatabaseError::Migration(format!(
            "database layout version {version} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    if version < 1 {
        migrate_v1(conn)?;
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)?;
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        r"
        -- Profiles table
        -- Full profile record as JSON in data; position keeps insertion order
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            position INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- Small key/value table for singletons such as the active profile
        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_profiles_name ON profiles(name);
        ",
    )?;

    Ok(())
}
