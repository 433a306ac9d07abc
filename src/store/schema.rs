//! SQLite DDL for the record store.
//!
//! All `CREATE TABLE` / `CREATE INDEX` statements live here so they are
//! reviewable and testable in isolation.

use rusqlite::Connection;

/// Current schema version. Any column change bumps this, and a mismatch on
/// open triggers the destructive migration in [`migrate_if_needed`].
pub(crate) const SCHEMA_VERSION: u32 = 4;

/// Complete DDL for the tracker database.
///
/// Uses `IF NOT EXISTS` throughout so `apply_schema` is idempotent.
pub(crate) const SCHEMA_SQL: &str = r#"
-- Enable WAL mode for concurrent reads during writes.
PRAGMA journal_mode = WAL;

-- Schema version tracking.
CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Timed daily reminders.
CREATE TABLE IF NOT EXISTS reminders (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    details TEXT,
    hour    INTEGER NOT NULL,
    minute  INTEGER NOT NULL
);

-- Status-tracked tasks.
CREATE TABLE IF NOT EXISTS tasks (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    title   TEXT NOT NULL,
    details TEXT,
    status  INTEGER NOT NULL
);

-- Status equality is the one fixed non-id lookup.
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
"#;

/// Apply the full schema to an open connection.
///
/// Safe to call multiple times. Seeds the schema version into `schema_meta`
/// if this is a fresh database.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let version_str = SCHEMA_VERSION.to_string();
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![version_str],
    )?;

    Ok(())
}

/// Read the stored schema version.
///
/// Returns `None` if the `schema_meta` table is empty or the key is missing.
pub(crate) fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_meta WHERE key = 'schema_version'")?;
    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().ok())
        }
        None => Ok(None),
    }
}

/// Destructive migration: on any version mismatch, drop and recreate both
/// tables. No data is preserved across versions — a documented limitation
/// of the schema policy, matching the version-bump contract.
///
/// Returns `true` when a migration ran.
pub(crate) fn migrate_if_needed(conn: &Connection) -> rusqlite::Result<bool> {
    let stored = read_schema_version(conn)?;
    if stored == Some(SCHEMA_VERSION) {
        return Ok(false);
    }

    conn.execute_batch(
        "DROP TABLE IF EXISTS reminders;\n\
         DROP TABLE IF EXISTS tasks;",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR REPLACE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![SCHEMA_VERSION.to_string()],
    )?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
