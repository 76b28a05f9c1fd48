//! Database connection management

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Per-connection settings
///
/// Foreign keys must be switched on for every connection (parent removal
/// cascades to its records). WAL lets readers see the last committed state
/// while a writer holds the lock; it does not apply to in-memory databases.
pub fn configure(conn: &Connection, busy_timeout: Duration, wal: bool) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    if wal {
        // journal_mode answers with the mode now in effect
        let _mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(from_rusqlite)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(from_rusqlite)?;
    }

    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;
    Ok(())
}
