//! Migration runner

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension};

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::get_migrations;

/// Apply all pending migrations to the database
///
/// Already-applied migrations are skipped after their stored checksum is
/// compared with the embedded SQL. A database carrying a migration this
/// build does not know about is refused rather than written to.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    create_schema_version_table(conn)?;

    let applied = applied_checksums(conn)?;
    let migrations = get_migrations();

    for id in applied.keys() {
        if !migrations.iter().any(|m| m.id == id) {
            return Err(migration_error(
                id,
                "database was written by a newer schema than this build knows",
            ));
        }
    }

    for migration in migrations {
        let checksum = compute_checksum(migration.sql);
        match applied.get(migration.id) {
            Some(Some(stored)) if *stored != checksum => {
                return Err(checksum_mismatch(migration.id, stored, &checksum));
            }
            Some(_) => continue,
            None => apply_migration(conn, migration.id, migration.sql, &checksum)?,
        }
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

fn applied_checksums(conn: &Connection) -> Result<HashMap<String, Option<String>>> {
    let mut stmt = conn
        .prepare("SELECT migration_id, checksum FROM schema_version")
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

fn apply_migration(
    conn: &mut Connection,
    migration_id: &str,
    sql: &str,
    checksum: &str,
) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    // Another connection may have applied it since we looked.
    let raced: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM schema_version WHERE migration_id = ?1",
            [migration_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;
    if raced.is_some() {
        return Ok(());
    }

    tx.execute_batch(sql)
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![migration_id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id, "applied migration");
    Ok(())
}
