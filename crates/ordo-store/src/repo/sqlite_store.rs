//! `SequenceStore` over SQLite
//!
//! One `SqliteStore` serves one sibling family. Each `with_parent_lock`
//! call is a `BEGIN IMMEDIATE` transaction whose first statement bumps the
//! parent row's `lock_epoch`; that write is the parent lock. SQLite holds a
//! single write lock per database, so writers on different parents queue
//! behind each other here, bounded by the busy timeout.

use std::path::Path;

use ordo_core::config::EngineConfig;
use ordo_core::errors::{OrdoError, Result};
use ordo_core::model::{OrderedRecord, Slot};
use ordo_core::ops::{SequenceStore, Shift, SiblingSet};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::errors::{corrupt_position, from_rusqlite, from_sibling_write};
use crate::family::{Family, PARENT_TABLE};
use crate::pool::ConnectionPool;

pub struct SqliteStore {
    pool: ConnectionPool,
    family: Family,
}

impl SqliteStore {
    /// Open (or create) a database file for `family`, applying migrations
    pub fn open<P: AsRef<Path>>(path: P, family: Family, config: &EngineConfig) -> Result<Self> {
        let pool = ConnectionPool::open(path.as_ref().to_path_buf(), config.busy_timeout())?;
        tracing::debug!(path = %path.as_ref().display(), family = %family, "sqlite store opened");
        Ok(Self { pool, family })
    }

    /// Fresh in-memory database; every transaction shares its one connection
    pub fn open_in_memory(family: Family, config: &EngineConfig) -> Result<Self> {
        let pool = ConnectionPool::in_memory(config.busy_timeout())?;
        Ok(Self { pool, family })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Run a read-only query on a pooled connection
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.pool.get()?;
        f(&conn)
    }
}

fn to_position(parent_id: &str, raw: Option<i64>) -> Result<Option<u32>> {
    match raw {
        None => Ok(None),
        Some(value) => u32::try_from(value)
            .ok()
            .filter(|p| *p > 0)
            .map(Some)
            .ok_or_else(|| corrupt_position(parent_id, value)),
    }
}

fn query_slots(conn: &Connection, table: &str, parent_id: &str) -> Result<Vec<Slot>> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT id, position FROM {table} WHERE quote_id = ?1
             ORDER BY position IS NULL, position, id"
        ))
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([parent_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter()
        .map(|(id, raw)| Ok(Slot::new(id, to_position(parent_id, raw)?)))
        .collect()
}

fn parent_exists(conn: &Connection, parent_id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT 1 FROM {PARENT_TABLE} WHERE id = ?1"),
            [parent_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;
    Ok(found.is_some())
}

/// The transaction-scoped view handed to the ordering algorithm
struct SqliteSiblingSet<'c> {
    tx: Transaction<'c>,
    table: &'static str,
    parent_id: String,
}

impl SqliteSiblingSet<'_> {
    /// Take the parent lock by writing the parent row
    fn lock_parent(&self) -> Result<()> {
        let touched = self
            .tx
            .execute(
                &format!("UPDATE {PARENT_TABLE} SET lock_epoch = lock_epoch + 1 WHERE id = ?1"),
                [&self.parent_id],
            )
            .map_err(from_rusqlite)?;
        if touched == 0 {
            return Err(OrdoError::ParentNotFound {
                parent_id: self.parent_id.clone(),
            });
        }
        Ok(())
    }
}

impl SiblingSet for SqliteSiblingSet<'_> {
    fn parent_id(&self) -> &str {
        &self.parent_id
    }

    fn acquire(&mut self, parent_id: &str) -> Result<()> {
        if parent_id == self.parent_id {
            return Ok(());
        }
        Err(OrdoError::LockScopeViolation {
            held: self.parent_id.clone(),
            requested: parent_id.to_string(),
        })
    }

    fn get(&self, record_id: &str) -> Result<Option<OrderedRecord>> {
        let row: Option<Option<i64>> = self
            .tx
            .query_row(
                &format!(
                    "SELECT position FROM {} WHERE id = ?1 AND quote_id = ?2",
                    self.table
                ),
                rusqlite::params![record_id, self.parent_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        match row {
            None => Ok(None),
            Some(raw) => {
                let slot = Slot::new(record_id, to_position(&self.parent_id, raw)?);
                slot.into_record(&self.parent_id).map(Some)
            }
        }
    }

    fn max_position(&self) -> Result<Option<u32>> {
        let raw: Option<i64> = self
            .tx
            .query_row(
                &format!("SELECT MAX(position) FROM {} WHERE quote_id = ?1", self.table),
                [&self.parent_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        to_position(&self.parent_id, raw)
    }

    fn siblings(&self) -> Result<Vec<Slot>> {
        query_slots(&self.tx, self.table, &self.parent_id)
    }

    fn shift(&mut self, shift: Shift) -> Result<usize> {
        // UNIQUE is checked per row, so `position + 1` over a contiguous range
        // would collide with its neighbour mid-statement. Move the range to
        // negative values first, then flip it back.
        let moved = self
            .tx
            .execute(
                &format!(
                    "UPDATE {} SET position = -(position + ?2)
                     WHERE quote_id = ?1 AND position >= ?3 AND (?4 IS NULL OR position <= ?4)",
                    self.table
                ),
                rusqlite::params![self.parent_id, shift.delta.as_i64(), shift.from, shift.to],
            )
            .map_err(|e| from_sibling_write(e, &self.parent_id, None))?;

        self.tx
            .execute(
                &format!(
                    "UPDATE {} SET position = -position WHERE quote_id = ?1 AND position < 0",
                    self.table
                ),
                [&self.parent_id],
            )
            .map_err(|e| from_sibling_write(e, &self.parent_id, None))?;

        Ok(moved)
    }

    fn insert(&mut self, record: &OrderedRecord) -> Result<()> {
        self.acquire(&record.parent_id)?;
        self.tx
            .execute(
                &format!(
                    "INSERT INTO {} (id, quote_id, position, created_at) VALUES (?1, ?2, ?3, ?4)",
                    self.table
                ),
                rusqlite::params![
                    record.id,
                    record.parent_id,
                    record.position,
                    chrono::Utc::now().timestamp(),
                ],
            )
            .map_err(|e| from_sibling_write(e, &self.parent_id, Some(record.position)))?;
        Ok(())
    }

    fn set_position(&mut self, record_id: &str, position: Option<u32>) -> Result<()> {
        let updated = self
            .tx
            .execute(
                &format!(
                    "UPDATE {} SET position = ?3 WHERE id = ?1 AND quote_id = ?2",
                    self.table
                ),
                rusqlite::params![record_id, self.parent_id, position],
            )
            .map_err(|e| from_sibling_write(e, &self.parent_id, position))?;
        if updated == 0 {
            return Err(OrdoError::RecordNotFound {
                record_id: record_id.to_string(),
            });
        }
        Ok(())
    }

    fn remove(&mut self, record_id: &str) -> Result<bool> {
        let deleted = self
            .tx
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1 AND quote_id = ?2", self.table),
                rusqlite::params![record_id, self.parent_id],
            )
            .map_err(from_rusqlite)?;
        Ok(deleted > 0)
    }
}

impl SequenceStore for SqliteStore {
    fn with_parent_lock<T, F>(&self, parent_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SiblingSet) -> Result<T>,
    {
        let mut conn = self.pool.get()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        let mut set = SqliteSiblingSet {
            tx,
            table: self.family.table(),
            parent_id: parent_id.to_string(),
        };
        set.lock_parent()?;
        tracing::debug!(parent_id, table = set.table, "parent lock held");

        // Dropping `set` on the error path rolls the transaction back.
        let value = f(&mut set)?;

        set.tx
            .commit()
            .map_err(|e| from_sibling_write(e, parent_id, None))?;
        Ok(value)
    }

    fn parent_of(&self, record_id: &str) -> Result<Option<String>> {
        let conn = self.pool.get()?;
        conn.query_row(
            &format!("SELECT quote_id FROM {} WHERE id = ?1", self.family.table()),
            [record_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    fn snapshot(&self, parent_id: &str) -> Result<Vec<Slot>> {
        let conn = self.pool.get()?;
        if !parent_exists(&conn, parent_id)? {
            return Err(OrdoError::ParentNotFound {
                parent_id: parent_id.to_string(),
            });
        }
        query_slots(&conn, self.family.table(), parent_id)
    }

    fn register_parent(&self, parent_id: &str) -> Result<()> {
        let conn = self.pool.get()?;
        let inserted = conn
            .execute(
                &format!(
                    "INSERT INTO {PARENT_TABLE} (id, created_at) VALUES (?1, ?2)
                     ON CONFLICT(id) DO NOTHING"
                ),
                rusqlite::params![parent_id, chrono::Utc::now().timestamp()],
            )
            .map_err(from_rusqlite)?;
        if inserted == 0 {
            return Err(OrdoError::ParentAlreadyExists {
                parent_id: parent_id.to_string(),
            });
        }
        Ok(())
    }

    fn remove_parent(&self, parent_id: &str) -> Result<()> {
        let conn = self.pool.get()?;
        // Records of every family go with it (ON DELETE CASCADE)
        let deleted = conn
            .execute(
                &format!("DELETE FROM {PARENT_TABLE} WHERE id = ?1"),
                [parent_id],
            )
            .map_err(from_rusqlite)?;
        if deleted == 0 {
            return Err(OrdoError::ParentNotFound {
                parent_id: parent_id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_core::ops::ShiftDelta;

    fn store_with(parent: &str, positions: &[u32]) -> SqliteStore {
        let store = SqliteStore::open_in_memory(Family::QuoteLines, &EngineConfig::default())
            .unwrap();
        store.register_parent(parent).unwrap();
        store
            .with_parent_lock(parent, |set| {
                for (i, p) in positions.iter().enumerate() {
                    set.insert(&OrderedRecord::new(format!("r{}", i + 1), parent, *p))?;
                }
                Ok(())
            })
            .unwrap();
        store
    }

    fn positions(store: &SqliteStore, parent: &str) -> Vec<(String, Option<u32>)> {
        store
            .snapshot(parent)
            .unwrap()
            .into_iter()
            .map(|s| (s.id, s.position))
            .collect()
    }

    #[test]
    fn test_unknown_parent_is_not_found() {
        let store = SqliteStore::open_in_memory(Family::QuoteLines, &EngineConfig::default())
            .unwrap();
        let err = store.with_parent_lock("nope", |_| Ok(())).unwrap_err();
        assert!(matches!(err, OrdoError::ParentNotFound { .. }));
    }

    #[test]
    fn test_shift_over_contiguous_range_does_not_collide() {
        let store = store_with("q", &[1, 2, 3, 4]);
        let moved = store
            .with_parent_lock("q", |set| {
                set.shift(Shift {
                    from: 2,
                    to: None,
                    delta: ShiftDelta::Increment,
                })
            })
            .unwrap();
        assert_eq!(moved, 3);
        assert_eq!(
            positions(&store, "q"),
            vec![
                ("r1".to_string(), Some(1)),
                ("r2".to_string(), Some(3)),
                ("r3".to_string(), Some(4)),
                ("r4".to_string(), Some(5)),
            ]
        );
    }

    #[test]
    fn test_bounded_decrement() {
        let store = store_with("q", &[1, 2, 3, 4]);
        store
            .with_parent_lock("q", |set| {
                set.set_position("r1", None)?;
                set.shift(Shift {
                    from: 2,
                    to: Some(3),
                    delta: ShiftDelta::Decrement,
                })?;
                set.set_position("r1", Some(3))
            })
            .unwrap();
        let order: Vec<_> = positions(&store, "q").into_iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["r2", "r3", "r1", "r4"]);
    }

    #[test]
    fn test_duplicate_position_is_sibling_conflict() {
        let store = store_with("q", &[1]);
        let err = store
            .with_parent_lock("q", |set| set.insert(&OrderedRecord::new("dup", "q", 1)))
            .unwrap_err();
        assert!(matches!(
            err,
            OrdoError::SiblingConflict {
                position: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let store = store_with("q", &[1, 2]);
        let result: Result<()> = store.with_parent_lock("q", |set| {
            set.shift(Shift {
                from: 1,
                to: None,
                delta: ShiftDelta::Increment,
            })?;
            Err(OrdoError::Internal {
                message: "boom".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(
            positions(&store, "q"),
            vec![("r1".to_string(), Some(1)), ("r2".to_string(), Some(2))]
        );
    }

    #[test]
    fn test_acquire_other_parent_is_scope_violation() {
        let store = store_with("q", &[]);
        store.register_parent("other").unwrap();
        let err = store
            .with_parent_lock("q", |set| {
                set.acquire("q")?;
                set.acquire("other")
            })
            .unwrap_err();
        assert!(matches!(err, OrdoError::LockScopeViolation { .. }));
    }

    #[test]
    fn test_families_are_separate_tables() {
        let store = store_with("q", &[1]);
        let owner = store.parent_of("r1").unwrap();
        assert_eq!(owner.as_deref(), Some("q"));

        let rows: i64 = store
            .with_connection(|conn| {
                conn.query_row("SELECT COUNT(*) FROM quote_sections", [], |row| row.get(0))
                    .map_err(from_rusqlite)
            })
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_remove_parent_cascades() {
        let store = store_with("q", &[1, 2]);
        store.remove_parent("q").unwrap();
        assert_eq!(store.parent_of("r1").unwrap(), None);
        assert!(matches!(
            store.snapshot("q").unwrap_err(),
            OrdoError::ParentNotFound { .. }
        ));
    }

    #[test]
    fn test_register_twice_fails() {
        let store = store_with("q", &[]);
        assert!(matches!(
            store.register_parent("q").unwrap_err(),
            OrdoError::ParentAlreadyExists { .. }
        ));
    }
}
