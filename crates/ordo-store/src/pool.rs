//! A small blocking connection pool
//!
//! File databases hand out one connection per concurrent caller, opening new
//! ones on demand and keeping up to `MAX_IDLE` around. An in-memory database
//! lives and dies with its single connection, so callers queue for it.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use ordo_core::errors::{OrdoError, Result};
use rusqlite::Connection;

use crate::db;
use crate::migrations::apply_migrations;

const MAX_IDLE: usize = 8;

enum Source {
    File(PathBuf),
    Memory,
}

pub(crate) struct ConnectionPool {
    source: Source,
    busy_timeout: Duration,
    idle: Mutex<Vec<Connection>>,
    returned: Condvar,
}

impl ConnectionPool {
    /// Open (or create) a database file and bring its schema up to date
    pub(crate) fn open(path: PathBuf, busy_timeout: Duration) -> Result<Self> {
        let mut conn = db::open(&path)?;
        db::configure(&conn, busy_timeout, true)?;
        apply_migrations(&mut conn)?;

        Ok(Self {
            source: Source::File(path),
            busy_timeout,
            idle: Mutex::new(vec![conn]),
            returned: Condvar::new(),
        })
    }

    pub(crate) fn in_memory(busy_timeout: Duration) -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn, busy_timeout, false)?;
        apply_migrations(&mut conn)?;

        Ok(Self {
            source: Source::Memory,
            busy_timeout,
            idle: Mutex::new(vec![conn]),
            returned: Condvar::new(),
        })
    }

    /// Take a connection, blocking only for an in-memory database in use
    pub(crate) fn get(&self) -> Result<PooledConnection<'_>> {
        let mut idle = self.lock_idle()?;
        loop {
            if let Some(conn) = idle.pop() {
                return Ok(PooledConnection {
                    conn: Some(conn),
                    pool: self,
                });
            }
            match &self.source {
                Source::File(path) => {
                    drop(idle);
                    let conn = db::open(path)?;
                    db::configure(&conn, self.busy_timeout, true)?;
                    return Ok(PooledConnection {
                        conn: Some(conn),
                        pool: self,
                    });
                }
                Source::Memory => {
                    idle = self
                        .returned
                        .wait(idle)
                        .map_err(|_| OrdoError::poisoned("connection pool"))?;
                }
            }
        }
    }

    fn lock_idle(&self) -> Result<MutexGuard<'_, Vec<Connection>>> {
        self.idle
            .lock()
            .map_err(|_| OrdoError::poisoned("connection pool"))
    }

    fn put_back(&self, conn: Connection) {
        // A poisoned pool just lets the connection close.
        let Ok(mut idle) = self.idle.lock() else {
            return;
        };
        if matches!(self.source, Source::Memory) || idle.len() < MAX_IDLE {
            idle.push(conn);
            self.returned.notify_one();
        }
    }
}

/// A connection on loan from the pool; returned on drop
pub(crate) struct PooledConnection<'p> {
    conn: Option<Connection>,
    pool: &'p ConnectionPool,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("connection is present until the loan is dropped")
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn
            .as_mut()
            .expect("connection is present until the loan is dropped")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put_back(conn);
        }
    }
}
