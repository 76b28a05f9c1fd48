//! Error handling for ordo-store
//!
//! Maps rusqlite failures onto `OrdoError`, keeping a `(parent, position)`
//! uniqueness violation distinct from every other storage failure.

use ordo_core::errors::OrdoError;
use rusqlite::ffi;

pub use ordo_core::errors::Result;

/// Generic database failure
pub fn from_rusqlite(err: rusqlite::Error) -> OrdoError {
    OrdoError::Persistence {
        message: err.to_string(),
    }
}

/// True for a violation of a UNIQUE constraint (not the primary key)
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Map a failure from a write to a parent's sibling rows
pub fn from_sibling_write(err: rusqlite::Error, parent_id: &str, position: Option<u32>) -> OrdoError {
    if is_unique_violation(&err) {
        return OrdoError::SiblingConflict {
            parent_id: parent_id.to_string(),
            position,
            message: err.to_string(),
        };
    }
    from_rusqlite(err)
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> OrdoError {
    OrdoError::Persistence {
        message: format!("Migration {} failed: {}", migration_id, reason),
    }
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> OrdoError {
    OrdoError::Persistence {
        message: format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ),
    }
}

/// A stored position that is not a committed value (negative or too large)
pub fn corrupt_position(parent_id: &str, raw: i64) -> OrdoError {
    OrdoError::InvariantViolation {
        parent_id: parent_id.to_string(),
        reason: format!("stored position {} is not a valid position", raw),
    }
}
