//! Engine commands, grouped by what they touch
//!
//! - `ordering`: position-mutating operations (create, move, reindex, release)
//! - `query`: lock-free reads of committed state
//! - `parents`: the parent registry

pub mod ordering;
pub mod parents;
pub mod query;
