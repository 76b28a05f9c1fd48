//! The storage seam between the ordering algorithm and a Sequence Store
//!
//! A Sequence Store keeps `(parent_id, position, record_id)` rows with
//! `(parent_id, position)` unique. The algorithm never talks to a backend
//! directly: it runs inside [`SequenceStore::with_parent_lock`] and sees only
//! the [`SiblingSet`] of the parent it locked.

use crate::errors::Result;
use crate::model::{OrderedRecord, Slot};

use super::plan::Shift;

/// Transaction-scoped view of one parent's siblings
///
/// Every method runs inside the transaction that holds the parent lock.
/// Writes become visible to other transactions only when the enclosing
/// `with_parent_lock` call returns `Ok`.
pub trait SiblingSet {
    /// The parent whose lock this transaction holds
    fn parent_id(&self) -> &str;

    /// Acquire the lock for `parent_id`
    ///
    /// Idempotent for the parent already held, so shared helpers can call it
    /// freely. Any other parent is a `LockScopeViolation`.
    fn acquire(&mut self, parent_id: &str) -> Result<()>;

    /// Look up one record of this parent
    fn get(&self, record_id: &str) -> Result<Option<OrderedRecord>>;

    /// Highest position held, ignoring unpositioned rows
    fn max_position(&self) -> Result<Option<u32>>;

    /// All siblings in `(position, id)` order, unpositioned rows last
    fn siblings(&self) -> Result<Vec<Slot>>;

    /// Apply a bulk shift; returns the number of rows moved
    fn shift(&mut self, shift: Shift) -> Result<usize>;

    /// Write a new record
    fn insert(&mut self, record: &OrderedRecord) -> Result<()>;

    /// Write one record's position; `None` parks it outside the sequence
    fn set_position(&mut self, record_id: &str, position: Option<u32>) -> Result<()>;

    /// Drop a record's row; returns whether it existed
    fn remove(&mut self, record_id: &str) -> Result<bool>;
}

/// A durable (or in-memory) home for sibling sequences
///
/// Implementations must make `with_parent_lock` both exclusive per parent and
/// atomic: either every write made through the `SiblingSet` lands, or none do.
pub trait SequenceStore: Send + Sync {
    /// Run `f` in one transaction holding the exclusive lock for `parent_id`
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err` or
    /// unwinds. The lock is released in every case.
    ///
    /// # Errors
    /// `ParentNotFound` if the parent does not exist once the lock is held,
    /// otherwise whatever `f` or the commit returns
    fn with_parent_lock<T, F>(&self, parent_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SiblingSet) -> Result<T>;

    /// Which parent owns `record_id`, read without any lock
    fn parent_of(&self, record_id: &str) -> Result<Option<String>>;

    /// Committed siblings of `parent_id`, read without taking the lock
    fn snapshot(&self, parent_id: &str) -> Result<Vec<Slot>>;

    /// Make `parent_id` known to the store
    fn register_parent(&self, parent_id: &str) -> Result<()>;

    /// Forget `parent_id` and every record under it
    fn remove_parent(&self, parent_id: &str) -> Result<()>;
}
