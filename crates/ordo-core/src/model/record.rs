use serde::{Deserialize, Serialize};

use crate::errors::{OrdoError, Result};

/// A record that participates in a positional sequence
///
/// Only the three engine-owned fields live here. Whatever the record
/// describes (a quote line, a quote section) is stored by the caller against
/// `id`; the engine never reads or writes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderedRecord {
    /// Unique identifier (UUID v7), assigned at creation
    pub id: String,

    /// The owning collection (e.g. a quote); fixed for the record's lifetime
    pub parent_id: String,

    /// 1-based place among the record's siblings
    pub position: u32,
}

impl OrderedRecord {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            position,
        }
    }
}

/// A created record together with the caller's payload, handed back untouched
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<P> {
    pub record: OrderedRecord,
    pub payload: P,
}

/// One row of a sibling set as the store sees it
///
/// `position` is `None` only while a record is parked inside a transaction,
/// or for rows written by a bulk import that did not assign positions yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: String,
    pub position: Option<u32>,
}

impl Slot {
    pub fn new(id: impl Into<String>, position: Option<u32>) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }

    /// Convert to a record, refusing unpositioned rows
    ///
    /// # Errors
    /// `InvariantViolation` when the slot has no position
    pub fn into_record(self, parent_id: &str) -> Result<OrderedRecord> {
        match self.position {
            Some(position) => Ok(OrderedRecord::new(self.id, parent_id, position)),
            None => Err(OrdoError::InvariantViolation {
                parent_id: parent_id.to_string(),
                reason: format!("record {} has no position", self.id),
            }),
        }
    }
}

/// Sibling order: by position, unpositioned rows last, ties broken by id
pub fn sort_slots(slots: &mut [Slot]) {
    slots.sort_by(|a, b| {
        (a.position.is_none(), a.position, &a.id).cmp(&(b.position.is_none(), b.position, &b.id))
    });
}
