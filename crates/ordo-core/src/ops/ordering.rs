//! Insert / move / reindex / release, written once for every sibling family
//!
//! Each function expects to run inside
//! [`SequenceStore::with_parent_lock`](super::sequence::SequenceStore::with_parent_lock)
//! and re-reads everything it needs through the locked [`SiblingSet`], so a
//! retry always starts from fresh positions.

use uuid::Uuid;

use crate::errors::{OrdoError, Result};
use crate::model::OrderedRecord;

use super::plan::{clamp_move_target, plan_insert, plan_move, plan_reindex, InsertPlan};
use super::sequence::SiblingSet;

/// Outcome of a move, for logging and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub record: OrderedRecord,
    /// Siblings whose position changed (the moved record not included)
    pub shifted: usize,
}

/// Outcome of a create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub record: OrderedRecord,
    pub shifted: usize,
}

/// Create a record under the locked parent
///
/// `position` must already be validated. `None` appends at `max + 1`; a
/// value inside the current range shifts every sibling at or after it up by
/// one; a value past the end appends.
///
/// # Errors
/// `InvalidPosition` when the parent is at the ceiling, `SiblingConflict`
/// from the store on a uniqueness violation
pub fn insert_record(
    set: &mut dyn SiblingSet,
    position: Option<u32>,
    max_order: u32,
) -> Result<InsertOutcome> {
    let parent_id = set.parent_id().to_string();
    set.acquire(&parent_id)?;

    let plan = plan_insert(position, set.max_position()?, max_order)?;
    let shifted = match plan {
        InsertPlan::Append { .. } => 0,
        InsertPlan::Insert { shift, .. } => set.shift(shift)?,
    };

    let record = OrderedRecord::new(Uuid::now_v7().to_string(), parent_id, plan.position());
    set.insert(&record)?;

    tracing::debug!(
        parent_id = %record.parent_id,
        record_id = %record.id,
        position = record.position,
        shifted,
        "record placed"
    );

    Ok(InsertOutcome { record, shifted })
}

/// Move a record of the locked parent to `new_position`
///
/// The record's current position is read here, under the lock. Targets past
/// the last occupied position are clamped to it. Moving to the current
/// position writes nothing.
///
/// # Errors
/// `RecordNotFound` if the record is gone, `SiblingConflict` from the store
pub fn move_record(
    set: &mut dyn SiblingSet,
    record_id: &str,
    new_position: u32,
) -> Result<MoveOutcome> {
    let parent_id = set.parent_id().to_string();
    set.acquire(&parent_id)?;

    let record = set
        .get(record_id)?
        .ok_or_else(|| OrdoError::RecordNotFound {
            record_id: record_id.to_string(),
        })?;

    let old = record.position;
    let current_max = set.max_position()?.unwrap_or(old);
    let target = clamp_move_target(new_position, current_max);

    let Some(shift) = plan_move(old, target) else {
        return Ok(MoveOutcome { record, shifted: 0 });
    };

    // Park the record so the shift can reuse its old slot
    set.set_position(record_id, None)?;
    let shifted = set.shift(shift)?;
    set.set_position(record_id, Some(target))?;

    tracing::debug!(
        parent_id = %parent_id,
        record_id,
        from = old,
        to = target,
        shifted,
        "record moved"
    );

    Ok(MoveOutcome {
        record: OrderedRecord::new(record.id, parent_id, target),
        shifted,
    })
}

/// Renumber the locked parent's siblings to `1..=N` in `(position, id)` order
///
/// Returns the number of rows rewritten; rows already in place are not touched.
///
/// # Errors
/// `SiblingConflict` from the store
pub fn reindex_siblings(set: &mut dyn SiblingSet) -> Result<usize> {
    let parent_id = set.parent_id().to_string();
    set.acquire(&parent_id)?;

    let rewrites = plan_reindex(&set.siblings()?);
    for (record_id, position) in &rewrites {
        set.set_position(record_id, Some(*position))?;
    }

    tracing::debug!(parent_id = %parent_id, rewritten = rewrites.len(), "siblings reindexed");
    Ok(rewrites.len())
}

/// Remove a record's row, optionally compacting the rest in the same transaction
///
/// # Errors
/// `RecordNotFound` if the record is gone
pub fn release_record(set: &mut dyn SiblingSet, record_id: &str, compact: bool) -> Result<usize> {
    let parent_id = set.parent_id().to_string();
    set.acquire(&parent_id)?;

    if !set.remove(record_id)? {
        return Err(OrdoError::RecordNotFound {
            record_id: record_id.to_string(),
        });
    }

    if compact {
        reindex_siblings(set)
    } else {
        Ok(0)
    }
}
