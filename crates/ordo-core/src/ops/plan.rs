//! Shift planning
//!
//! Pure functions that decide which sub-range of siblings moves by one and
//! where the target record lands. Nothing here touches storage; the results
//! are applied by [`ordering`](super::ordering) through a
//! [`SiblingSet`](super::sequence::SiblingSet).

use crate::errors::{OrdoError, Result};
use crate::model::Slot;

/// Direction of a bulk shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDelta {
    /// `position += 1`, opens a slot
    Increment,
    /// `position -= 1`, closes a slot
    Decrement,
}

impl ShiftDelta {
    pub fn as_i64(&self) -> i64 {
        match self {
            ShiftDelta::Increment => 1,
            ShiftDelta::Decrement => -1,
        }
    }
}

/// A bulk shift over the inclusive range `[from, to]` (`to == None` is unbounded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub from: u32,
    pub to: Option<u32>,
    pub delta: ShiftDelta,
}

impl Shift {
    pub fn contains(&self, position: u32) -> bool {
        position >= self.from && self.to.map_or(true, |to| position <= to)
    }

    /// Position after the shift; positions outside the range are unchanged
    pub fn apply(&self, position: u32) -> u32 {
        if !self.contains(position) {
            return position;
        }
        match self.delta {
            ShiftDelta::Increment => position + 1,
            ShiftDelta::Decrement => position - 1,
        }
    }
}

/// Where a new record goes and what must move first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPlan {
    /// Write at `max + 1`; nothing shifts
    Append { position: u32 },
    /// Shift `[position, ..)` up by one, then write at `position`
    Insert { position: u32, shift: Shift },
}

impl InsertPlan {
    pub fn position(&self) -> u32 {
        match self {
            InsertPlan::Append { position } | InsertPlan::Insert { position, .. } => *position,
        }
    }
}

/// Plan the placement of a new record
///
/// A requested position past the current end is treated as an append, so
/// inserting never opens a gap. Either way the sibling set grows by one, so
/// `current_max + 1` must stay within `max_order`.
///
/// # Errors
/// `InvalidPosition` with the would-be position when the set is at the ceiling
pub fn plan_insert(
    requested: Option<u32>,
    current_max: Option<u32>,
    max_order: u32,
) -> Result<InsertPlan> {
    let next = u64::from(current_max.unwrap_or(0)) + 1;
    if next > u64::from(max_order) {
        return Err(OrdoError::InvalidPosition {
            position: next as i64,
            max: max_order,
        });
    }
    let next = next as u32;

    Ok(match requested {
        Some(position) if position < next => InsertPlan::Insert {
            position,
            shift: Shift {
                from: position,
                to: None,
                delta: ShiftDelta::Increment,
            },
        },
        _ => InsertPlan::Append { position: next },
    })
}

/// Plan moving a record from `old` to `new`
///
/// Returns `None` for a no-op. The shifted range is half-open on the moved
/// record's own slot: exactly one slot opens at `new` and the vacated `old`
/// is absorbed.
pub fn plan_move(old: u32, new: u32) -> Option<Shift> {
    use std::cmp::Ordering;

    match new.cmp(&old) {
        Ordering::Equal => None,
        // earlier: [new, old-1] += 1
        Ordering::Less => Some(Shift {
            from: new,
            to: Some(old - 1),
            delta: ShiftDelta::Increment,
        }),
        // later: [old+1, new] -= 1
        Ordering::Greater => Some(Shift {
            from: old + 1,
            to: Some(new),
            delta: ShiftDelta::Decrement,
        }),
    }
}

/// Clamp a move target to the last occupied position so a move never opens a gap
pub fn clamp_move_target(requested: u32, current_max: u32) -> u32 {
    requested.min(current_max)
}

/// Rewrites needed to renumber `slots` to `1..=N`
///
/// `slots` must already be in sibling order (see
/// [`sort_slots`](crate::model::record::sort_slots)). Only slots whose
/// position changes are returned, in the order they can be applied safely:
/// each target position is free by the time its rewrite runs.
pub fn plan_reindex(slots: &[Slot]) -> Vec<(String, u32)> {
    slots
        .iter()
        .zip(1u32..)
        .filter(|(slot, target)| slot.position != Some(*target))
        .map(|(slot, target)| (slot.id.clone(), target))
        .collect()
}
