use std::collections::BTreeMap;

use crate::errors::{OrdoError, Result};
use crate::model::Slot;

/// Positions held by more than one sibling, with the ids holding them
pub fn find_duplicate_positions(slots: &[Slot]) -> Vec<(u32, Vec<String>)> {
    let mut by_position: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for slot in slots {
        if let Some(p) = slot.position {
            by_position.entry(p).or_default().push(slot.id.clone());
        }
    }
    by_position
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .collect()
}

/// Siblings with no position at rest
pub fn find_unpositioned(slots: &[Slot]) -> Vec<String> {
    slots
        .iter()
        .filter(|s| s.position.is_none())
        .map(|s| s.id.clone())
        .collect()
}

/// Siblings whose position is zero or above the ceiling
pub fn find_out_of_range(slots: &[Slot], max_order: u32) -> Vec<(String, u32)> {
    slots
        .iter()
        .filter_map(|s| match s.position {
            Some(p) if p == 0 || p > max_order => Some((s.id.clone(), p)),
            _ => None,
        })
        .collect()
}

/// True when positions are exactly `1..=N` (the state right after a reindex)
pub fn is_dense(slots: &[Slot]) -> bool {
    let mut positions: Vec<u32> = slots.iter().filter_map(|s| s.position).collect();
    if positions.len() != slots.len() {
        return false;
    }
    positions.sort_unstable();
    positions.iter().zip(1u32..).all(|(p, expected)| *p == expected)
}

/// Check uniqueness, presence, and range of every position under one parent
///
/// # Errors
/// `InvariantViolation` describing the first problem found
pub fn check_sibling_set(parent_id: &str, slots: &[Slot], max_order: u32) -> Result<()> {
    if let Some((position, ids)) = find_duplicate_positions(slots).into_iter().next() {
        return Err(OrdoError::InvariantViolation {
            parent_id: parent_id.to_string(),
            reason: format!("position {} held by {}", position, ids.join(", ")),
        });
    }

    if let Some(id) = find_unpositioned(slots).into_iter().next() {
        return Err(OrdoError::InvariantViolation {
            parent_id: parent_id.to_string(),
            reason: format!("record {} has no position", id),
        });
    }

    if let Some((id, position)) = find_out_of_range(slots, max_order).into_iter().next() {
        return Err(OrdoError::InvariantViolation {
            parent_id: parent_id.to_string(),
            reason: format!(
                "record {} at position {} outside 1..={}",
                id, position, max_order
            ),
        });
    }

    Ok(())
}
