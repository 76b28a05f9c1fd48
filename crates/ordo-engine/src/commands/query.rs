//! Read-only commands
//!
//! Reads go to committed state without taking the parent lock, so they never
//! wait on a writer and never observe a half-applied shift.

use std::time::Instant;

use ordo_core::errors::{OrdoError, Result};
use ordo_core::model::OrderedRecord;
use ordo_core::ops::SequenceStore;
use ordo_core::rules::check_sibling_set;
use ordo_core::{log_op_end, log_op_error, log_op_start};
use ordo_core_types::RequestId;

use crate::engine::{elapsed_ms, OrderingEngine};

impl<S: SequenceStore> OrderingEngine<S> {
    /// Siblings of `parent_id` ordered by `(position, id)`
    ///
    /// ## Errors
    ///
    /// - `ParentNotFound`: the parent does not exist
    /// - `InvariantViolation`: a committed row has no position
    pub fn list(&self, parent_id: &str) -> Result<Vec<OrderedRecord>> {
        let request_id = RequestId::new();
        log_op_start!("list", request_id = %request_id, parent_id = parent_id);
        let start = Instant::now();

        let records = self.list_impl(parent_id).map_err(|e| {
            log_op_error!(
                "list",
                self.report("list", &request_id, &e).with_parent_id(parent_id),
                duration_ms = elapsed_ms(start)
            );
            e
        })?;

        log_op_end!(
            "list",
            duration_ms = elapsed_ms(start),
            request_id = %request_id,
            count = records.len()
        );
        Ok(records)
    }

    fn list_impl(&self, parent_id: &str) -> Result<Vec<OrderedRecord>> {
        self.store()
            .snapshot(parent_id)?
            .into_iter()
            .map(|slot| slot.into_record(parent_id))
            .collect()
    }

    /// One record by id
    ///
    /// ## Errors
    ///
    /// - `RecordNotFound`: no such record
    pub fn get(&self, record_id: &str) -> Result<OrderedRecord> {
        let parent_id = self.parent_of_record(record_id)?;
        self.store()
            .snapshot(&parent_id)?
            .into_iter()
            .find(|slot| slot.id == record_id)
            .ok_or_else(|| OrdoError::RecordNotFound {
                record_id: record_id.to_string(),
            })?
            .into_record(&parent_id)
    }

    /// Verify that the parent's committed positions are unique, present, and
    /// within `1..=max_order`
    ///
    /// ## Errors
    ///
    /// - `InvariantViolation`: describing the first problem found
    /// - `ParentNotFound`: the parent does not exist
    pub fn check_invariants(&self, parent_id: &str) -> Result<()> {
        let request_id = RequestId::new();
        log_op_start!("check_invariants", request_id = %request_id, parent_id = parent_id);
        let start = Instant::now();

        let slots = self.store().snapshot(parent_id);
        slots
            .and_then(|slots| check_sibling_set(parent_id, &slots, self.config().max_order))
            .map_err(|e| {
                log_op_error!(
                    "check_invariants",
                    self.report("check_invariants", &request_id, &e).with_parent_id(parent_id),
                    duration_ms = elapsed_ms(start)
                );
                e
            })?;

        log_op_end!(
            "check_invariants",
            duration_ms = elapsed_ms(start),
            request_id = %request_id
        );
        Ok(())
    }
}
