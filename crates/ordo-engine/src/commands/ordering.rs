//! Position-mutating commands
//!
//! Each command validates its input before touching the store, then runs the
//! ordering algorithm inside `with_parent_lock`. A `SiblingConflict` re-runs
//! the whole attempt, lock included.

use std::time::Instant;

use ordo_core::errors::{OrdoError, Result};
use ordo_core::model::{Entry, OrderedRecord};
use ordo_core::ops::ordering::{insert_record, move_record, reindex_siblings, release_record};
use ordo_core::ops::{InsertOutcome, MoveOutcome, SequenceStore};
use ordo_core::rules::{validate_optional_position, validate_position};
use ordo_core::{log_op_end, log_op_error, log_op_start};
use ordo_core_types::RequestId;

use crate::engine::{elapsed_ms, OrderingEngine};

impl<S: SequenceStore> OrderingEngine<S> {
    /// Create a record under `parent_id`
    ///
    /// `None` appends at `max + 1` (or 1 under an empty parent). A position
    /// within the current range shifts every sibling at or after it up by
    /// one; a position past the end appends. `payload` is handed back
    /// untouched alongside the record.
    ///
    /// ## Errors
    ///
    /// - `InvalidPosition`: position ≤ 0, above `max_order`, or the parent is full
    /// - `ParentNotFound`: the parent does not exist
    /// - `SiblingConflict`: still conflicting after the configured retries
    pub fn create<P>(&self, parent_id: &str, position: Option<i64>, payload: P) -> Result<Entry<P>> {
        let request_id = RequestId::new();
        log_op_start!(
            "create",
            request_id = %request_id,
            trace_id = %self.trace_id(),
            parent_id = parent_id,
            position = ?position
        );
        let start = Instant::now();

        let outcome = self
            .create_impl(parent_id, position, &request_id)
            .map_err(|e| {
                log_op_error!(
                    "create",
                    self.report("create", &request_id, &e).with_parent_id(parent_id),
                    duration_ms = elapsed_ms(start),
                    request_id = %request_id
                );
                e
            })?;

        log_op_end!(
            "create",
            duration_ms = elapsed_ms(start),
            request_id = %request_id,
            parent_id = parent_id,
            record_id = %outcome.record.id,
            position = outcome.record.position,
            shifted = outcome.shifted
        );

        Ok(Entry {
            record: outcome.record,
            payload,
        })
    }

    /// Create at the end of the parent's sequence
    pub fn append<P>(&self, parent_id: &str, payload: P) -> Result<Entry<P>> {
        self.create(parent_id, None, payload)
    }

    /// Create at `position`, shifting later siblings up
    pub fn insert_at<P>(&self, parent_id: &str, position: i64, payload: P) -> Result<Entry<P>> {
        self.create(parent_id, Some(position), payload)
    }

    fn create_impl(
        &self,
        parent_id: &str,
        position: Option<i64>,
        request_id: &RequestId,
    ) -> Result<InsertOutcome> {
        let max_order = self.config().max_order;
        let position = validate_optional_position(position, max_order)?;

        self.with_retry("create", request_id, || {
            self.store()
                .with_parent_lock(parent_id, |set| insert_record(set, position, max_order))
        })
    }

    /// Move a record to `new_position` among its siblings
    ///
    /// The record's current position is read under the parent lock. Moving to
    /// the current position is a no-op with no writes; a target past the last
    /// occupied position lands on the last one.
    ///
    /// ## Errors
    ///
    /// - `InvalidPosition`: position ≤ 0 or above `max_order`
    /// - `RecordNotFound`: the record does not exist, or vanished before the lock
    /// - `SiblingConflict`: still conflicting after the configured retries
    pub fn move_to(&self, record_id: &str, new_position: i64) -> Result<OrderedRecord> {
        let request_id = RequestId::new();
        log_op_start!(
            "move",
            request_id = %request_id,
            trace_id = %self.trace_id(),
            record_id = record_id,
            position = new_position
        );
        let start = Instant::now();

        let outcome = self
            .move_impl(record_id, new_position, &request_id)
            .map_err(|e| {
                log_op_error!(
                    "move",
                    self.report("move", &request_id, &e).with_entity_id(record_id),
                    duration_ms = elapsed_ms(start),
                    request_id = %request_id
                );
                e
            })?;

        log_op_end!(
            "move",
            duration_ms = elapsed_ms(start),
            request_id = %request_id,
            parent_id = %outcome.record.parent_id,
            record_id = record_id,
            position = outcome.record.position,
            shifted = outcome.shifted
        );

        Ok(outcome.record)
    }

    fn move_impl(
        &self,
        record_id: &str,
        new_position: i64,
        request_id: &RequestId,
    ) -> Result<MoveOutcome> {
        let target = validate_position(new_position, self.config().max_order)?;

        self.with_retry("move", request_id, || {
            let parent_id = self.parent_of_record(record_id)?;
            self.store()
                .with_parent_lock(&parent_id, |set| move_record(set, record_id, target))
        })
    }

    /// Renumber the parent's siblings to `1..=N`, keeping their order
    ///
    /// Returns how many records were rewritten; an already dense parent
    /// returns 0.
    ///
    /// ## Errors
    ///
    /// - `ParentNotFound`: the parent does not exist
    pub fn reindex(&self, parent_id: &str) -> Result<usize> {
        let request_id = RequestId::new();
        log_op_start!(
            "reindex",
            request_id = %request_id,
            trace_id = %self.trace_id(),
            parent_id = parent_id
        );
        let start = Instant::now();

        let rewritten = self
            .with_retry("reindex", &request_id, || {
                self.store().with_parent_lock(parent_id, reindex_siblings)
            })
            .map_err(|e| {
                log_op_error!(
                    "reindex",
                    self.report("reindex", &request_id, &e).with_parent_id(parent_id),
                    duration_ms = elapsed_ms(start),
                    request_id = %request_id
                );
                e
            })?;

        log_op_end!(
            "reindex",
            duration_ms = elapsed_ms(start),
            request_id = %request_id,
            parent_id = parent_id,
            shifted = rewritten
        );

        Ok(rewritten)
    }

    /// Drop a record from its parent's sequence
    ///
    /// Leaves a gap unless `compact_on_release` is set, in which case the
    /// parent is reindexed in the same transaction.
    ///
    /// ## Errors
    ///
    /// - `RecordNotFound`: the record does not exist
    pub fn release(&self, record_id: &str) -> Result<()> {
        let request_id = RequestId::new();
        log_op_start!(
            "release",
            request_id = %request_id,
            trace_id = %self.trace_id(),
            record_id = record_id
        );
        let start = Instant::now();
        let compact = self.config().compact_on_release;

        let rewritten = self
            .with_retry("release", &request_id, || {
                let parent_id = self.parent_of_record(record_id)?;
                self.store()
                    .with_parent_lock(&parent_id, |set| release_record(set, record_id, compact))
            })
            .map_err(|e| {
                log_op_error!(
                    "release",
                    self.report("release", &request_id, &e).with_entity_id(record_id),
                    duration_ms = elapsed_ms(start),
                    request_id = %request_id
                );
                e
            })?;

        log_op_end!(
            "release",
            duration_ms = elapsed_ms(start),
            request_id = %request_id,
            record_id = record_id,
            compacted = compact,
            shifted = rewritten
        );

        Ok(())
    }

    pub(crate) fn parent_of_record(&self, record_id: &str) -> Result<String> {
        self.store()
            .parent_of(record_id)?
            .ok_or_else(|| OrdoError::RecordNotFound {
                record_id: record_id.to_string(),
            })
    }
}
