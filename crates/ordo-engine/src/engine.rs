//! Engine handle and the retry policy shared by every mutating command
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//! - `tracing::warn!` before re-running an operation after a `SiblingConflict`
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

use std::time::Instant;

use ordo_core::config::EngineConfig;
use ordo_core::errors::{ExError, OrdoError, Result};
use ordo_core::ops::SequenceStore;
use ordo_core_types::schema::EVENT_RETRY;
use ordo_core_types::{RequestId, TraceId};

/// The Ordering Engine over one Sequence Store
///
/// Cheap to share by reference across threads when `S` is; every method
/// takes `&self` and serialization per parent comes from the store.
pub struct OrderingEngine<S: SequenceStore> {
    store: S,
    config: EngineConfig,
    trace_id: TraceId,
}

impl<S: SequenceStore> OrderingEngine<S> {
    /// # Errors
    /// `Config` when `config` fails validation
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            trace_id: TraceId::new(),
        })
    }

    /// Attach the caller's trace id to every event and error this engine emits
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = trace_id;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Run `attempt` until it succeeds, fails with a non-retryable error, or
    /// has been retried `conflict_retries` times
    ///
    /// Each attempt must take its own lock and re-read positions.
    pub(crate) fn with_retry<T>(
        &self,
        op: &str,
        request_id: &RequestId,
        mut attempt: impl FnMut() -> Result<T>,
    ) -> Result<T> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(err) if err.is_retryable() && retries < self.config.conflict_retries => {
                    retries += 1;
                    tracing::warn!(
                        op,
                        event = EVENT_RETRY,
                        request_id = %request_id,
                        attempt = retries,
                        error = %err,
                        "sibling conflict, re-running operation"
                    );
                }
                result => return result,
            }
        }
    }

    /// Error as reported to logs, with correlation context attached
    pub(crate) fn report(&self, op: &str, request_id: &RequestId, err: &OrdoError) -> ExError {
        ExError::from(err.clone())
            .with_op(op)
            .with_request_id(request_id.clone())
            .with_trace_id(self.trace_id.clone())
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
