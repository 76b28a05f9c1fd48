//! Parent registry commands

use std::time::Instant;

use ordo_core::errors::Result;
use ordo_core::ops::SequenceStore;
use ordo_core::{log_op_end, log_op_error, log_op_start};
use ordo_core_types::RequestId;

use crate::engine::{elapsed_ms, OrderingEngine};

impl<S: SequenceStore> OrderingEngine<S> {
    /// ## Errors
    ///
    /// - `ParentAlreadyExists`: the parent is already registered
    pub fn register_parent(&self, parent_id: &str) -> Result<()> {
        let request_id = RequestId::new();
        log_op_start!("register_parent", request_id = %request_id, parent_id = parent_id);
        let start = Instant::now();

        self.store().register_parent(parent_id).map_err(|e| {
            log_op_error!(
                "register_parent",
                self.report("register_parent", &request_id, &e).with_parent_id(parent_id),
                duration_ms = elapsed_ms(start)
            );
            e
        })?;

        log_op_end!(
            "register_parent",
            duration_ms = elapsed_ms(start),
            request_id = %request_id,
            parent_id = parent_id
        );
        Ok(())
    }

    /// Remove a parent and every record under it
    ///
    /// ## Errors
    ///
    /// - `ParentNotFound`: the parent does not exist
    pub fn remove_parent(&self, parent_id: &str) -> Result<()> {
        let request_id = RequestId::new();
        log_op_start!("remove_parent", request_id = %request_id, parent_id = parent_id);
        let start = Instant::now();

        self.store().remove_parent(parent_id).map_err(|e| {
            log_op_error!(
                "remove_parent",
                self.report("remove_parent", &request_id, &e).with_parent_id(parent_id),
                duration_ms = elapsed_ms(start)
            );
            e
        })?;

        log_op_end!(
            "remove_parent",
            duration_ms = elapsed_ms(start),
            request_id = %request_id,
            parent_id = parent_id
        );
        Ok(())
    }
}
