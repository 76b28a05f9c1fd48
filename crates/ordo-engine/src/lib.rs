//! Ordo Engine - the Ordering Engine
//!
//! `OrderingEngine` is the entry point callers use. It validates input before
//! any lock is taken, runs the ordering algorithm from `ordo-core` inside a
//! parent lock on any `SequenceStore`, retries whole operations on
//! `SiblingConflict`, and owns lifecycle logging.

pub mod commands;
pub mod engine;

pub use engine::OrderingEngine;
pub use ordo_store::{Family, SqliteStore};
