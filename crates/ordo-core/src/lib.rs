//! Ordo Core - positional ordering kernel
//!
//! Keeps a per-parent integer `position` unique and gap-free across sibling
//! records (quote lines, quote sections, ...). This crate provides:
//! - The `OrderedRecord` model and the `Slot` row view
//! - Position validation and sibling-set invariant checks
//! - Shift planning for insert / move / reindex
//! - The `SequenceStore` / `SiblingSet` storage seam and the algorithm that
//!   runs on top of it
//! - An in-memory `SequenceStore` with per-parent locks
//! - Error, logging, and configuration facilities shared by the other crates

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;

pub use config::{EngineConfig, DEFAULT_MAX_ORDER};
pub use errors::{ExError, ExErrorKind, OrdoError, Result};
pub use model::{Entry, OrderedRecord, Slot};
pub use ops::{MemoryStore, SequenceStore, SiblingSet};
