pub mod memory_store;
pub mod ordering;
pub mod plan;
pub mod sequence;

pub use memory_store::MemoryStore;
pub use ordering::{InsertOutcome, MoveOutcome};
pub use plan::{InsertPlan, Shift, ShiftDelta};
pub use sequence::{SequenceStore, SiblingSet};
