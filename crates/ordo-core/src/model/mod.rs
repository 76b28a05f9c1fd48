pub mod record;

pub use record::{sort_slots, Entry, OrderedRecord, Slot};
