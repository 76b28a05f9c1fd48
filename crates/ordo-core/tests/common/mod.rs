use ordo_core::errors::Result;
use ordo_core::model::{OrderedRecord, Slot};
use ordo_core::ops::ordering::insert_record;
use ordo_core::ops::{MemoryStore, SequenceStore, Shift, SiblingSet};

pub const MAX: u32 = 1_000_000;

/// A store with one registered parent
#[allow(dead_code)]
pub fn store_with_parent(parent: &str) -> MemoryStore {
    let store = MemoryStore::new();
    store.register_parent(parent).unwrap();
    store
}

/// Append `n` records and return their ids in creation order
#[allow(dead_code)]
pub fn append_n(store: &MemoryStore, parent: &str, n: usize) -> Vec<String> {
    (0..n)
        .map(|_| {
            store
                .with_parent_lock(parent, |set| insert_record(set, None, MAX))
                .unwrap()
                .record
                .id
        })
        .collect()
}

/// Committed position of each id, in the order given
#[allow(dead_code)]
pub fn positions_of(store: &MemoryStore, parent: &str, ids: &[String]) -> Vec<u32> {
    let slots = store.snapshot(parent).unwrap();
    ids.iter()
        .map(|id| {
            slots
                .iter()
                .find(|s| &s.id == id)
                .and_then(|s| s.position)
                .unwrap()
        })
        .collect()
}

/// Wraps a SiblingSet and counts every write that reaches it
#[allow(dead_code)]
pub struct CountingSet<'a> {
    pub inner: &'a mut dyn SiblingSet,
    pub writes: usize,
}

impl SiblingSet for CountingSet<'_> {
    fn parent_id(&self) -> &str {
        self.inner.parent_id()
    }

    fn acquire(&mut self, parent_id: &str) -> Result<()> {
        self.inner.acquire(parent_id)
    }

    fn get(&self, record_id: &str) -> Result<Option<OrderedRecord>> {
        self.inner.get(record_id)
    }

    fn max_position(&self) -> Result<Option<u32>> {
        self.inner.max_position()
    }

    fn siblings(&self) -> Result<Vec<Slot>> {
        self.inner.siblings()
    }

    fn shift(&mut self, shift: Shift) -> Result<usize> {
        self.writes += 1;
        self.inner.shift(shift)
    }

    fn insert(&mut self, record: &OrderedRecord) -> Result<()> {
        self.writes += 1;
        self.inner.insert(record)
    }

    fn set_position(&mut self, record_id: &str, position: Option<u32>) -> Result<()> {
        self.writes += 1;
        self.inner.set_position(record_id, position)
    }

    fn remove(&mut self, record_id: &str) -> Result<bool> {
        self.writes += 1;
        self.inner.remove(record_id)
    }
}
