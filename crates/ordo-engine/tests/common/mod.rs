use std::sync::atomic::{AtomicUsize, Ordering};

use ordo_core::config::EngineConfig;
use ordo_core::errors::Result;
use ordo_core::model::Slot;
use ordo_core::ops::{MemoryStore, SequenceStore, SiblingSet};
use ordo_engine::{Family, OrderingEngine, SqliteStore};
use tempfile::TempDir;

/// Engine over an in-memory store with the given parents registered
#[allow(dead_code)]
pub fn memory_engine(parents: &[&str]) -> OrderingEngine<MemoryStore> {
    let engine = OrderingEngine::new(MemoryStore::new(), EngineConfig::default()).unwrap();
    for parent in parents {
        engine.register_parent(parent).unwrap();
    }
    engine
}

/// Engine over a SQLite file in a fresh temp dir (keep the dir alive)
#[allow(dead_code)]
pub fn sqlite_engine(parents: &[&str]) -> (TempDir, OrderingEngine<SqliteStore>) {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::default();
    let store = SqliteStore::open(dir.path().join("engine.db"), Family::QuoteLines, &config).unwrap();
    let engine = OrderingEngine::new(store, config).unwrap();
    for parent in parents {
        engine.register_parent(parent).unwrap();
    }
    (dir, engine)
}

/// Append `n` records and return their ids in creation order
#[allow(dead_code)]
pub fn append_n<S: SequenceStore>(engine: &OrderingEngine<S>, parent: &str, n: usize) -> Vec<String> {
    (0..n)
        .map(|_| engine.append(parent, ()).unwrap().record.id)
        .collect()
}

/// Ids in list order
#[allow(dead_code)]
pub fn order_of<S: SequenceStore>(engine: &OrderingEngine<S>, parent: &str) -> Vec<String> {
    engine
        .list(parent)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect()
}

/// Counts every call that reaches the wrapped store
#[allow(dead_code)]
#[derive(Default)]
pub struct ProbeStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl ProbeStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl SequenceStore for ProbeStore {
    fn with_parent_lock<T, F>(&self, parent_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SiblingSet) -> Result<T>,
    {
        self.hit();
        self.inner.with_parent_lock(parent_id, f)
    }

    fn parent_of(&self, record_id: &str) -> Result<Option<String>> {
        self.hit();
        self.inner.parent_of(record_id)
    }

    fn snapshot(&self, parent_id: &str) -> Result<Vec<Slot>> {
        self.hit();
        self.inner.snapshot(parent_id)
    }

    fn register_parent(&self, parent_id: &str) -> Result<()> {
        self.hit();
        self.inner.register_parent(parent_id)
    }

    fn remove_parent(&self, parent_id: &str) -> Result<()> {
        self.hit();
        self.inner.remove_parent(parent_id)
    }
}
