//! In-memory Sequence Store
//!
//! Each parent owns its own mutex; the registry mutex is held only long
//! enough to look a parent up, so operations on different parents never wait
//! on each other. A transaction works on a copy of the parent's table and
//! swaps it in on commit, which gives all-or-nothing writes for free.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::errors::{OrdoError, Result};
use crate::model::{sort_slots, OrderedRecord, Slot};

use super::plan::Shift;
use super::sequence::{SequenceStore, SiblingSet};

#[derive(Debug, Clone, Default)]
struct SiblingTable {
    /// record id -> position (`None` while parked)
    positions: HashMap<String, Option<u32>>,
    /// position -> record id, mirrors the unique index
    occupied: BTreeMap<u32, String>,
    /// set once the parent is removed; waiting transactions see NotFound
    removed: bool,
}

impl SiblingTable {
    fn conflict(parent_id: &str, position: u32, holder: &str) -> OrdoError {
        OrdoError::SiblingConflict {
            parent_id: parent_id.to_string(),
            position: Some(position),
            message: format!("position {} already held by {}", position, holder),
        }
    }

    fn claim(&mut self, parent_id: &str, record_id: &str, position: u32) -> Result<()> {
        if let Some(holder) = self.occupied.get(&position) {
            if holder != record_id {
                return Err(Self::conflict(parent_id, position, holder));
            }
        }
        self.occupied.insert(position, record_id.to_string());
        Ok(())
    }

    fn slots(&self) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self
            .positions
            .iter()
            .map(|(id, p)| Slot::new(id.clone(), *p))
            .collect();
        sort_slots(&mut slots);
        slots
    }
}

#[derive(Debug)]
enum OwnerChange {
    Added(String),
    Removed(String),
}

/// Thread-safe in-memory store; one instance per sibling family
#[derive(Debug, Default)]
pub struct MemoryStore {
    parents: Mutex<HashMap<String, Arc<Mutex<SiblingTable>>>>,
    owners: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, parent_id: &str) -> Result<Arc<Mutex<SiblingTable>>> {
        let parents = self
            .parents
            .lock()
            .map_err(|_| OrdoError::poisoned("parent registry"))?;
        parents
            .get(parent_id)
            .cloned()
            .ok_or_else(|| OrdoError::ParentNotFound {
                parent_id: parent_id.to_string(),
            })
    }
}

/// A panicking transaction never writes back its working copy, so the
/// committed table behind a poisoned mutex is still consistent.
fn lock_table(table: &Mutex<SiblingTable>) -> MutexGuard<'_, SiblingTable> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct MemorySiblingSet {
    parent_id: String,
    working: SiblingTable,
    owner_changes: Vec<OwnerChange>,
}

impl SiblingSet for MemorySiblingSet {
    fn parent_id(&self) -> &str {
        &self.parent_id
    }

    fn acquire(&mut self, parent_id: &str) -> Result<()> {
        if parent_id == self.parent_id {
            return Ok(());
        }
        Err(OrdoError::LockScopeViolation {
            held: self.parent_id.clone(),
            requested: parent_id.to_string(),
        })
    }

    fn get(&self, record_id: &str) -> Result<Option<OrderedRecord>> {
        match self.working.positions.get(record_id) {
            None => Ok(None),
            Some(Some(position)) => Ok(Some(OrderedRecord::new(
                record_id,
                self.parent_id.as_str(),
                *position,
            ))),
            Some(None) => Slot::new(record_id, None)
                .into_record(&self.parent_id)
                .map(Some),
        }
    }

    fn max_position(&self) -> Result<Option<u32>> {
        Ok(self.working.occupied.keys().next_back().copied())
    }

    fn siblings(&self) -> Result<Vec<Slot>> {
        Ok(self.working.slots())
    }

    fn shift(&mut self, shift: Shift) -> Result<usize> {
        let moving: Vec<(u32, String)> = self
            .working
            .occupied
            .iter()
            .filter(|(p, _)| shift.contains(**p))
            .map(|(p, id)| (*p, id.clone()))
            .collect();

        for (position, _) in &moving {
            self.working.occupied.remove(position);
        }
        for (position, record_id) in &moving {
            let target = shift.apply(*position);
            self.working.claim(&self.parent_id, record_id, target)?;
            self.working
                .positions
                .insert(record_id.clone(), Some(target));
        }
        Ok(moving.len())
    }

    fn insert(&mut self, record: &OrderedRecord) -> Result<()> {
        if self.working.positions.contains_key(&record.id) {
            return Err(OrdoError::Internal {
                message: format!("record {} already exists", record.id),
            });
        }
        self.working
            .claim(&self.parent_id, &record.id, record.position)?;
        self.working
            .positions
            .insert(record.id.clone(), Some(record.position));
        self.owner_changes
            .push(OwnerChange::Added(record.id.clone()));
        Ok(())
    }

    fn set_position(&mut self, record_id: &str, position: Option<u32>) -> Result<()> {
        let current = *self
            .working
            .positions
            .get(record_id)
            .ok_or_else(|| OrdoError::RecordNotFound {
                record_id: record_id.to_string(),
            })?;
        if current == position {
            return Ok(());
        }
        if let Some(target) = position {
            self.working.claim(&self.parent_id, record_id, target)?;
        }
        if let Some(old) = current {
            self.working.occupied.remove(&old);
        }
        self.working
            .positions
            .insert(record_id.to_string(), position);
        Ok(())
    }

    fn remove(&mut self, record_id: &str) -> Result<bool> {
        match self.working.positions.remove(record_id) {
            None => Ok(false),
            Some(position) => {
                if let Some(p) = position {
                    self.working.occupied.remove(&p);
                }
                self.owner_changes
                    .push(OwnerChange::Removed(record_id.to_string()));
                Ok(true)
            }
        }
    }
}

impl SequenceStore for MemoryStore {
    fn with_parent_lock<T, F>(&self, parent_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SiblingSet) -> Result<T>,
    {
        let table = self.table(parent_id)?;
        let mut committed = lock_table(&table);
        if committed.removed {
            return Err(OrdoError::ParentNotFound {
                parent_id: parent_id.to_string(),
            });
        }

        let mut set = MemorySiblingSet {
            parent_id: parent_id.to_string(),
            working: committed.clone(),
            owner_changes: Vec::new(),
        };
        let value = f(&mut set)?;

        // Commit: owners first so a reader never finds a record whose parent
        // it cannot resolve
        {
            let mut owners = self
                .owners
                .write()
                .map_err(|_| OrdoError::poisoned("owner index"))?;
            for change in set.owner_changes {
                match change {
                    OwnerChange::Added(id) => {
                        owners.insert(id, parent_id.to_string());
                    }
                    OwnerChange::Removed(id) => {
                        owners.remove(&id);
                    }
                }
            }
        }
        *committed = set.working;
        Ok(value)
    }

    fn parent_of(&self, record_id: &str) -> Result<Option<String>> {
        let owners = self
            .owners
            .read()
            .map_err(|_| OrdoError::poisoned("owner index"))?;
        Ok(owners.get(record_id).cloned())
    }

    fn snapshot(&self, parent_id: &str) -> Result<Vec<Slot>> {
        let table = self.table(parent_id)?;
        let committed = lock_table(&table);
        Ok(committed.slots())
    }

    fn register_parent(&self, parent_id: &str) -> Result<()> {
        let mut parents = self
            .parents
            .lock()
            .map_err(|_| OrdoError::poisoned("parent registry"))?;
        if parents.contains_key(parent_id) {
            return Err(OrdoError::ParentAlreadyExists {
                parent_id: parent_id.to_string(),
            });
        }
        parents.insert(
            parent_id.to_string(),
            Arc::new(Mutex::new(SiblingTable::default())),
        );
        Ok(())
    }

    fn remove_parent(&self, parent_id: &str) -> Result<()> {
        let table = {
            let mut parents = self
                .parents
                .lock()
                .map_err(|_| OrdoError::poisoned("parent registry"))?;
            parents
                .remove(parent_id)
                .ok_or_else(|| OrdoError::ParentNotFound {
                    parent_id: parent_id.to_string(),
                })?
        };

        // Waits for an in-flight transaction on this parent to finish
        let mut committed = lock_table(&table);
        committed.removed = true;
        let mut owners = self
            .owners
            .write()
            .map_err(|_| OrdoError::poisoned("owner index"))?;
        for record_id in committed.positions.keys() {
            owners.remove(record_id);
        }
        committed.positions.clear();
        committed.occupied.clear();
        Ok(())
    }
}
