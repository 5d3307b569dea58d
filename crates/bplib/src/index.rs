use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::record::{Identifier, Record};
use crate::search::RecordResolver;

/// Concurrent identifier → record map.
///
/// The first record stored for an identifier wins; later inserts for the
/// same identifier are ignored. Nothing is ever removed.
#[derive(Debug, Default)]
pub struct BlueprintIndex {
    records: DashMap<Identifier, Arc<Record>>,
}

impl BlueprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` unless `id` is already present. Returns whether it was stored.
    pub fn insert_if_absent(&self, id: Identifier, record: Arc<Record>) -> bool {
        match self.records.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn get(&self, id: &Identifier) -> Option<Arc<Record>> {
        self.records.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.records.contains_key(id)
    }

    /// Snapshot of every stored record, in no particular order.
    ///
    /// Inserts racing with the snapshot may or may not be included.
    pub fn values(&self) -> Vec<Arc<Record>> {
        self.records
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordResolver for BlueprintIndex {
    fn resolve(&self, id: &Identifier) -> Option<Arc<Record>> {
        self.get(id)
    }
}
