use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{Collection, ScheduleStore, StoreResult};

/// Process-local store, used by tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    documents: RwLock<BTreeMap<(Collection, String), String>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl ScheduleStore for MemoryScheduleStore {
    fn get_document(&self, collection: Collection, key: &str) -> StoreResult<Option<String>> {
        let documents = self.documents.read();
        Ok(documents.get(&(collection, key.to_string())).cloned())
    }

    fn put_document(&self, collection: Collection, key: &str, json: String) -> StoreResult<()> {
        self.documents
            .write()
            .insert((collection, key.to_string()), json);
        Ok(())
    }

    fn remove_document(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        let removed = self
            .documents
            .write()
            .remove(&(collection, key.to_string()))
            .is_some();
        Ok(removed)
    }

    fn document_keys(&self, collection: Collection) -> StoreResult<Vec<String>> {
        let documents = self.documents.read();
        Ok(documents
            .keys()
            .filter(|(owner, _)| *owner == collection)
            .map(|(_, key)| key.clone())
            .collect())
    }
}
