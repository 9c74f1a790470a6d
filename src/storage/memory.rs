//! In-memory mapping store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::mapping::Mapping;
use crate::storage::{MappingStore, StoreQuery, StoreResult};

/// A store backed by a vector kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Mapping>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`, kept in the given order.
    pub fn with_records(records: Vec<Mapping>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn find(&self, query: &StoreQuery) -> StoreResult<Vec<Mapping>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|m| query.accepts(m)).cloned().collect())
    }

    async fn insert(&self, mapping: Mapping) -> StoreResult<()> {
        self.records.write().await.push(mapping);
        Ok(())
    }

    async fn remove(&self, query: &StoreQuery) -> StoreResult<usize> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|m| !query.accepts(m));
        Ok(before - records.len())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.records.read().await.len())
    }
}
