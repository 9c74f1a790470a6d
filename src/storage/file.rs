//! JSON file-backed mapping store.
//!
//! The whole record set is kept in memory and the file is rewritten after
//! each successful mutation. A mutation whose write fails leaves both the
//! file and the in-memory state unchanged.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::mapping::Mapping;
use crate::storage::{MappingStore, StoreError, StoreQuery, StoreResult};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<Vec<Mapping>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        check_unique(&records)?;

        tracing::info!(path = %path.display(), records = records.len(), "Opened mapping store");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    async fn persist(&self, records: &[Mapping]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, bytes).await?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "Persisted mapping store");
        Ok(())
    }
}

/// A file edited by hand may repeat a pattern; refuse it rather than load a
/// store holding more records than distinct patterns.
fn check_unique(records: &[Mapping]) -> StoreResult<()> {
    let mut seen = HashSet::new();
    match records.iter().find(|m| !seen.insert(m.pattern.as_str())) {
        Some(dup) => Err(StoreError::DuplicatePattern(dup.pattern.clone())),
        None => Ok(()),
    }
}

#[async_trait]
impl MappingStore for JsonFileStore {
    async fn find(&self, query: &StoreQuery) -> StoreResult<Vec<Mapping>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|m| query.accepts(m)).cloned().collect())
    }

    async fn insert(&self, mapping: Mapping) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        next.push(mapping);
        self.persist(&next).await?;
        *records = next;
        Ok(())
    }

    async fn remove(&self, query: &StoreQuery) -> StoreResult<usize> {
        let mut records = self.records.write().await;
        let next: Vec<Mapping> = records.iter().filter(|m| !query.accepts(m)).cloned().collect();
        let removed = records.len() - next.len();
        if removed == 0 {
            return Ok(0);
        }
        self.persist(&next).await?;
        *records = next;
        Ok(removed)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.records.read().await.len())
    }
}
