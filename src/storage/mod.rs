//! Storage collaborator contract.
//!
//! # Data Flow
//! ```text
//! MappingRegistry
//!     → find(All)            full set, for matching and listing
//!     → find(Pattern(p))     exact textual lookup
//!     → remove(Pattern(p))   then insert(record), for upsert
//!     → count()
//! ```
//!
//! # Design Decisions
//! - Stores never enforce pattern uniqueness; the registry does
//! - `find(All)` returns records in insertion order
//! - Each call completes (or fails) before the returned future resolves
//! - Stores serialize their own operations

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};
use crate::mapping::Mapping;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Shape of a find/remove request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreQuery {
    /// Every stored record.
    All,
    /// Records whose pattern is textually equal to the given one.
    Pattern(String),
}

impl StoreQuery {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        StoreQuery::Pattern(pattern.into())
    }

    /// Returns true if `mapping` satisfies this query.
    pub fn accepts(&self, mapping: &Mapping) -> bool {
        match self {
            StoreQuery::All => true,
            StoreQuery::Pattern(p) => mapping.pattern == *p,
        }
    }
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store holds more than one record for pattern {0:?}")]
    DuplicatePattern(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence backend for mapping records.
#[async_trait]
pub trait MappingStore: Send + Sync + std::fmt::Debug {
    /// Records matching `query`, in insertion order.
    async fn find(&self, query: &StoreQuery) -> StoreResult<Vec<Mapping>>;

    /// Persist one record. Does not replace existing records.
    async fn insert(&self, mapping: Mapping) -> StoreResult<()>;

    /// Delete every record matching `query`, returning how many were deleted.
    async fn remove(&self, query: &StoreQuery) -> StoreResult<usize>;

    /// Total number of stored records.
    async fn count(&self) -> StoreResult<usize>;
}

/// Open the store selected by `config`.
pub async fn open(config: &StorageConfig) -> StoreResult<Arc<dyn MappingStore>> {
    match (config.backend, config.path.as_deref()) {
        (StorageBackend::Memory, _) => Ok(Arc::new(MemoryStore::new())),
        (StorageBackend::File, Some(path)) => Ok(Arc::new(JsonFileStore::open(path).await?)),
        (StorageBackend::File, None) => Err(StoreError::Unavailable(
            "file backend selected without storage.path".to_string(),
        )),
    }
}
