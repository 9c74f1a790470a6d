//! URL mapping registry and specificity matcher.

pub mod config;
pub mod mapping;
pub mod observability;
pub mod storage;
pub mod sync;

pub use config::schema::MapperConfig;
pub use mapping::{Mapping, MappingRegistry, RegistryError};
pub use storage::{JsonFileStore, MappingStore, MemoryStore, StoreError, StoreQuery};
