//! Mapping record and registry error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StoreError;

/// A single URL rewrite rule.
///
/// Persisted with exactly four fields: `pattern`, `destination`, `isLocal`
/// and `isActive`. Nothing derived (such as the wildcard layout) is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Slash-segmented source pattern, protocol already stripped.
    pub pattern: String,

    /// Rewrite target.
    pub destination: String,

    /// `true` if `destination` is a local resource path, `false` for a remote URL.
    pub is_local: bool,

    /// Whether the mapping is currently honored.
    pub is_active: bool,
}

impl Mapping {
    pub fn new(
        pattern: impl Into<String>,
        destination: impl Into<String>,
        is_local: bool,
        is_active: bool,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            destination: destination.into(),
            is_local,
            is_active,
        }
    }
}

/// Errors surfaced by [`MappingRegistry`](crate::mapping::MappingRegistry) operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The pattern is empty once its protocol has been stripped.
    #[error("pattern must not be empty")]
    EmptyPattern,

    /// The destination is empty.
    #[error("destination for pattern {0:?} must not be empty")]
    EmptyDestination(String),

    /// The storage collaborator failed; passed through untouched.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
