//! URL mapping subsystem.
//!
//! # Data Flow
//! ```text
//! upsert(pattern, destination, is_local, is_active)
//!     → normalize.rs (strip protocol, slash bare remote hosts)
//!     → storage: remove(exact pattern) then insert(record)
//!     → notify.rs (observers + channel subscribers)
//!
//! lookup(url)
//!     → normalize.rs (strip protocol)
//!     → storage: find(all)
//!     → matcher.rs (filter by segment match, rank by specificity)
//!     → Return: owned Mapping or None
//! ```
//!
//! # Design Decisions
//! - Nothing derived is persisted; specificity is recomputed per lookup
//! - No match is `None`, not an error
//! - Each registry owns its notifier; there is no global hook

pub mod matcher;
pub mod normalize;
pub mod notify;
pub mod registry;
pub mod types;

pub use notify::MappingsChanged;
pub use registry::MappingRegistry;
pub use types::{Mapping, RegistryError, RegistryResult};
