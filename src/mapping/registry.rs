//! Mapping registry facade.
//!
//! # Responsibilities
//! - Normalize and validate inputs before touching the store
//! - Keep at most one record per normalized pattern (remove, then insert)
//! - Resolve lookups through the specificity matcher
//! - Notify observers after every successful mutation
//!
//! # Design Decisions
//! - Mutations are serialized per registry instance; reads are not
//! - Store failures propagate unchanged; nothing is retried or rolled back
//! - If the insert half of an upsert fails, the previous record is already
//!   gone; the caller sees the insert error
//! - Every returned `Mapping` is an owned copy

use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::mapping::matcher::best_match;
use crate::mapping::normalize::{normalize_destination, normalize_pattern, strip_protocol};
use crate::mapping::notify::{ChangeNotifier, MappingsChanged};
use crate::mapping::types::{Mapping, RegistryError, RegistryResult};
use crate::observability::metrics;
use crate::storage::{MappingStore, StoreError, StoreQuery};

/// Registry of URL rewrite rules on top of a pluggable store.
#[derive(Debug)]
pub struct MappingRegistry {
    store: Arc<dyn MappingStore>,
    notifier: ChangeNotifier,
    /// Held for the whole remove → insert → notify sequence.
    mutation_lock: Mutex<()>,
}

impl MappingRegistry {
    pub fn new(store: Arc<dyn MappingStore>) -> Self {
        Self {
            store,
            notifier: ChangeNotifier::new(),
            mutation_lock: Mutex::new(()),
        }
    }

    /// Create a registry with a single change observer already registered.
    pub fn with_observer<F>(store: Arc<dyn MappingStore>, observer: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let registry = Self::new(store);
        registry.on_change(observer);
        registry
    }

    /// Register a callback fired after each successful `upsert` or `remove`.
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.register(observer);
    }

    /// Subscribe to change notifications as a channel.
    pub fn subscribe(&self) -> broadcast::Receiver<MappingsChanged> {
        self.notifier.subscribe()
    }

    /// Insert or replace the mapping for `pattern`.
    ///
    /// Returns the record as stored.
    pub async fn upsert(
        &self,
        pattern: &str,
        destination: &str,
        is_local: bool,
        is_active: bool,
    ) -> RegistryResult<Mapping> {
        let pattern = normalize_pattern(pattern);
        if pattern.is_empty() {
            return Err(RegistryError::EmptyPattern);
        }
        if destination.is_empty() {
            return Err(RegistryError::EmptyDestination(pattern));
        }
        let mapping = Mapping {
            destination: normalize_destination(destination, is_local),
            pattern,
            is_local,
            is_active,
        };

        let _guard = self.mutation_lock.lock().await;

        let removed = self
            .store
            .remove(&StoreQuery::pattern(mapping.pattern.as_str()))
            .await
            .map_err(|e| store_failure("remove", e))?;

        self.store
            .insert(mapping.clone())
            .await
            .map_err(|e| store_failure("insert", e))?;

        tracing::info!(
            pattern = %mapping.pattern,
            destination = %mapping.destination,
            is_local = mapping.is_local,
            is_active = mapping.is_active,
            replaced = removed > 0,
            "Mapping stored"
        );
        metrics::record_upsert();
        self.notifier.notify();

        Ok(mapping)
    }

    /// Delete the mapping stored under exactly `pattern`.
    ///
    /// Returns true if a record was deleted. Removing an unknown pattern is
    /// not an error and still notifies observers.
    pub async fn remove(&self, pattern: &str) -> RegistryResult<bool> {
        let pattern = normalize_pattern(pattern);
        if pattern.is_empty() {
            return Err(RegistryError::EmptyPattern);
        }

        let _guard = self.mutation_lock.lock().await;

        let removed = self
            .store
            .remove(&StoreQuery::Pattern(pattern.clone()))
            .await
            .map_err(|e| store_failure("remove", e))?;

        tracing::info!(pattern = %pattern, removed, "Mapping removed");
        metrics::record_removal();
        self.notifier.notify();

        Ok(removed > 0)
    }

    /// Most specific mapping for `url`, regardless of whether it is active.
    pub async fn lookup(&self, url: &str) -> RegistryResult<Option<Mapping>> {
        let query = strip_protocol(url);
        let mappings = self.all().await?;
        let found = best_match(&mappings, query).cloned();

        tracing::debug!(
            url = %query,
            matched = found.as_ref().map(|m| m.pattern.as_str()),
            "Mapping lookup"
        );
        metrics::record_lookup(found.is_some());

        Ok(found)
    }

    /// True if any mapping matches `url`.
    pub async fn is_mapped(&self, url: &str) -> RegistryResult<bool> {
        Ok(self.lookup(url).await?.is_some())
    }

    /// True if the best mapping for `url` exists and is active.
    pub async fn is_actively_mapped(&self, url: &str) -> RegistryResult<bool> {
        Ok(self.lookup(url).await?.is_some_and(|m| m.is_active))
    }

    /// Number of distinct stored patterns.
    pub async fn count(&self) -> RegistryResult<usize> {
        let count = self
            .store
            .count()
            .await
            .map_err(|e| store_failure("count", e))?;
        metrics::record_mapping_count(count);
        Ok(count)
    }

    /// Snapshot of every mapping in store insertion order.
    pub async fn list_mappings(&self) -> RegistryResult<Vec<Mapping>> {
        self.all().await
    }

    async fn all(&self) -> RegistryResult<Vec<Mapping>> {
        // Stores hand back owned records, so nothing here aliases store state.
        self.store
            .find(&StoreQuery::All)
            .await
            .map_err(|e| store_failure("find", e))
    }
}

fn store_failure(op: &'static str, err: StoreError) -> RegistryError {
    tracing::warn!(op, error = %err, "Mapping store call failed");
    metrics::record_store_error(op);
    RegistryError::Store(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> MappingRegistry {
        MappingRegistry::new(Arc::new(MemoryStore::new()))
    }

    async fn destination(registry: &MappingRegistry, url: &str) -> Option<String> {
        registry.lookup(url).await.unwrap().map(|m| m.destination)
    }

    #[tokio::test]
    async fn test_plain_match() {
        let registry = registry();
        registry.upsert("foo.com/bar/baz", "foo/specific", true, true).await.unwrap();
        assert_eq!(destination(&registry, "foo.com/bar/baz").await.as_deref(), Some("foo/specific"));
        assert_eq!(destination(&registry, "dunx").await, None);
    }

    #[tokio::test]
    async fn test_wildcard_resolution() {
        let registry = registry();
        registry.upsert("foo.com/*/baz", "foo/oneWildcard", true, true).await.unwrap();
        registry.upsert("foo.com/*/*", "foo/multiwildcard", true, true).await.unwrap();

        assert_eq!(destination(&registry, "foo.com/derp/baz").await.as_deref(), Some("foo/oneWildcard"));
        assert_eq!(destination(&registry, "foo.com/derp/any").await.as_deref(), Some("foo/multiwildcard"));
    }

    #[tokio::test]
    async fn test_protocol_stripped_on_store_and_lookup() {
        let registry = registry();
        let stored = registry.upsert("http://foo.com/bar", "newUrl", true, true).await.unwrap();
        assert_eq!(stored, Mapping::new("foo.com/bar", "newUrl", true, true));

        for url in ["foo.com/bar", "http://foo.com/bar", "https://foo.com/bar"] {
            assert_eq!(registry.lookup(url).await.unwrap(), Some(stored.clone()));
        }
    }

    #[tokio::test]
    async fn test_remote_destination_gets_slash() {
        let registry = registry();
        let stored = registry.upsert("foo.com/bar/baz", "foo.com", false, true).await.unwrap();
        assert_eq!(stored.destination, "foo.com/");
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let registry = registry();
        registry.upsert("foo.com/a", "one", true, true).await.unwrap();
        registry.upsert("https://foo.com/a", "two.com", false, false).await.unwrap();

        assert_eq!(registry.count().await.unwrap(), 1);
        assert_eq!(
            registry.list_mappings().await.unwrap(),
            vec![Mapping::new("foo.com/a", "two.com/", false, false)]
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = registry();
        registry.upsert("foo.com/bar/baz", "foo/bar", true, true).await.unwrap();

        assert!(registry.remove("foo.com/bar/baz").await.unwrap());
        assert!(!registry.is_mapped("foo.com/bar/baz").await.unwrap());
        assert_eq!(registry.count().await.unwrap(), 0);

        // Unknown pattern is a no-op
        assert!(!registry.remove("foo.com/bar/baz").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_is_exact() {
        let registry = registry();
        registry.upsert("foo.com/*", "wild", true, true).await.unwrap();

        assert!(!registry.remove("foo.com/bar").await.unwrap());
        assert_eq!(registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_active_flag() {
        let registry = registry();
        registry.upsert("foo.com/on", "x", true, true).await.unwrap();
        registry.upsert("foo.com/off", "x", true, false).await.unwrap();

        assert!(registry.is_actively_mapped("foo.com/on").await.unwrap());
        assert!(registry.is_mapped("foo.com/off").await.unwrap());
        assert!(!registry.is_actively_mapped("foo.com/off").await.unwrap());
        assert!(!registry.is_actively_mapped("not.mapped.com/").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_store() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let registry = MappingRegistry::with_observer(Arc::new(MemoryStore::new()), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(
            registry.upsert("https://", "x", true, true).await,
            Err(RegistryError::EmptyPattern)
        ));
        assert!(matches!(
            registry.upsert("foo.com", "", true, true).await,
            Err(RegistryError::EmptyDestination(_))
        ));
        assert!(matches!(registry.remove("").await, Err(RegistryError::EmptyPattern)));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_notifies_once_per_mutation() {
        let registry = registry();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        registry.on_change(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let mut rx = registry.subscribe();

        registry.upsert("a.com", "x", true, true).await.unwrap();
        registry.upsert("a.com", "y", true, true).await.unwrap();
        registry.remove("a.com").await.unwrap();
        registry.remove("a.com").await.unwrap();
        registry.lookup("a.com").await.unwrap();
        registry.count().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        for _ in 0..4 {
            assert_eq!(rx.recv().await.unwrap(), MappingsChanged);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_one_record() {
        let registry = Arc::new(registry());
        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.upsert("race.com/x", &format!("dest/{i}"), true, true).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(registry.count().await.unwrap(), 1);
    }
}
