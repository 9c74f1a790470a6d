//! Shared store doubles for registry integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url_mapper::storage::StoreResult;
use url_mapper::{Mapping, MappingRegistry, MappingStore, MemoryStore, StoreError, StoreQuery};

/// A store call, as observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find(StoreQuery),
    Insert(Mapping),
    Remove(StoreQuery),
    Count,
}

/// Wraps a [`MemoryStore`], recording every call and optionally failing some.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<Call>>,
    fail_remove: AtomicBool,
    fail_insert: AtomicBool,
    fail_find: AtomicBool,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn inserts(&self) -> Vec<Mapping> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Insert(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn fail_remove(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }

    pub fn fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_find(&self, fail: bool) {
        self.fail_find.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn injected(op: &str) -> StoreError {
    StoreError::Unavailable(format!("injected {op} failure"))
}

#[async_trait]
impl MappingStore for RecordingStore {
    async fn find(&self, query: &StoreQuery) -> StoreResult<Vec<Mapping>> {
        self.record(Call::Find(query.clone()));
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(injected("find"));
        }
        self.inner.find(query).await
    }

    async fn insert(&self, mapping: Mapping) -> StoreResult<()> {
        self.record(Call::Insert(mapping.clone()));
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(injected("insert"));
        }
        self.inner.insert(mapping).await
    }

    async fn remove(&self, query: &StoreQuery) -> StoreResult<usize> {
        self.record(Call::Remove(query.clone()));
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(injected("remove"));
        }
        self.inner.remove(query).await
    }

    async fn count(&self) -> StoreResult<usize> {
        self.record(Call::Count);
        self.inner.count().await
    }
}

/// Registry over a recording store, with a counter of change notifications.
pub fn recorded_registry() -> (MappingRegistry, Arc<RecordingStore>, Arc<AtomicUsize>) {
    let store = RecordingStore::new();
    let notifications = Arc::new(AtomicUsize::new(0));
    let n = notifications.clone();
    let registry = MappingRegistry::with_observer(store.clone(), move || {
        n.fetch_add(1, Ordering::SeqCst);
    });
    (registry, store, notifications)
}
