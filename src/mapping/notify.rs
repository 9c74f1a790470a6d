//! Change notification fan-out owned by a single registry.
//!
//! Observers receive no payload: a notification only means "the mapping set
//! changed, re-read it".

use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

type Observer = Arc<dyn Fn() + Send + Sync>;

/// Marker sent to channel subscribers after each mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingsChanged;

/// Per-instance set of observers plus a broadcast channel.
pub struct ChangeNotifier {
    observers: RwLock<Vec<Observer>>,
    tx: broadcast::Sender<MappingsChanged>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            observers: RwLock::new(Vec::new()),
            tx,
        }
    }

    /// Register a callback invoked synchronously on every notification.
    pub fn register<F>(&self, observer: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut observers = self.observers.write().unwrap_or_else(|e| e.into_inner());
        observers.push(Arc::new(observer));
    }

    /// Subscribe to the notification channel.
    ///
    /// A lagging receiver only loses duplicate "changed" markers, never state.
    pub fn subscribe(&self) -> broadcast::Receiver<MappingsChanged> {
        self.tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Fire one notification to every observer and subscriber.
    pub fn notify(&self) {
        // Clone the list so observers may register further observers.
        let observers: Vec<Observer> = self
            .observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in observers {
            observer();
        }
        // No subscribers is fine
        let _ = self.tx.send(MappingsChanged);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("observers", &self.observer_count())
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}
