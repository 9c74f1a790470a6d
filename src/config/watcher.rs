//! Hot reload of seed mappings when the config file changes.
//!
//! # Design Decisions
//! - Only create/modify events trigger a reload
//! - A reload that fails to load or validate is logged and dropped; the last
//!   good configuration stays current
//! - A reload equal to the current configuration is not forwarded, so editor
//!   save bursts produce a single sync

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::MapperConfig;

/// Reload decision for one config file, remembering the last good config.
#[derive(Debug)]
pub struct ReloadState {
    path: PathBuf,
    current: MapperConfig,
}

impl ReloadState {
    pub fn new(path: &Path, current: MapperConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            current,
        }
    }

    /// The configuration currently considered applied.
    pub fn current(&self) -> &MapperConfig {
        &self.current
    }

    /// React to a file event. Returns the new configuration when it loaded,
    /// validated and differs from the current one.
    pub fn on_event(&mut self, kind: &EventKind) -> Option<MapperConfig> {
        if !(kind.is_modify() || kind.is_create()) {
            return None;
        }

        match load_config(&self.path) {
            Ok(next) if next == self.current => {
                tracing::debug!(path = %self.path.display(), "Config unchanged, skipping reload");
                None
            }
            Ok(next) => {
                tracing::info!(
                    path = %self.path.display(),
                    mappings = next.mappings.len(),
                    "Config reloaded"
                );
                self.current = next.clone();
                Some(next)
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected config reload, keeping current mappings");
                None
            }
        }
    }
}

/// Watches the config file and forwards accepted reloads over a channel.
pub struct ConfigWatcher {
    state: ReloadState,
    update_tx: mpsc::UnboundedSender<MapperConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiver of accepted configurations.
    pub fn new(path: &Path, current: MapperConfig) -> (Self, mpsc::UnboundedReceiver<MapperConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            state: ReloadState::new(path, current),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { mut state, update_tx } = self;
        let path = state.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Some(next) = state.on_event(&event.kind) {
                        let _ = update_tx.send(next);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind};
    use std::fs;

    const MODIFIED: EventKind = EventKind::Modify(ModifyKind::Data(DataChange::Content));

    fn write(path: &Path, pattern: &str) {
        fs::write(
            path,
            format!("[[mappings]]\npattern = \"{pattern}\"\ndestination = \"index.html\"\n"),
        )
        .unwrap();
    }

    #[test]
    fn test_valid_edit_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapper.toml");
        let mut state = ReloadState::new(&path, MapperConfig::default());

        write(&path, "a.com/*");
        let next = state.on_event(&MODIFIED).unwrap();
        assert_eq!(next.mappings[0].pattern, "a.com/*");
        assert_eq!(state.current(), &next);
    }

    #[test]
    fn test_invalid_edit_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapper.toml");
        write(&path, "a.com/*");
        let mut state = ReloadState::new(&path, MapperConfig::default());
        let good = state.on_event(&EventKind::Create(CreateKind::File)).unwrap();

        // Fails validation: empty pattern
        write(&path, "");
        assert!(state.on_event(&MODIFIED).is_none());
        // Fails parsing
        fs::write(&path, "[[mappings]\n").unwrap();
        assert!(state.on_event(&MODIFIED).is_none());

        assert_eq!(state.current(), &good);
    }

    #[test]
    fn test_unchanged_and_irrelevant_events_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapper.toml");
        write(&path, "a.com/*");
        let mut state = ReloadState::new(&path, MapperConfig::default());

        assert!(state.on_event(&EventKind::Access(AccessKind::Any)).is_none());
        assert!(state.on_event(&MODIFIED).is_some());
        // Same content again
        assert!(state.on_event(&MODIFIED).is_none());
    }

    #[test]
    fn test_deleted_file_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapper.toml");
        write(&path, "a.com/*");
        let mut state = ReloadState::new(&path, MapperConfig::default());
        let good = state.on_event(&MODIFIED).unwrap();

        fs::remove_file(&path).unwrap();
        assert!(state.on_event(&MODIFIED).is_none());
        assert_eq!(state.current(), &good);
    }
}
