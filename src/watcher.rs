//! Configuration File Watcher
//!
//! Live-reloads the store when a loaded configuration file changes on disk.
//! The watcher runs on notify's own thread, outside the caller's read path;
//! readers always observe the most recently reloaded snapshot, with no
//! transactional isolation between a reload and a concurrent read.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, Weak};
use std::time::SystemTime;

use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::store::{ConfigStore, StoreInner};

/// Configuration change event
#[derive(Debug, Clone)]
pub struct ConfigChangeEvent {
    pub path: PathBuf,
    pub timestamp: SystemTime,
}

impl ConfigStore {
    /// Start watching the loaded configuration files for external changes.
    ///
    /// On a modify or create event touching a loaded file, the store rebuilds
    /// from its layers; a failed rebuild keeps the current values and logs
    /// the error. Files loaded after this call are not watched until it is
    /// called again. [`ConfigStore::flush`] stops the watcher.
    pub fn watch_changes(&self) -> Result<()> {
        let files: Vec<PathBuf> = self
            .read_inner()
            .files
            .iter()
            .map(|file| file.path.clone())
            .collect();
        if files.is_empty() {
            warn!("watch_changes called before any configuration file was loaded");
            return Ok(());
        }

        let watched_names: Vec<OsString> = files
            .iter()
            .filter_map(|path| path.file_name().map(OsString::from))
            .collect();
        let inner = Arc::downgrade(self.inner_arc());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => handle_file_event(&inner, &watched_names, event),
                Err(err) => error!("File watcher error: {}", err),
            },
            NotifyConfig::default(),
        )?;

        // Watch the parent directories; watching files directly is unreliable
        let mut dirs: Vec<PathBuf> = files
            .iter()
            .filter_map(|path| path.parent().map(Path::to_path_buf))
            .collect();
        dirs.sort();
        dirs.dedup();
        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            info!("Started watching configuration directory: {}", dir.display());
        }

        *self.watcher_slot() = Some(watcher);
        Ok(())
    }

    /// Register a callback invoked after each successful watcher reload
    pub fn on_change(&self, callback: impl Fn(&ConfigChangeEvent) + Send + Sync + 'static) {
        self.write_inner().callbacks.push(Arc::new(callback));
    }
}

fn handle_file_event(inner: &Weak<RwLock<StoreInner>>, watched: &[OsString], event: Event) {
    let affected = event.paths.iter().find(|path| {
        path.file_name()
            .map(|name| watched.iter().any(|watched| watched == name))
            .unwrap_or(false)
    });
    let Some(path) = affected else {
        return;
    };

    match event.kind {
        EventKind::Modify(_) | EventKind::Create(_) => {}
        EventKind::Remove(_) => {
            warn!(
                "Watched configuration file removed, keeping current values: {}",
                path.display()
            );
            return;
        }
        kind => {
            debug!("Ignoring file event type: {:?}", kind);
            return;
        }
    }

    let Some(inner) = inner.upgrade() else {
        return;
    };

    // Small delay so the writer can finish before we re-read
    std::thread::sleep(std::time::Duration::from_millis(100));

    let callbacks = {
        let mut guard = match inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.rebuild() {
            Ok(()) => {
                info!("Configuration reloaded after change to {}", path.display());
                guard.callbacks.clone()
            }
            Err(err) => {
                error!("Failed to reload configuration, keeping current values: {}", err);
                return;
            }
        }
    };

    let change = ConfigChangeEvent {
        path: path.clone(),
        timestamp: SystemTime::now(),
    };
    for callback in &callbacks {
        callback(&change);
    }
}
