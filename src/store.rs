//! Configuration Store
//!
//! `ConfigStore` wraps the underlying key-value store together with the
//! layered inputs it was built from: defaults, file sources, seed values
//! (for nested handles), and explicit overrides. Every mutation rebuilds the
//! snapshot through the underlying builder; reads go against the current
//! snapshot. Precedence, lowest to highest: defaults, files in load order,
//! seeds, overrides. Merge rules within the file layer belong entirely to
//! the underlying store.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use config::{Config, File, FileFormat, Map, Source, Value, ValueKind};
use notify::RecommendedWatcher;
use tracing::{error, info};

use crate::error::{ConfigError, Result};
use crate::format::FileKind;
use crate::watcher::ConfigChangeEvent;

pub(crate) type ChangeCallback = dyn Fn(&ConfigChangeEvent) + Send + Sync;

/// A configuration file registered with the store
#[derive(Debug, Clone)]
pub(crate) struct FileSpec {
    pub(crate) path: PathBuf,
    pub(crate) format: FileFormat,
}

#[derive(Default)]
pub(crate) struct StoreInner {
    pub(crate) defaults: Vec<(String, Value)>,
    pub(crate) files: Vec<FileSpec>,
    pub(crate) seeds: Vec<(String, Value)>,
    pub(crate) overrides: Vec<(String, Value)>,
    pub(crate) snapshot: Config,
    pub(crate) callbacks: Vec<Arc<ChangeCallback>>,
}

impl StoreInner {
    /// Rebuild the snapshot from the layered inputs. On failure the previous
    /// snapshot stays in place.
    pub(crate) fn rebuild(&mut self) -> std::result::Result<(), config::ConfigError> {
        let mut builder = Config::builder();
        for (key, value) in &self.defaults {
            builder = builder.set_default(key.as_str(), value.clone())?;
        }
        for file in &self.files {
            builder = builder.add_source(File::from(file.path.clone()).format(file.format));
        }
        for (key, value) in self.seeds.iter().chain(self.overrides.iter()) {
            builder = builder.set_override(key.as_str(), value.clone())?;
        }
        self.snapshot = builder.build()?;
        Ok(())
    }
}

/// Handle to one configuration store
///
/// Clones are cheap and share the same underlying store. The process-wide
/// store exposed through [`crate::global`] is one ordinary `ConfigStore`;
/// nested handles returned by [`ConfigStore::get_nested`] are independent
/// stores seeded from a subtree.
#[derive(Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<StoreInner>>,
    watcher: Arc<Mutex<Option<RecommendedWatcher>>>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read_inner(&self) -> RwLockReadGuard<'_, StoreInner> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn write_inner(&self) -> RwLockWriteGuard<'_, StoreInner> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn inner_arc(&self) -> &Arc<RwLock<StoreInner>> {
        &self.inner
    }

    pub(crate) fn watcher_slot(&self) -> MutexGuard<'_, Option<RecommendedWatcher>> {
        match self.watcher.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Load a configuration file into the store, panicking on failure.
    ///
    /// Looks for `<dir>/<name>.<kind>`; `kind` must be one of the supported
    /// type tags (see [`FileKind`]). Call repeatedly to layer multiple files;
    /// later files win for overlapping keys. Intended for process startup
    /// where an unreadable configuration should terminate immediately; use
    /// [`ConfigStore::try_load_file`] for a recoverable error instead.
    pub fn load_file(&self, name: &str, kind: &str, dir: impl AsRef<Path>) {
        if let Err(err) = self.try_load_file(name, kind, dir) {
            panic!("fatal configuration error: {err}");
        }
    }

    /// Load a configuration file into the store.
    ///
    /// Same contract as [`ConfigStore::load_file`] but returns the failure.
    /// A failed load leaves the store exactly as it was.
    pub fn try_load_file(&self, name: &str, kind: &str, dir: impl AsRef<Path>) -> Result<()> {
        let kind = FileKind::from_str(kind)?;
        let path = dir.as_ref().join(format!("{name}.{}", kind.tag()));
        let mut inner = self.write_inner();
        inner.files.push(FileSpec {
            path: path.clone(),
            format: kind.format(),
        });
        if let Err(source) = inner.rebuild() {
            inner.files.pop();
            return Err(ConfigError::Load { path, source });
        }
        info!("Loaded configuration file: {}", path.display());
        Ok(())
    }

    /// Set a default value, used only when no file or override supplies the key
    pub fn set_default(&self, key: &str, value: impl Into<Value>) {
        let mut inner = self.write_inner();
        let previous = upsert(&mut inner.defaults, key, value.into());
        if let Err(err) = inner.rebuild() {
            rollback(&mut inner.defaults, previous);
            error!("Failed to apply default for key {}: {}", key, err);
        }
    }

    /// Set a value, unconditionally overriding every other layer
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let mut inner = self.write_inner();
        let previous = upsert(&mut inner.overrides, key, value.into());
        if let Err(err) = inner.rebuild() {
            rollback(&mut inner.overrides, previous);
            error!("Failed to set key {}: {}", key, err);
        }
    }

    /// Discard all store contents, reverting to an empty store.
    ///
    /// Drops loaded files, defaults, overrides, the file watcher, and change
    /// callbacks. Intended for test isolation between global-store tests.
    pub fn flush(&self) {
        *self.watcher_slot() = None;
        let mut inner = self.write_inner();
        *inner = StoreInner::default();
    }

    /// Return a new store rooted at the subtree under `key`, or `None` if the
    /// key is absent or not a table.
    ///
    /// The returned handle is a snapshot copy of the subtree, not a live
    /// view: later changes to this store do not propagate into it. Keys on
    /// the nested handle resolve relative to the subtree root.
    ///
    /// The copy is seeded by flattening the subtree to dot-delimited leaf
    /// paths, so a literal key containing a dot (YAML `"a.b": 1`) is
    /// re-parsed as nested tables in the copy. Dots in keys are reserved as
    /// the hierarchy separator throughout the store; keys containing literal
    /// dots are unsupported.
    pub fn get_nested(&self, key: &str) -> Option<ConfigStore> {
        let value = self.lookup(key)?;
        let table = match value.kind {
            ValueKind::Table(table) => table,
            _ => return None,
        };
        let nested = ConfigStore::new();
        {
            let mut inner = nested.write_inner();
            flatten_table(None, &table, &mut inner.seeds);
            if let Err(err) = inner.rebuild() {
                error!("Failed to build nested configuration for key {}: {}", key, err);
                return None;
            }
        }
        Some(nested)
    }

    /// Resolve a dot-delimited key against the current snapshot
    pub(crate) fn lookup(&self, key: &str) -> Option<Value> {
        let root = self.read_inner().snapshot.collect().ok()?;
        lookup_in(&root, key)
    }

    /// The root table of the current snapshot
    pub(crate) fn root_table(&self) -> Map<String, Value> {
        self.read_inner().snapshot.collect().unwrap_or_default()
    }
}

/// Replace the entry for `key` in place, or append it. Returns what a
/// failed rebuild needs to undo: the displaced value, if any.
fn upsert(entries: &mut Vec<(String, Value)>, key: &str, value: Value) -> Option<(usize, Value)> {
    match entries.iter().position(|(existing, _)| existing == key) {
        Some(pos) => Some((pos, std::mem::replace(&mut entries[pos].1, value))),
        None => {
            entries.push((key.to_string(), value));
            None
        }
    }
}

fn rollback(entries: &mut Vec<(String, Value)>, previous: Option<(usize, Value)>) {
    match previous {
        Some((pos, value)) => entries[pos].1 = value,
        None => {
            entries.pop();
        }
    }
}

/// Walk a dot-delimited key through nested tables. Exact match first, then
/// the underlying store's lowercase convention.
fn lookup_in(root: &Map<String, Value>, key: &str) -> Option<Value> {
    walk(root, key).or_else(|| walk(root, &key.to_lowercase()))
}

fn walk(root: &Map<String, Value>, key: &str) -> Option<Value> {
    let mut segments = key.split('.');
    let mut value = root.get(segments.next()?)?.clone();
    for segment in segments {
        value = match value.kind {
            ValueKind::Table(mut table) => table.remove(segment)?,
            _ => return None,
        };
    }
    Some(value)
}

/// Flatten nested tables into dot-delimited leaf paths
pub(crate) fn flatten_table(
    prefix: Option<&str>,
    table: &Map<String, Value>,
    out: &mut Vec<(String, Value)>,
) {
    for (key, value) in table {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match &value.kind {
            ValueKind::Table(child) if !child.is_empty() => flatten_table(Some(&path), child, out),
            _ => out.push((path, value.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, file: &str, contents: &str) {
        fs::write(dir.path().join(file), contents).unwrap();
    }

    #[test]
    fn test_unsupported_tag_is_rejected() {
        let store = ConfigStore::new();
        let err = store.try_load_file("app", "jsonn", "conf/").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let store = ConfigStore::new();
        let err = store.try_load_file("app", "yml", "no/such/dir").unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }

    #[test]
    fn test_failed_load_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir, "app.yml", "name: confstack\n");

        let store = ConfigStore::new();
        store.try_load_file("app", "yml", dir.path()).unwrap();
        assert!(store.try_load_file("missing", "yml", dir.path()).is_err());

        // Prior contents survive and further mutation still works
        assert_eq!(store.get_string("name"), "confstack");
        store.set("name", "other");
        assert_eq!(store.get_string("name"), "other");
    }

    #[test]
    fn test_layer_precedence() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir, "app.toml", "port = 8080\n");

        let store = ConfigStore::new();
        store.set_default("port", 1234_i64);
        store.set_default("retries", 3_i64);
        store.try_load_file("app", "toml", dir.path()).unwrap();

        // File beats default; untouched default survives
        assert_eq!(store.get_int("port"), 8080);
        assert_eq!(store.get_int("retries"), 3);

        // Explicit set beats the file
        store.set("port", 9999_i64);
        assert_eq!(store.get_int("port"), 9999);
    }

    #[test]
    fn test_last_loaded_file_wins() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir, "base.yml", "host: first\nkeep: yes\n");
        write_fixture(&dir, "extra.yml", "host: second\n");

        let store = ConfigStore::new();
        store.try_load_file("base", "yml", dir.path()).unwrap();
        store.try_load_file("extra", "yml", dir.path()).unwrap();

        assert_eq!(store.get_string("host"), "second");
        assert!(store.is_set("keep"));
    }

    #[test]
    fn test_repeated_sets_replace_in_place() {
        let store = ConfigStore::new();
        for i in 0..100 {
            store.set("testbool", i % 2 == 0);
        }
        assert!(!store.get_bool("testbool"));
        assert_eq!(store.read_inner().overrides.len(), 1);

        store.set_default("retries", 3_i64);
        store.set_default("retries", 7_i64);
        assert_eq!(store.get_int("retries"), 7);
        assert_eq!(store.read_inner().defaults.len(), 1);
    }

    #[test]
    fn test_flush_resets_to_empty() {
        let store = ConfigStore::new();
        store.set("answer", 42_i64);
        assert_eq!(store.get_int("answer"), 42);

        store.flush();
        assert_eq!(store.get_int("answer"), 0);
        assert!(!store.is_set("answer"));
    }

    #[test]
    fn test_get_nested_absent_key() {
        let store = ConfigStore::new();
        store.set("scalar", "value");
        assert!(store.get_nested("missing").is_none());
        assert!(store.get_nested("scalar").is_none());
    }

    #[test]
    fn test_get_nested_resolves_relative_keys() {
        let dir = TempDir::new().unwrap();
        write_fixture(
            &dir,
            "app.yml",
            "server:\n  host: localhost\n  limits:\n    max_conns: 512\n",
        );

        let store = ConfigStore::new();
        store.try_load_file("app", "yml", dir.path()).unwrap();

        let server = store.get_nested("server").unwrap();
        assert_eq!(server.get_string("host"), "localhost");
        assert_eq!(server.get_int("limits.max_conns"), 512);

        // Nested handle is a snapshot copy, not a live view
        store.set("server.host", "elsewhere");
        assert_eq!(server.get_string("host"), "localhost");
    }
}
