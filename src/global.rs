//! Process-Wide Configuration Surface
//!
//! Free functions forwarding to one lazily-constructed [`ConfigStore`], for
//! callers that want a single shared configuration without threading a
//! handle around. The store behind these functions is an ordinary
//! `ConfigStore`, reachable through [`global`]; [`flush`] is the explicit
//! teardown contract.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use config::{Map, Value};
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::store::ConfigStore;
use crate::watcher::ConfigChangeEvent;

static STORE: Lazy<ConfigStore> = Lazy::new(ConfigStore::new);

/// The process-wide configuration store
pub fn global() -> &'static ConfigStore {
    &STORE
}

/// Load a configuration file into the process-wide store, panicking on
/// failure. See [`ConfigStore::load_file`].
pub fn load_file(name: &str, kind: &str, dir: impl AsRef<Path>) {
    STORE.load_file(name, kind, dir)
}

/// Load a configuration file into the process-wide store.
/// See [`ConfigStore::try_load_file`].
pub fn try_load_file(name: &str, kind: &str, dir: impl AsRef<Path>) -> Result<()> {
    STORE.try_load_file(name, kind, dir)
}

/// Set a default value, used only when no file or override supplies the key
pub fn set_default(key: &str, value: impl Into<Value>) {
    STORE.set_default(key, value)
}

/// Set a value, unconditionally overriding every other layer
pub fn set(key: &str, value: impl Into<Value>) {
    STORE.set(key, value)
}

/// Discard the process-wide store contents, reverting to an empty store
pub fn flush() {
    STORE.flush()
}

/// Start watching the loaded configuration files for external changes
pub fn watch_changes() -> Result<()> {
    STORE.watch_changes()
}

/// Register a callback invoked after each successful watcher reload
pub fn on_change(callback: impl Fn(&ConfigChangeEvent) + Send + Sync + 'static) {
    STORE.on_change(callback)
}

/// Whether the key is present in any layer
pub fn is_set(key: &str) -> bool {
    STORE.is_set(key)
}

/// Raw value for the key, or `None` if absent
pub fn get(key: &str) -> Option<Value> {
    STORE.get(key)
}

/// Value as a string
pub fn get_string(key: &str) -> String {
    STORE.get_string(key)
}

/// Value as a boolean
pub fn get_bool(key: &str) -> bool {
    STORE.get_bool(key)
}

/// Value as a signed integer
pub fn get_int(key: &str) -> i64 {
    STORE.get_int(key)
}

/// Value as a 32-bit signed integer
pub fn get_int32(key: &str) -> i32 {
    STORE.get_int32(key)
}

/// Value as a 64-bit signed integer
pub fn get_int64(key: &str) -> i64 {
    STORE.get_int64(key)
}

/// Value as an unsigned integer
pub fn get_uint(key: &str) -> u64 {
    STORE.get_uint(key)
}

/// Value as a 32-bit unsigned integer
pub fn get_uint32(key: &str) -> u32 {
    STORE.get_uint32(key)
}

/// Value as a 64-bit unsigned integer
pub fn get_uint64(key: &str) -> u64 {
    STORE.get_uint64(key)
}

/// Value as a float
pub fn get_float(key: &str) -> f64 {
    STORE.get_float(key)
}

/// Value as a UTC timestamp
pub fn get_datetime(key: &str) -> DateTime<Utc> {
    STORE.get_datetime(key)
}

/// Value as a duration
pub fn get_duration(key: &str) -> Duration {
    STORE.get_duration(key)
}

/// Value as a list of signed integers
pub fn get_int_slice(key: &str) -> Vec<i64> {
    STORE.get_int_slice(key)
}

/// Value as a list of strings
pub fn get_string_slice(key: &str) -> Vec<String> {
    STORE.get_string_slice(key)
}

/// Value as a table of raw values
pub fn get_table(key: &str) -> Map<String, Value> {
    STORE.get_table(key)
}

/// Value as a table of strings
pub fn get_string_table(key: &str) -> HashMap<String, String> {
    STORE.get_string_table(key)
}

/// Value as a table of string lists
pub fn get_string_slice_table(key: &str) -> HashMap<String, Vec<String>> {
    STORE.get_string_slice_table(key)
}

/// Value as a byte size
pub fn get_size_in_bytes(key: &str) -> u64 {
    STORE.get_size_in_bytes(key)
}

/// All keys in the store, flattened to dot-delimited paths, sorted
pub fn keys() -> Vec<String> {
    STORE.keys()
}

/// A new store rooted at the subtree under `key`, or `None` if the key is
/// absent or not a table
pub fn get_nested(key: &str) -> Option<ConfigStore> {
    STORE.get_nested(key)
}
