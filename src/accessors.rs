//! Typed Accessors
//!
//! Every accessor takes a dot-delimited key and returns the zero value of
//! the target type when the key is absent or the stored value cannot be
//! coerced. None of them signals an error; absence and coercion failure are
//! indistinguishable from a legitimate zero value by design. Coercion rules
//! for the scalar getters are the underlying store's.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use config::{Map, Value, ValueKind};

use crate::store::{flatten_table, ConfigStore};

impl ConfigStore {
    /// Raw value for the key, or `None` if absent
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lookup(key)
    }

    /// Whether the key is present in any layer. Side-effect-free.
    pub fn is_set(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Value as a string
    pub fn get_string(&self, key: &str) -> String {
        self.read_inner().snapshot.get_string(key).unwrap_or_default()
    }

    /// Value as a boolean
    pub fn get_bool(&self, key: &str) -> bool {
        self.read_inner().snapshot.get_bool(key).unwrap_or_default()
    }

    /// Value as a signed integer
    pub fn get_int(&self, key: &str) -> i64 {
        self.read_inner().snapshot.get_int(key).unwrap_or_default()
    }

    /// Value as a 32-bit signed integer; out-of-range values degrade to 0
    pub fn get_int32(&self, key: &str) -> i32 {
        self.get_int(key).try_into().unwrap_or_default()
    }

    /// Value as a 64-bit signed integer
    pub fn get_int64(&self, key: &str) -> i64 {
        self.get_int(key)
    }

    /// Value as an unsigned integer; negative values degrade to 0
    pub fn get_uint(&self, key: &str) -> u64 {
        self.get_int(key).try_into().unwrap_or_default()
    }

    /// Value as a 32-bit unsigned integer; out-of-range values degrade to 0
    pub fn get_uint32(&self, key: &str) -> u32 {
        self.get_int(key).try_into().unwrap_or_default()
    }

    /// Value as a 64-bit unsigned integer; negative values degrade to 0
    pub fn get_uint64(&self, key: &str) -> u64 {
        self.get_int(key).try_into().unwrap_or_default()
    }

    /// Value as a float
    pub fn get_float(&self, key: &str) -> f64 {
        self.read_inner().snapshot.get_float(key).unwrap_or_default()
    }

    /// Value as a UTC timestamp; zero value is the Unix epoch.
    ///
    /// Accepts RFC 3339 strings, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, or an
    /// integer of epoch seconds.
    pub fn get_datetime(&self, key: &str) -> DateTime<Utc> {
        let Some(value) = self.lookup(key) else {
            return DateTime::<Utc>::UNIX_EPOCH;
        };
        match value.kind {
            ValueKind::String(s) => parse_datetime(&s),
            ValueKind::I64(n) => Utc.timestamp_opt(n, 0).single(),
            ValueKind::U64(n) => i64::try_from(n)
                .ok()
                .and_then(|n| Utc.timestamp_opt(n, 0).single()),
            _ => None,
        }
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Value as a duration; zero value is `Duration::ZERO`.
    ///
    /// Accepts humantime strings ("30s", "5m", "1h 30m") or an integer of
    /// seconds.
    pub fn get_duration(&self, key: &str) -> Duration {
        let Some(value) = self.lookup(key) else {
            return Duration::ZERO;
        };
        match value.kind {
            ValueKind::String(s) => humantime::parse_duration(&s).unwrap_or(Duration::ZERO),
            ValueKind::I64(n) => u64::try_from(n).map(Duration::from_secs).unwrap_or(Duration::ZERO),
            ValueKind::U64(n) => Duration::from_secs(n),
            ValueKind::Float(f) => Duration::try_from_secs_f64(f).unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        }
    }

    /// Value as a list of signed integers
    pub fn get_int_slice(&self, key: &str) -> Vec<i64> {
        self.read_inner().snapshot.get::<Vec<i64>>(key).unwrap_or_default()
    }

    /// Value as a list of strings
    pub fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.read_inner().snapshot.get::<Vec<String>>(key).unwrap_or_default()
    }

    /// Value as a table of raw values
    pub fn get_table(&self, key: &str) -> Map<String, Value> {
        self.read_inner().snapshot.get_table(key).unwrap_or_default()
    }

    /// Value as a table of strings
    pub fn get_string_table(&self, key: &str) -> HashMap<String, String> {
        self.read_inner()
            .snapshot
            .get::<HashMap<String, String>>(key)
            .unwrap_or_default()
    }

    /// Value as a table of string lists
    pub fn get_string_slice_table(&self, key: &str) -> HashMap<String, Vec<String>> {
        self.read_inner()
            .snapshot
            .get::<HashMap<String, Vec<String>>>(key)
            .unwrap_or_default()
    }

    /// Value as a byte size; zero value is 0.
    ///
    /// Strings may carry a kb/mb/gb suffix (case-insensitive); bare numbers
    /// are bytes. Unparseable values degrade to 0.
    pub fn get_size_in_bytes(&self, key: &str) -> u64 {
        match self.lookup(key).map(|value| value.kind) {
            Some(ValueKind::String(s)) => parse_size_in_bytes(&s),
            Some(ValueKind::I64(n)) => u64::try_from(n).unwrap_or(0),
            Some(ValueKind::U64(n)) => n,
            _ => 0,
        }
    }

    /// All keys in the store, flattened to dot-delimited paths, sorted
    pub fn keys(&self) -> Vec<String> {
        let root = self.root_table();
        let mut leaves = Vec::new();
        flatten_table(None, &root, &mut leaves);
        let mut keys: Vec<String> = leaves.into_iter().map(|(key, _)| key).collect();
        keys.sort();
        keys
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

fn parse_size_in_bytes(raw: &str) -> u64 {
    let s = raw.trim().to_lowercase();
    let (number, multiplier) = if let Some(n) = s.strip_suffix("kb") {
        (n, 1u64 << 10)
    } else if let Some(n) = s.strip_suffix("mb") {
        (n, 1u64 << 20)
    } else if let Some(n) = s.strip_suffix("gb") {
        (n, 1u64 << 30)
    } else {
        (s.as_str(), 1)
    };
    number
        .trim()
        .parse::<u64>()
        .map(|n| n.saturating_mul(multiplier))
        .unwrap_or(0)
}
