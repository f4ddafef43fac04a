//! File Loading Integration Tests
//!
//! Exercises the process-wide loading surface. The global store is shared by
//! every test in this binary, so each test serializes on a lock and flushes
//! before touching it.

use std::fs;
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

static LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    // A panic test poisons the lock; the store itself stays consistent
    match LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_fixtures(dir: &TempDir) {
    fs::write(
        dir.path().join("appconfig.yml"),
        "server:\n  host: localhost\n  port: 8080\ndebug: true\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("appconfig.yaml"),
        "region: eu-west-1\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("appconfig.json"),
        "{\"pool\": {\"size\": 16}}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("appconfig.toml"),
        "workers = 4\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("appconfig.env"),
        "stage=production\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("appconfig.properties"),
        "greeting=hello\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("appconfig.ini"),
        "[cache]\nttl=60\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("appconfig.hcl"),
        "{\"datacenter\": \"dc1\"}\n",
    )
    .unwrap();
}

#[test]
fn test_loading_supported_files() {
    let _guard = lock();
    confstack::flush();

    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);

    confstack::load_file("appconfig", "yml", dir.path());
    confstack::load_file("appconfig", "yaml", dir.path());
    confstack::load_file("appconfig", "json", dir.path());
    confstack::load_file("appconfig", "toml", dir.path());
    confstack::load_file("appconfig", "env", dir.path());
    confstack::load_file("appconfig", "properties", dir.path());
    confstack::load_file("appconfig", "ini", dir.path());
    confstack::load_file("appconfig", "hcl", dir.path());

    // Every file merged into the same store
    assert_eq!(confstack::get_string("server.host"), "localhost");
    assert_eq!(confstack::get_string("region"), "eu-west-1");
    assert_eq!(confstack::get_int("pool.size"), 16);
    assert_eq!(confstack::get_int("workers"), 4);
    assert_eq!(confstack::get_string("stage"), "production");
    assert_eq!(confstack::get_string("greeting"), "hello");
    assert_eq!(confstack::get_int("cache.ttl"), 60);
    assert_eq!(confstack::get_string("datacenter"), "dc1");

    confstack::flush();
}

#[test]
#[should_panic(expected = "not supported")]
fn test_loading_unsupported_file_panics() {
    let _guard = lock();
    confstack::flush();

    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);

    confstack::load_file("appconfig", "jsonn", dir.path());
}

#[test]
#[should_panic(expected = "cannot load configuration file")]
fn test_loading_from_wrong_path_panics() {
    let _guard = lock();
    confstack::flush();

    confstack::load_file("appconfig", "yml", "no/such/path/");
}

#[test]
#[should_panic(expected = "cannot load configuration file")]
fn test_loading_wrong_file_name_panics() {
    let _guard = lock();
    confstack::flush();

    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);

    confstack::load_file("appConfig", "env", dir.path());
}

#[test]
fn test_try_load_file_reports_typed_errors() {
    let _guard = lock();
    confstack::flush();

    let err = confstack::try_load_file("appconfig", "xml", "conf/").unwrap_err();
    assert!(matches!(err, confstack::ConfigError::UnsupportedFormat { .. }));

    let err = confstack::try_load_file("appconfig", "yml", "no/such/path/").unwrap_err();
    assert!(matches!(err, confstack::ConfigError::Load { .. }));
}

#[test]
fn test_failed_load_does_not_poison_later_loads() {
    let _guard = lock();
    confstack::flush();

    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);

    assert!(confstack::try_load_file("missing", "yml", dir.path()).is_err());
    confstack::load_file("appconfig", "yml", dir.path());
    assert_eq!(confstack::get_int("server.port"), 8080);

    confstack::flush();
}
