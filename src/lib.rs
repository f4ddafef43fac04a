//! confstack
//!
//! A thin facade over a layered key-value configuration store: load files,
//! set defaults and overrides, then read values through typed accessors that
//! never fail (absence and coercion errors degrade to zero values).
//!
//! Two mirrored surfaces are available. The free functions at the crate root
//! operate on one process-wide store:
//!
//! ```no_run
//! confstack::load_file("appconfig", "yml", "conf/");
//! let host = confstack::get_string("server.host");
//! let timeout = confstack::get_duration("server.timeout");
//! ```
//!
//! [`ConfigStore`] is the same surface as an explicitly constructed handle,
//! and [`ConfigStore::get_nested`] hands independent subsystems their own
//! subtree without knowledge of each other's key prefixes:
//!
//! ```no_run
//! let store = confstack::ConfigStore::new();
//! store.load_file("appconfig", "yml", "conf/");
//! if let Some(server) = store.get_nested("server") {
//!     let port = server.get_uint32("port");
//! }
//! ```

pub mod error;
pub mod format;
pub mod global;
pub mod store;
pub mod watcher;

mod accessors;

pub use config::{Map, Value, ValueKind};
pub use error::{ConfigError, Result};
pub use format::FileKind;
pub use global::*;
pub use store::ConfigStore;
pub use watcher::ConfigChangeEvent;
