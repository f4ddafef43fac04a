//! Error Types
//!
//! Failures surface only on the load and watch paths; every typed accessor
//! degrades to a zero value instead of returning an error.

use std::path::PathBuf;

/// Common result type for the fallible parts of the facade
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or watching configuration files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The declared file type tag is not in the supported set
    #[error("configuration file type not supported: {kind}")]
    UnsupportedFormat { kind: String },

    /// Reading, parsing, or merging a configuration file failed
    #[error("cannot load configuration file {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    /// Setting up the file watcher failed
    #[error("cannot watch configuration files: {0}")]
    Watch(#[from] notify::Error),
}
