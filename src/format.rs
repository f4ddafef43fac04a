//! Configuration File Types
//!
//! The fixed set of file type tags accepted by the loader, and the mapping
//! from each tag to the parser format of the underlying store.

use std::fmt;
use std::str::FromStr;

use config::FileFormat;

use crate::error::ConfigError;

/// A supported configuration file type tag
///
/// The tag doubles as the file extension the loader searches for, so
/// `load_file("app", "yml", "conf/")` reads `conf/app.yml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Json,
    Toml,
    Yaml,
    Yml,
    Properties,
    Props,
    Prop,
    Hcl,
    Dotenv,
    Env,
    Ini,
}

impl FileKind {
    /// Every supported file type tag
    pub const ALL: [FileKind; 11] = [
        FileKind::Json,
        FileKind::Toml,
        FileKind::Yaml,
        FileKind::Yml,
        FileKind::Properties,
        FileKind::Props,
        FileKind::Prop,
        FileKind::Hcl,
        FileKind::Dotenv,
        FileKind::Env,
        FileKind::Ini,
    ];

    /// The tag string, also used as the file extension
    pub fn tag(self) -> &'static str {
        match self {
            FileKind::Json => "json",
            FileKind::Toml => "toml",
            FileKind::Yaml => "yaml",
            FileKind::Yml => "yml",
            FileKind::Properties => "properties",
            FileKind::Props => "props",
            FileKind::Prop => "prop",
            FileKind::Hcl => "hcl",
            FileKind::Dotenv => "dotenv",
            FileKind::Env => "env",
            FileKind::Ini => "ini",
        }
    }

    /// Parser format handed to the underlying store.
    ///
    /// The properties and dotenv families are key=value syntaxes that the INI
    /// parser accepts as-is. HCL has no native parser in the underlying
    /// store; its JSON representation is parsed instead.
    pub(crate) fn format(self) -> FileFormat {
        match self {
            FileKind::Json | FileKind::Hcl => FileFormat::Json,
            FileKind::Toml => FileFormat::Toml,
            FileKind::Yaml | FileKind::Yml => FileFormat::Yaml,
            FileKind::Properties
            | FileKind::Props
            | FileKind::Prop
            | FileKind::Dotenv
            | FileKind::Env
            | FileKind::Ini => FileFormat::Ini,
        }
    }
}

impl FromStr for FileKind {
    type Err = ConfigError;

    /// Case-sensitive exact match against the supported set
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| ConfigError::UnsupportedFormat { kind: s.to_string() })
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
