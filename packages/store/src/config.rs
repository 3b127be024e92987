//! # Store configuration — `store.toml`
//!
//! Defines the TOML configuration read by the embedding application when it
//! opens the local database (filename: [`StoreConfig::filename`] =
//! `"store.toml"`).
//!
//! ## Structure
//!
//! ```toml
//! [storage]
//! root = "/home/me/.local/share/notes"   # FileBackend base directory
//!
//! [index]
//! separator = ":"                        # between namespace and entry key
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`StoreConfig`] | Top-level config with builder helpers, TOML (de)serialisation, and constructors for a [`FileBackend`] and [`Namespace`]s. |
//! | [`StorageConfig`] | Where the file backend keeps its data. Empty means the caller picks a platform data directory. |
//! | [`IndexConfig`] | Backend key layout — the separator, default `":"`. |
//!
//! All structs derive `Default` so that a missing or empty config file is
//! equivalent to the default configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::file_store::FileBackend;
use crate::keys::{Namespace, DEFAULT_SEPARATOR};

/// Top-level configuration stored in `store.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

/// File backend location.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory of the file backend.
    #[serde(default)]
    pub root: String,
}

/// Backend key layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Separator between namespace and entry key: one character that
    /// namespaces may not contain.
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

impl StoreConfig {
    /// Create a config with the given storage root.
    pub fn new(root: String) -> Self {
        Self {
            storage: StorageConfig { root },
            index: IndexConfig::default(),
        }
    }

    /// Builder method to set the key separator.
    pub fn with_separator(mut self, separator: &str) -> Self {
        self.index.separator = separator.to_string();
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "store.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// A file backend rooted at `storage.root`.
    pub fn file_backend(&self) -> FileBackend {
        FileBackend::new(PathBuf::from(&self.storage.root))
    }

    /// A namespace using the configured separator.
    pub fn namespace(&self, name: &str) -> Result<Namespace> {
        Namespace::with_separator(name, &self.index.separator)
    }
}
