//! # Namespaces and backend key derivation
//!
//! A [`Namespace`] names one logical collection (`"notes"`, `"settings"`) and
//! owns the mapping from caller keys to backend keys:
//!
//! | Stored item | Backend key |
//! |-------------|-------------|
//! | index blob | `"<namespace>"` |
//! | entry `k` | `"<namespace><sep><k>"` |
//!
//! The separator defaults to `":"` and must be exactly one character. A
//! namespace may not contain it, which keeps the key spaces of different
//! namespaces disjoint: an index key never contains the separator while every
//! entry key does, and the part of an entry key before the first separator is
//! always its own namespace. A longer separator would break the last rule:
//! with `"::"`, namespace `"a:"` and key `"k"` give the same backend key as
//! namespace `"a"` and key `":k"`.

use std::fmt;

use crate::error::{Result, StoreError};

pub const DEFAULT_SEPARATOR: &str = ":";

/// A validated namespace name bound to a key separator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Namespace {
    name: String,
    separator: String,
}

impl Namespace {
    /// Namespace using the default `":"` separator.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_separator(name, DEFAULT_SEPARATOR)
    }

    pub fn with_separator(name: impl Into<String>, separator: &str) -> Result<Self> {
        let name = name.into();
        let reason = if separator.chars().count() != 1 {
            Some("separator must be a single character")
        } else if name.is_empty() {
            Some("name is empty")
        } else if name.contains(separator) {
            Some("name contains the key separator")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(StoreError::InvalidNamespace {
                namespace: name,
                reason,
            });
        }
        Ok(Self {
            name,
            separator: separator.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend key holding the serialized index.
    pub fn index_key(&self) -> String {
        self.name.clone()
    }

    /// Backend key holding the entry for `key`.
    pub fn entry_key(&self, key: &str) -> String {
        format!("{}{}{}", self.name, self.separator, key)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
