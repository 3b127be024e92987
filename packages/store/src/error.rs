//! Error types shared by every layer of the store.
//!
//! [`BackendError`] is what a [`StorageBackend`](crate::backend::StorageBackend)
//! reports when raw I/O fails. [`StoreError`] is what callers of
//! [`Indexer`](crate::Indexer) and [`PersistentMap`](crate::PersistentMap) see.
//!
//! Decoding failures are deliberately absent from both enums: a stored value
//! that no longer decodes is reported as missing and surfaced through
//! [`crate::diagnostics`] instead.

use thiserror::Error;

/// Failure of the raw key-value medium.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend I/O error on `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend rejected operation on `{key}`")]
    Rejected { key: String },
}

/// Errors returned by indexer and map operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An operation was issued before `init()` completed.
    #[error("namespace `{namespace}` is not initialized")]
    NotInitialized { namespace: String },

    #[error("invalid namespace `{namespace}`: {reason}")]
    InvalidNamespace {
        namespace: String,
        reason: &'static str,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The value could not be serialized; nothing was written.
    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid store config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
