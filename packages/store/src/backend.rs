//! # Storage backend — the raw byte-level key-value primitive
//!
//! Everything above this module ([`crate::Indexer`], [`crate::PersistentMap`])
//! talks to storage only through [`StorageBackend`]. Implementations live in
//! sibling modules:
//!
//! | Backend | Module | Platform |
//! |---------|--------|----------|
//! | [`MemoryBackend`](crate::MemoryBackend) | [`crate::memory`] | everywhere (tests, desktop fallback) |
//! | [`FileBackend`](crate::FileBackend) | [`crate::file_store`] | desktop and mobile |
//! | `IdbBackend` | `idb` | browser, `web` feature |
//!
//! One backend instance is shared by every namespace. Namespaces stay apart
//! because their backend keys never collide (see [`crate::keys`]), not because
//! of any locking here.

use crate::error::BackendError;

/// Async byte storage keyed by strings.
///
/// `get_item` returns `Ok(None)` for a key that was never set or was removed.
/// `remove_item` on an absent key succeeds.
pub trait StorageBackend {
    fn get_item(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>, BackendError>>;
    fn set_item(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<(), BackendError>>;
    fn remove_item(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), BackendError>>;
}

impl<B: StorageBackend> StorageBackend for std::sync::Arc<B> {
    async fn get_item(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove_item(key).await
    }
}
