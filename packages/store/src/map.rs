//! # PersistentMap — the map contract over one namespace
//!
//! [`PersistentMap`] is what the rest of the application uses: a typed,
//! namespace-scoped map whose values are any `Serialize + DeserializeOwned`
//! type. Every call goes through the namespace's [`Indexer`]; the map never
//! touches the backend or the index itself.
//!
//! | Method | Steps |
//! |--------|-------|
//! | [`set`](PersistentMap::set) | write entry, then index key |
//! | [`delete`](PersistentMap::delete) | remove entry, then deindex key |
//! | [`get`](PersistentMap::get) | direct entry lookup, index not consulted |
//! | [`has`](PersistentMap::has) | in-memory index lookup |
//! | [`clear`](PersistentMap::clear) | empty index, then remove entries |
//! | [`values`](PersistentMap::values) | batch read of the index, in index order |
//!
//! A failed `set` can leave an entry without an index record. It is not
//! listed by `has`, `len` or `values`, and the next `set` of the same key
//! overwrites it. A failed `delete` leaves the key indexed, so the value stays
//! readable rather than lost.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::StorageBackend;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::indexer::Indexer;
use crate::keys::Namespace;

/// A persistent, indexed map from string keys to `V`.
#[derive(Debug)]
pub struct PersistentMap<B, V> {
    indexer: Indexer<B>,
    _value: PhantomData<fn() -> V>,
}

impl<B, V> PersistentMap<B, V>
where
    B: StorageBackend,
    V: Serialize + DeserializeOwned,
{
    pub fn new(backend: B, namespace: Namespace) -> Self {
        Self {
            indexer: Indexer::new(backend, namespace),
            _value: PhantomData,
        }
    }

    /// Map over a namespace using the default key separator.
    pub fn named(backend: B, namespace: &str) -> Result<Self> {
        Ok(Self::new(backend, Namespace::new(namespace)?))
    }

    pub fn with_diagnostics(mut self, sink: DiagnosticSink) -> Self {
        self.indexer = self.indexer.with_diagnostics(sink);
        self
    }

    pub fn namespace(&self) -> &Namespace {
        self.indexer.namespace()
    }

    pub fn is_ready(&self) -> bool {
        self.indexer.is_ready()
    }

    /// Load the namespace's index. Must complete before any other call.
    pub async fn init(&mut self) -> Result<()> {
        self.indexer.init().await
    }

    pub async fn set(&mut self, key: &str, value: &V) -> Result<()> {
        self.indexer.write(key, value).await?;
        self.indexer.index(key).await
    }

    /// Deleting a key that is not present succeeds.
    pub async fn delete(&mut self, key: &str) -> Result<()> {
        self.indexer.remove(key).await?;
        self.indexer.deindex(key).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        self.indexer.read(key).await
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        self.indexer.exists(key)
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.indexer.clear().await
    }

    /// All values in index order. Keys whose entry is missing or corrupt are
    /// skipped.
    pub async fn values(&self) -> Result<Vec<V>> {
        let entries: Vec<(String, V)> = self.indexer.read_multi(self.indexer.keys()?).await?;
        Ok(entries.into_iter().map(|(_, value)| value).collect())
    }

    pub fn len(&self) -> Result<usize> {
        self.indexer.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
