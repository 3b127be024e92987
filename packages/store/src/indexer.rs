//! # Indexer — one namespace's index and its entries
//!
//! [`Indexer`] is the only component that touches both the index of a
//! namespace and the per-key entries behind it. The index is an insertion
//! ordered set of keys kept in memory and persisted as one blob under
//! [`Namespace::index_key`] after every mutation.
//!
//! ## Lifecycle
//!
//! `Uninitialized → Initializing → Ready`. Only [`init`](Indexer::init) leaves
//! `Uninitialized`; every other operation fails with
//! [`StoreError::NotInitialized`] until it has completed. A failed `init`
//! returns to `Uninitialized`.
//!
//! ## Consistency
//!
//! | Operation | Touches | On backend failure |
//! |-----------|---------|--------------------|
//! | [`write`](Indexer::write) / [`remove`](Indexer::remove) | entry only | error, index untouched |
//! | [`index`](Indexer::index) / [`deindex`](Indexer::deindex) | index only | error, in-memory index restored |
//! | [`clear`](Indexer::clear) | index, then entries | index failure: error, nothing changed; entry failure: orphan diagnostic |
//!
//! Restoring the in-memory index when its persist fails keeps the in-memory
//! and persisted copies identical for the whole process lifetime.
//!
//! Reads never fail on bad data: an entry that does not decode is absent, and
//! is reported through [`crate::diagnostics`].
//!
//! Mutating operations take `&mut self`, so overlapping mutations of one
//! namespace cannot be expressed without going through a lock such as
//! [`SharedMap`](crate::SharedMap).

use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::StorageBackend;
use crate::codec;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics};
use crate::error::{Result, StoreError};
use crate::keys::Namespace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexerState {
    Uninitialized,
    Initializing,
    Ready,
}

#[derive(Debug)]
pub struct Indexer<B> {
    backend: B,
    namespace: Namespace,
    indices: IndexSet<String>,
    state: IndexerState,
    diagnostics: Diagnostics,
}

impl<B: StorageBackend> Indexer<B> {
    pub fn new(backend: B, namespace: Namespace) -> Self {
        Self {
            backend,
            namespace,
            indices: IndexSet::new(),
            state: IndexerState::Uninitialized,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Route warning-class conditions to `sink` in addition to the log.
    pub fn with_diagnostics(mut self, sink: DiagnosticSink) -> Self {
        self.diagnostics.set_sink(sink);
        self
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn state(&self) -> IndexerState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == IndexerState::Ready
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        Err(StoreError::NotInitialized {
            namespace: self.namespace.name().to_string(),
        })
    }

    /// Load the persisted index. A missing or undecodable blob yields an
    /// empty index; only backend failures are errors. Calling `init` again
    /// once ready does nothing.
    pub async fn init(&mut self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        self.state = IndexerState::Initializing;

        let blob = match self.backend.get_item(&self.namespace.index_key()).await {
            Ok(blob) => blob,
            Err(err) => {
                self.state = IndexerState::Uninitialized;
                return Err(err.into());
            }
        };

        self.indices = match blob {
            None => IndexSet::new(),
            Some(bytes) => codec::decode_index(&bytes).unwrap_or_else(|err| {
                self.diagnostics.emit(Diagnostic::CorruptIndex {
                    namespace: self.namespace.name().to_string(),
                    error: err.to_string(),
                });
                IndexSet::new()
            }),
        };
        self.state = IndexerState::Ready;

        tracing::debug!(
            namespace = %self.namespace,
            keys = self.indices.len(),
            "index loaded"
        );
        Ok(())
    }

    /// Serialize `value` and store it as the entry for `key`.
    pub async fn write<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        self.ensure_ready()?;
        let bytes = codec::encode_value(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend
            .set_item(&self.namespace.entry_key(key), bytes)
            .await?;
        Ok(())
    }

    /// The decoded entry for `key`, or `None` when it is missing or does not
    /// decode as `V`.
    pub async fn read<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>> {
        self.ensure_ready()?;
        let bytes = self
            .backend
            .get_item(&self.namespace.entry_key(key))
            .await?;
        Ok(bytes.and_then(|bytes| self.decode_entry(key, &bytes)))
    }

    /// Read each key in order, omitting keys with no recoverable value.
    pub async fn read_multi<V, I, K>(&self, keys: I) -> Result<Vec<(String, V)>>
    where
        V: DeserializeOwned,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.ensure_ready()?;
        let keys = keys.into_iter();
        let mut entries = Vec::with_capacity(keys.size_hint().0);
        for key in keys {
            let key = key.as_ref();
            let bytes = self
                .backend
                .get_item(&self.namespace.entry_key(key))
                .await?;
            match bytes {
                Some(bytes) => {
                    if let Some(value) = self.decode_entry(key, &bytes) {
                        entries.push((key.to_string(), value));
                    }
                }
                None if self.indices.contains(key) => {
                    self.diagnostics.emit(Diagnostic::MissingEntry {
                        namespace: self.namespace.name().to_string(),
                        key: key.to_string(),
                    });
                }
                None => {}
            }
        }
        Ok(entries)
    }

    fn decode_entry<V: DeserializeOwned>(&self, key: &str, bytes: &[u8]) -> Option<V> {
        match codec::decode_value(bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                self.diagnostics.emit(Diagnostic::CorruptEntry {
                    namespace: self.namespace.name().to_string(),
                    key: key.to_string(),
                    error: err.to_string(),
                });
                None
            }
        }
    }

    /// Delete the entry for `key`. The index is not touched.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_ready()?;
        self.backend
            .remove_item(&self.namespace.entry_key(key))
            .await?;
        Ok(())
    }

    /// Append `key` to the index and persist it. Already indexed keys keep
    /// their position and nothing is written.
    pub async fn index(&mut self, key: &str) -> Result<()> {
        self.ensure_ready()?;
        if self.indices.contains(key) {
            return Ok(());
        }
        let previous = self.indices.clone();
        self.indices.insert(key.to_string());
        self.persist_or_restore(previous).await
    }

    /// Remove `key` from the index and persist it. Absent keys are a no-op.
    pub async fn deindex(&mut self, key: &str) -> Result<()> {
        self.ensure_ready()?;
        if !self.indices.contains(key) {
            return Ok(());
        }
        let previous = self.indices.clone();
        self.indices.shift_remove(key);
        self.persist_or_restore(previous).await
    }

    /// Membership test against the in-memory index; no backend I/O.
    pub fn exists(&self, key: &str) -> Result<bool> {
        self.ensure_ready()?;
        Ok(self.indices.contains(key))
    }

    /// Indexed keys in insertion order.
    pub(crate) fn keys(&self) -> Result<impl Iterator<Item = &str> + '_> {
        self.ensure_ready()?;
        Ok(self.indices.iter().map(String::as_str))
    }

    pub(crate) fn len(&self) -> Result<usize> {
        self.ensure_ready()?;
        Ok(self.indices.len())
    }

    /// Empty the index, then delete the entries it referenced.
    ///
    /// Once the empty index is persisted every entry is unreachable, so entry
    /// removal is best-effort: failures leave orphans and are reported as
    /// [`Diagnostic::OrphanedEntry`].
    pub async fn clear(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let previous = std::mem::take(&mut self.indices);
        self.persist_or_restore(previous.clone()).await?;

        for key in &previous {
            if let Err(err) = self
                .backend
                .remove_item(&self.namespace.entry_key(key))
                .await
            {
                self.diagnostics.emit(Diagnostic::OrphanedEntry {
                    namespace: self.namespace.name().to_string(),
                    key: key.clone(),
                    error: err.to_string(),
                });
            }
        }

        tracing::debug!(namespace = %self.namespace, removed = previous.len(), "namespace cleared");
        Ok(())
    }

    async fn persist_or_restore(&mut self, previous: IndexSet<String>) -> Result<()> {
        if let Err(err) = self.persist().await {
            self.indices = previous;
            return Err(err);
        }
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let index_key = self.namespace.index_key();
        let bytes = codec::encode_index(&self.indices).map_err(|source| StoreError::Encode {
            key: index_key.clone(),
            source,
        })?;
        self.backend.set_item(&index_key, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use std::sync::{Arc, Mutex};

    fn indexer(backend: &MemoryBackend) -> Indexer<MemoryBackend> {
        Indexer::new(backend.clone(), Namespace::new("notes").unwrap())
    }

    fn recording(
        indexer: Indexer<MemoryBackend>,
    ) -> (Indexer<MemoryBackend>, Arc<Mutex<Vec<Diagnostic>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let indexer = indexer.with_diagnostics(Arc::new(move |d: &Diagnostic| {
            sink_seen.lock().unwrap().push(d.clone())
        }));
        (indexer, seen)
    }

    #[tokio::test]
    async fn test_operations_require_init() {
        let backend = MemoryBackend::new();
        let mut indexer = indexer(&backend);
        assert_eq!(indexer.state(), IndexerState::Uninitialized);

        assert!(matches!(
            indexer.exists("a"),
            Err(StoreError::NotInitialized { .. })
        ));
        assert!(indexer.write("a", &1).await.is_err());
        assert!(indexer.read::<i32>("a").await.is_err());
        assert!(indexer.index("a").await.is_err());
        assert!(indexer.clear().await.is_err());
        assert!(backend.is_empty());

        indexer.init().await.unwrap();
        assert_eq!(indexer.state(), IndexerState::Ready);
        assert!(!indexer.exists("a").unwrap());
    }

    #[tokio::test]
    async fn test_failed_init_stays_uninitialized() {
        let backend = MemoryBackend::new();
        let mut indexer = indexer(&backend);

        backend.fail_reads(true);
        assert!(indexer.init().await.is_err());
        assert_eq!(indexer.state(), IndexerState::Uninitialized);

        backend.fail_reads(false);
        indexer.init().await.unwrap();
        assert!(indexer.is_ready());
    }

    #[tokio::test]
    async fn test_init_loads_persisted_index() {
        let backend = MemoryBackend::new();
        backend.put_raw("notes", r#"["b","a"]"#);

        let mut indexer = indexer(&backend);
        indexer.init().await.unwrap();
        assert_eq!(indexer.keys().unwrap().collect::<Vec<_>>(), ["b", "a"]);

        // A second init keeps the in-memory index as is
        backend.put_raw("notes", r#"["c"]"#);
        indexer.init().await.unwrap();
        assert_eq!(indexer.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_index_starts_empty() {
        let backend = MemoryBackend::new();
        backend.put_raw("notes", "{oops");

        let (mut indexer, seen) = recording(indexer(&backend));
        indexer.init().await.unwrap();

        assert_eq!(indexer.len().unwrap(), 0);
        assert!(matches!(
            seen.lock().unwrap().as_slice(),
            [Diagnostic::CorruptIndex { .. }]
        ));
    }

    #[tokio::test]
    async fn test_index_is_idempotent() {
        let backend = MemoryBackend::new();
        let mut indexer = indexer(&backend);
        indexer.init().await.unwrap();

        indexer.index("a").await.unwrap();
        indexer.index("b").await.unwrap();
        indexer.index("a").await.unwrap();
        assert_eq!(indexer.keys().unwrap().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(backend.raw("notes").unwrap(), br#"["a","b"]"#);

        indexer.deindex("missing").await.unwrap();
        indexer.deindex("a").await.unwrap();
        indexer.deindex("a").await.unwrap();
        assert_eq!(backend.raw("notes").unwrap(), br#"["b"]"#);
    }

    #[tokio::test]
    async fn test_write_and_remove_leave_index_alone() {
        let backend = MemoryBackend::new();
        let mut indexer = indexer(&backend);
        indexer.init().await.unwrap();

        indexer.write("a", "hello").await.unwrap();
        assert!(!indexer.exists("a").unwrap());
        assert_eq!(
            indexer.read::<String>("a").await.unwrap().as_deref(),
            Some("hello")
        );
        assert!(!backend.contains("notes"));

        indexer.index("a").await.unwrap();
        indexer.remove("a").await.unwrap();
        assert!(indexer.exists("a").unwrap());
        assert!(indexer.read::<String>("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_absent() {
        let backend = MemoryBackend::new();
        let (mut indexer, seen) = recording(indexer(&backend));
        indexer.init().await.unwrap();

        backend.put_raw("notes:a", "not json");
        indexer.write("b", &7u32).await.unwrap();

        assert!(indexer.read::<u32>("a").await.unwrap().is_none());
        // Wrong type decodes as absent too
        assert!(indexer.read::<Vec<String>>("b").await.unwrap().is_none());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen
            .iter()
            .all(|d| matches!(d, Diagnostic::CorruptEntry { .. })));
    }

    #[tokio::test]
    async fn test_read_multi_skips_unrecoverable_keys() {
        let backend = MemoryBackend::new();
        let (mut indexer, seen) = recording(indexer(&backend));
        indexer.init().await.unwrap();

        for (key, value) in [("a", 1), ("b", 2), ("c", 3)] {
            indexer.write(key, &value).await.unwrap();
            indexer.index(key).await.unwrap();
        }
        indexer.index("ghost").await.unwrap();
        backend.put_raw("notes:b", "][");

        let entries: Vec<(String, i32)> = indexer
            .read_multi(["c", "ghost", "b", "a", "never-indexed"])
            .await
            .unwrap();
        assert_eq!(entries, [("c".to_string(), 3), ("a".to_string(), 1)]);

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.iter()
                .filter(|d| matches!(d, Diagnostic::MissingEntry { .. }))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_failed_persist_restores_index() {
        let backend = MemoryBackend::new();
        let mut indexer = indexer(&backend);
        indexer.init().await.unwrap();
        indexer.index("a").await.unwrap();
        indexer.index("b").await.unwrap();

        backend.fail_key("notes");
        assert!(indexer.index("c").await.is_err());
        assert!(!indexer.exists("c").unwrap());

        assert!(indexer.deindex("a").await.is_err());
        assert_eq!(indexer.keys().unwrap().collect::<Vec<_>>(), ["a", "b"]);

        assert!(indexer.clear().await.is_err());
        assert_eq!(indexer.len().unwrap(), 2);
        assert_eq!(backend.raw("notes").unwrap(), br#"["a","b"]"#);
    }

    #[tokio::test]
    async fn test_clear_reports_orphans() {
        let backend = MemoryBackend::new();
        let (mut indexer, seen) = recording(indexer(&backend));
        indexer.init().await.unwrap();

        for key in ["a", "b"] {
            indexer.write(key, key).await.unwrap();
            indexer.index(key).await.unwrap();
        }

        backend.fail_key("notes:b");
        indexer.clear().await.unwrap();

        assert_eq!(indexer.len().unwrap(), 0);
        assert_eq!(backend.raw("notes").unwrap(), b"[]");
        assert!(!backend.contains("notes:a"));
        assert!(backend.contains("notes:b"));
        assert!(matches!(
            seen.lock().unwrap().as_slice(),
            [Diagnostic::OrphanedEntry { key, .. }] if key == "b"
        ));
    }
}
