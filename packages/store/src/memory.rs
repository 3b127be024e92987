use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::StorageBackend;
use crate::error::BackendError;

/// In-memory StorageBackend for testing and desktop fallback.
///
/// Clones share the same items, so one backend can serve several namespaces.
/// Faults can be switched on to exercise the store's failure paths.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    items: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    faults: Arc<Mutex<Faults>>,
}

#[derive(Debug, Default)]
struct Faults {
    reads: bool,
    writes: bool,
    removes: bool,
    keys: HashSet<String>,
}

impl Faults {
    fn check(&self, enabled: bool, key: &str) -> Result<(), BackendError> {
        if enabled || self.keys.contains(key) {
            return Err(BackendError::Rejected {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every `get_item` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.faults().reads = fail;
    }

    /// Make every `set_item` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.faults().writes = fail;
    }

    /// Make every `remove_item` fail.
    pub fn fail_removes(&self, fail: bool) {
        self.faults().removes = fail;
    }

    /// Make every operation on one backend key fail.
    pub fn fail_key(&self, key: &str) {
        self.faults().keys.insert(key.to_string());
    }

    pub fn clear_faults(&self) {
        *self.faults() = Faults::default();
    }

    /// Raw bytes under a backend key, bypassing faults.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.items().get(key).cloned()
    }

    /// Overwrite raw bytes under a backend key, bypassing faults.
    pub fn put_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.items().insert(key.to_string(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    async fn get_item(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let reads = self.faults().reads;
        self.faults().check(reads, key)?;
        Ok(self.items().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError> {
        let writes = self.faults().writes;
        self.faults().check(writes, key)?;
        self.items().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        let removes = self.faults().removes;
        self.faults().check(removes, key)?;
        self.items().remove(key);
        Ok(())
    }
}
