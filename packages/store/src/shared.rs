//! A cloneable [`PersistentMap`] handle for callers that overlap.
//!
//! Each operation takes a `tokio::sync::Mutex` for its whole duration, so
//! calls from different logical callers on one namespace are applied one at a
//! time in the order they acquire the lock. This is the per-namespace queue
//! for index mutations; a plain `PersistentMap` leaves that to the borrow
//! checker.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::map::PersistentMap;

pub struct SharedMap<B, V> {
    inner: Arc<Mutex<PersistentMap<B, V>>>,
}

impl<B, V> Clone for SharedMap<B, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B, V> From<PersistentMap<B, V>> for SharedMap<B, V> {
    fn from(map: PersistentMap<B, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }
}

impl<B, V> SharedMap<B, V>
where
    B: StorageBackend,
    V: Serialize + DeserializeOwned,
{
    pub fn new(map: PersistentMap<B, V>) -> Self {
        map.into()
    }

    pub async fn init(&self) -> Result<()> {
        self.inner.lock().await.init().await
    }

    pub async fn set(&self, key: &str, value: &V) -> Result<()> {
        self.inner.lock().await.set(key, value).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.inner.lock().await.delete(key).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        self.inner.lock().await.get(key).await
    }

    pub async fn has(&self, key: &str) -> Result<bool> {
        self.inner.lock().await.has(key)
    }

    pub async fn clear(&self) -> Result<()> {
        self.inner.lock().await.clear().await
    }

    pub async fn values(&self) -> Result<Vec<V>> {
        self.inner.lock().await.values().await
    }

    pub async fn len(&self) -> Result<usize> {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> Result<bool> {
        self.inner.lock().await.is_empty()
    }
}
