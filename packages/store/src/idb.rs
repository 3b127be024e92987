//! # IndexedDB storage backend — browser-side persistence
//!
//! [`IdbBackend`] is the [`StorageBackend`] implementation used on the **web
//! platform**. It persists items into the browser's IndexedDB via the
//! [`rexie`] crate, giving the client an offline-capable local database.
//!
//! ## Database schema
//!
//! A single IndexedDB database (default name `"notesdb"`, version 1) with one
//! object store:
//!
//! | IndexedDB store | Key | Value |
//! |-----------------|-----|-------|
//! | `"items"` | backend key string | `Vec<u8>` (via `serde_wasm_bindgen`) |
//!
//! ## Connection management
//!
//! `IdbBackend` only holds the database name and opens a fresh [`Rexie`]
//! connection on every operation. `Rexie` does not implement `Clone`, and the
//! browser caches IndexedDB connections internally.
//!
//! ## Error handling
//!
//! Unlike a plain cache, failures are reported as [`BackendError::Unavailable`]
//! so the store above can keep its index consistent with what was written.

use crate::backend::StorageBackend;
use crate::error::BackendError;
use rexie::{ObjectStore as RexieObjectStore, Rexie, TransactionMode};
use wasm_bindgen::JsValue;

const DEFAULT_DB_NAME: &str = "notesdb";
const DB_VERSION: u32 = 1;
const ITEMS_STORE: &str = "items";

/// IndexedDB-backed StorageBackend for web platform.
///
/// When a user scope is provided, the database is named `"notesdb-<scope>"`,
/// giving each user their own isolated IndexedDB database.
#[derive(Clone, Debug)]
pub struct IdbBackend {
    db_name: String,
}

impl Default for IdbBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IdbBackend {
    /// Create an unscoped backend using the default database.
    pub fn new() -> Self {
        Self::with_scope(None)
    }

    /// Create a backend scoped to an optional user id.
    pub fn with_scope(scope: Option<&str>) -> Self {
        let db_name = match scope {
            Some(scope) => format!("{DEFAULT_DB_NAME}-{scope}"),
            None => DEFAULT_DB_NAME.to_string(),
        };
        Self { db_name }
    }

    async fn open_db(&self) -> Result<Rexie, BackendError> {
        Rexie::builder(&self.db_name)
            .version(DB_VERSION)
            .add_object_store(RexieObjectStore::new(ITEMS_STORE))
            .build()
            .await
            .map_err(unavailable)
    }

    /// Drop the whole database.
    pub async fn delete(&self) -> Result<(), BackendError> {
        Rexie::delete(&self.db_name).await.map_err(unavailable)
    }
}

fn unavailable(e: impl std::fmt::Display) -> BackendError {
    BackendError::Unavailable(e.to_string())
}

impl StorageBackend for IdbBackend {
    async fn get_item(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let db = self.open_db().await?;
        let tx = db
            .transaction(&[ITEMS_STORE], TransactionMode::ReadOnly)
            .map_err(unavailable)?;
        let store = tx.store(ITEMS_STORE).map_err(unavailable)?;

        let value = store
            .get(JsValue::from_str(key))
            .await
            .map_err(unavailable)?;

        let Some(js_val) = value else {
            return Ok(None);
        };
        serde_wasm_bindgen::from_value(js_val)
            .map(Some)
            .map_err(unavailable)
    }

    async fn set_item(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError> {
        let db = self.open_db().await?;
        let tx = db
            .transaction(&[ITEMS_STORE], TransactionMode::ReadWrite)
            .map_err(unavailable)?;
        let store = tx.store(ITEMS_STORE).map_err(unavailable)?;

        let js_key = JsValue::from_str(key);
        let js_value = serde_wasm_bindgen::to_value(&value).map_err(unavailable)?;
        store
            .put(&js_value, Some(&js_key))
            .await
            .map_err(unavailable)?;
        tx.done().await.map_err(unavailable)?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        let db = self.open_db().await?;
        let tx = db
            .transaction(&[ITEMS_STORE], TransactionMode::ReadWrite)
            .map_err(unavailable)?;
        let store = tx.store(ITEMS_STORE).map_err(unavailable)?;

        store
            .delete(JsValue::from_str(key))
            .await
            .map_err(unavailable)?;
        tx.done().await.map_err(unavailable)?;
        Ok(())
    }
}
