//! # Filesystem-backed storage backend
//!
//! [`FileBackend`] is a [`StorageBackend`] implementation that persists every
//! backend key as one file. It is used on desktop and mobile platforms to
//! retain the database across app restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! └── items/
//!     ├── <hex(key)>          # raw value bytes
//!     └── sha1-<hex(sha1)>    # same, for keys too long for a file name
//! ```
//!
//! Keys are hex-encoded so any string (including `/` and `:`) maps to a valid
//! file name. Hex output never contains `s`, so the hashed form cannot collide
//! with a plain one.
//!
//! Writes go to a sibling `.tmp` file first and are renamed into place, so a
//! crash mid-write leaves either the old value or the new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

use crate::backend::StorageBackend;
use crate::error::BackendError;

/// Longest hex-encoded key used verbatim as a file name.
const MAX_PLAIN_NAME: usize = 200;

/// Filesystem-backed StorageBackend for desktop and mobile persistence.
#[derive(Clone, Debug)]
pub struct FileBackend {
    base: PathBuf,
}

impl FileBackend {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn items_dir(&self) -> PathBuf {
        self.base.join("items")
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.items_dir().join(file_name(key))
    }

    /// Delete all data stored under `base`.
    pub fn delete_all(base: &Path) -> std::io::Result<()> {
        match std::fs::remove_dir_all(base.join("items")) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn file_name(key: &str) -> String {
    let plain = hex::encode(key.as_bytes());
    if plain.len() <= MAX_PLAIN_NAME {
        return plain;
    }
    let digest = Sha1::digest(key.as_bytes());
    format!("sha1-{}", hex::encode(digest))
}

fn io_error(key: &str, source: std::io::Error) -> BackendError {
    BackendError::Io {
        key: key.to_string(),
        source,
    }
}

impl StorageBackend for FileBackend {
    async fn get_item(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        match std::fs::read(self.item_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn set_item(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError> {
        let path = self.item_path(key);
        std::fs::create_dir_all(self.items_dir()).map_err(|e| io_error(key, e))?;

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(key, e))
    }

    async fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        match std::fs::remove_file(self.item_path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(io_error(key, e)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();

        let backend = FileBackend::new(dir.path().to_path_buf());
        backend.set_item("notes:a/b", b"hello".to_vec()).await.unwrap();

        // Re-open from same directory
        let backend2 = FileBackend::new(dir.path().to_path_buf());
        assert_eq!(
            backend2.get_item("notes:a/b").await.unwrap(),
            Some(b"hello".to_vec())
        );
        assert!(backend2.get_item("notes:missing").await.unwrap().is_none());

        backend2.remove_item("notes:a/b").await.unwrap();
        backend2.remove_item("notes:a/b").await.unwrap();
        assert!(backend.get_item("notes:a/b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_long_keys_are_hashed() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());

        let long = "k".repeat(500);
        assert!(file_name(&long).starts_with("sha1-"));
        assert_eq!(file_name("ab"), "6162");

        backend.set_item(&long, b"v".to_vec()).await.unwrap();
        assert_eq!(backend.get_item(&long).await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());

        backend.set_item("k", b"1".to_vec()).await.unwrap();
        backend.set_item("k", b"2".to_vec()).await.unwrap();
        assert_eq!(backend.get_item("k").await.unwrap(), Some(b"2".to_vec()));

        let names: Vec<_> = std::fs::read_dir(dir.path().join("items"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);

        FileBackend::delete_all(dir.path()).unwrap();
        assert!(backend.get_item("k").await.unwrap().is_none());
        FileBackend::delete_all(dir.path()).unwrap();
    }
}
