//! # Store — indexed persistent key-value storage for the offline note database
//!
//! Each logical collection ("notes", "settings", ...) is a namespace. A
//! namespace keeps its values as individual backend entries plus one index
//! blob listing which keys exist, so enumeration and existence checks never
//! scan the backend.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`backend`] | The async [`StorageBackend`] trait every medium implements |
//! | [`memory`] / [`file_store`] / `idb` | In-memory, filesystem and IndexedDB (`web` feature) backends |
//! | [`keys`] | [`Namespace`] validation and backend key derivation |
//! | [`indexer`] | [`Indexer`]: the index of one namespace and its entries |
//! | [`map`] | [`PersistentMap`]: the map contract applications use |
//! | [`shared`] | [`SharedMap`]: a cloneable map that serialises overlapping callers |
//! | [`diagnostics`] | Non-fatal conditions (corrupt data, orphans) surfaced to the app |
//! | [`config`] | `store.toml` |
//!
//! ```no_run
//! # async fn run() -> store::Result<()> {
//! use store::{MemoryBackend, PersistentMap};
//!
//! let mut notes: PersistentMap<_, String> = PersistentMap::named(MemoryBackend::new(), "notes")?;
//! notes.init().await?;
//! notes.set("welcome", &"Hello".to_string()).await?;
//! assert!(notes.has("welcome")?);
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod file_store;
pub mod indexer;
pub mod keys;
pub mod map;
pub mod memory;
pub mod shared;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod idb;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use idb::IdbBackend;

pub use backend::StorageBackend;
pub use config::StoreConfig;
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use error::{BackendError, Result, StoreError};
pub use file_store::FileBackend;
pub use indexer::{Indexer, IndexerState};
pub use keys::Namespace;
pub use map::PersistentMap;
pub use memory::MemoryBackend;
pub use shared::SharedMap;
