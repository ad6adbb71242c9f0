//! Local durable store for breathsync.
//!
//! This module provides a pluggable key-value persistence layer that survives
//! app restarts (file, SQLite) or lives only for the process (memory).
//!
//! # Design
//!
//! The [`LocalStore`] trait only moves strings. The typed layer on top,
//! [`OfflineStore`], owns the key layout and the JSON encoding, and treats
//! missing or unparseable values as absent.
//!
//! Keys are namespaced by owner and collection:
//! `breath_offline_{owner}_{collection}`.

mod file;
mod memory;
mod offline;
mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use offline::OfflineStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use sync_types::OwnerId;
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

/// Key prefix shared by every breathsync entry.
pub const KEY_PREFIX: &str = "breath_offline";

/// Local storage errors.
///
/// Only raised on writes and removals. Reads that fail are reported as
/// absent values by [`OfflineStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error.
    #[error("storage database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Value could not be encoded.
    #[error("storage encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Trait for string key-value persistence.
///
/// Implementations must make `set` replace the whole value: a reader never
/// observes a half-written value.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Create or replace the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Logical collections kept per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Sessions recorded offline, in enqueue order.
    PendingSessions,
    /// Raw page of the last successful session fetch.
    CachedSessions,
    /// Best known current profile settings.
    CachedProfile,
    /// Settings overlay not yet confirmed by the backend.
    PendingSettings,
}

impl Collection {
    /// Every collection, for owner-wide wipes.
    pub const ALL: [Collection; 4] = [
        Collection::PendingSessions,
        Collection::CachedSessions,
        Collection::CachedProfile,
        Collection::PendingSettings,
    ];

    /// Key suffix for this collection.
    pub fn suffix(&self) -> &'static str {
        match self {
            Collection::PendingSessions => "pending_sessions",
            Collection::CachedSessions => "cached_sessions",
            Collection::CachedProfile => "cached_profile",
            Collection::PendingSettings => "pending_settings",
        }
    }
}

/// Fully qualified storage key for one owner's collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    owner: OwnerId,
    collection: Collection,
}

impl StoreKey {
    /// Build the key for `owner` and `collection`.
    pub fn new(owner: &OwnerId, collection: Collection) -> Self {
        Self {
            owner: owner.clone(),
            collection,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            KEY_PREFIX,
            self.owner,
            self.collection.suffix()
        )
    }
}

/// Open the store described by `config`.
///
/// Relative or missing paths resolve under `data_dir`.
pub async fn open_store(
    config: &StorageConfig,
    data_dir: &Path,
) -> Result<Arc<dyn LocalStore>, StorageError> {
    let store: Arc<dyn LocalStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => {
            let dir = data_dir.join(config.path.as_deref().unwrap_or(Path::new("offline")));
            Arc::new(FileStore::open(&dir).await?)
        }
        StorageBackend::Sqlite => {
            let path = data_dir.join(config.path.as_deref().unwrap_or(Path::new("offline.db")));
            Arc::new(SqliteStore::open(&path).await?)
        }
    };
    tracing::debug!(backend = ?config.backend, "local store opened");
    Ok(store)
}
