//! Typed access to the per-owner offline collections.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sync_core::{PendingQueue, SettingsState};
use sync_types::{OwnerId, PendingSession, ProfileSettings, SessionRow, SettingsPatch};

use super::{Collection, LocalStore, StorageError, StoreKey};

/// JSON view over a [`LocalStore`].
///
/// Reads never fail: a missing, unreadable or unparseable value is logged
/// and reported as absent (empty queue, no cache, clean overlay). Writes
/// propagate [`StorageError`].
#[derive(Clone)]
pub struct OfflineStore {
    store: Arc<dyn LocalStore>,
}

impl OfflineStore {
    /// Wrap a raw store.
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    // ---- pending sessions ----

    /// Queued sessions for `owner`, in enqueue order.
    pub async fn pending_sessions(&self, owner: &OwnerId) -> PendingQueue {
        let entries: Option<Vec<PendingSession>> =
            self.read(owner, Collection::PendingSessions).await;
        PendingQueue::from_entries(entries.unwrap_or_default())
    }

    /// Append one session and return its queue position.
    pub async fn append_pending_session(
        &self,
        owner: &OwnerId,
        entry: PendingSession,
    ) -> Result<usize, StorageError> {
        let mut queue = self.pending_sessions(owner).await;
        let position = queue.push(entry);
        self.replace_pending_sessions(owner, &queue).await?;
        Ok(position)
    }

    /// Replace the whole queue in one write. An empty queue removes the key.
    pub async fn replace_pending_sessions(
        &self,
        owner: &OwnerId,
        queue: &PendingQueue,
    ) -> Result<(), StorageError> {
        if queue.is_empty() {
            return self.remove(owner, Collection::PendingSessions).await;
        }
        self.write(owner, Collection::PendingSessions, queue.entries())
            .await
    }

    // ---- session read cache ----

    /// Last successful server page for `owner`, newest first.
    pub async fn cached_sessions(&self, owner: &OwnerId) -> Vec<SessionRow> {
        self.read(owner, Collection::CachedSessions)
            .await
            .unwrap_or_default()
    }

    /// Overwrite the session cache with a fresh server page.
    pub async fn set_cached_sessions(
        &self,
        owner: &OwnerId,
        rows: &[SessionRow],
    ) -> Result<(), StorageError> {
        self.write(owner, Collection::CachedSessions, rows).await
    }

    // ---- profile settings ----

    /// Cached settings for `owner`, if any.
    pub async fn cached_settings(&self, owner: &OwnerId) -> Option<ProfileSettings> {
        self.read(owner, Collection::CachedProfile).await
    }

    /// Overwrite the cached settings.
    pub async fn set_cached_settings(
        &self,
        owner: &OwnerId,
        settings: &ProfileSettings,
    ) -> Result<(), StorageError> {
        self.write(owner, Collection::CachedProfile, settings).await
    }

    /// Pending overlay state for `owner`.
    pub async fn settings_state(&self, owner: &OwnerId) -> SettingsState {
        let overlay: Option<SettingsPatch> = self.read(owner, Collection::PendingSettings).await;
        SettingsState::from_stored(overlay)
    }

    /// Persist the overlay state. A clean state removes the key.
    pub async fn store_settings_state(
        &self,
        owner: &OwnerId,
        state: &SettingsState,
    ) -> Result<(), StorageError> {
        match state.to_stored() {
            Some(overlay) => {
                self.write(owner, Collection::PendingSettings, &overlay)
                    .await
            }
            None => self.remove(owner, Collection::PendingSettings).await,
        }
    }

    // ---- owner scope ----

    /// Remove every collection stored for `owner`.
    pub async fn wipe_owner(&self, owner: &OwnerId) -> Result<(), StorageError> {
        for collection in Collection::ALL {
            self.remove(owner, collection).await?;
        }
        tracing::info!(%owner, "offline data wiped");
        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, owner: &OwnerId, collection: Collection) -> Option<T> {
        let key = StoreKey::new(owner, collection).to_string();
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%key, error = %e, "unreadable offline value, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%key, error = %e, "corrupt offline value, treating as absent");
                None
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        owner: &OwnerId,
        collection: Collection,
        value: &T,
    ) -> Result<(), StorageError> {
        let key = StoreKey::new(owner, collection).to_string();
        let encoded = serde_json::to_string(value)?;
        self.store.set(&key, &encoded).await
    }

    async fn remove(&self, owner: &OwnerId, collection: Collection) -> Result<(), StorageError> {
        let key = StoreKey::new(owner, collection).to_string();
        self.store.remove(&key).await
    }
}
