//! Settings sync engine.
//!
//! Profile settings are read cache-first and written optimistically. Changes
//! that could not reach the backend accumulate in a single overlay (see
//! [`SettingsState`]) that wins over cached and server values until a
//! backend write covering it succeeds. Last write wins; there is no
//! multi-device merge.

use std::sync::Arc;
use sync_core::SettingsState;
use sync_types::{OwnerId, ProfileSettings, SettingsPatch};
use tokio::sync::Mutex;

use crate::connectivity::Connectivity;
use crate::error::ClientError;
use crate::remote::RemoteStore;
use crate::store::OfflineStore;

/// Outcome of [`SettingsSync::update_settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsWrite {
    /// The backend accepted the change.
    Applied,
    /// The change is stored locally and waits for a flush.
    Pending,
    /// Nothing to write.
    Unchanged,
}

/// Offline-first engine for profile settings.
pub struct SettingsSync {
    remote: Arc<dyn RemoteStore>,
    offline: OfflineStore,
    connectivity: Arc<dyn Connectivity>,
    flush_lock: Mutex<()>,
    // Guards local read-modify-write of cache and overlay
    state_lock: Mutex<()>,
}

impl SettingsSync {
    /// Create an engine.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        offline: OfflineStore,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            remote,
            offline,
            connectivity,
            flush_lock: Mutex::new(()),
            state_lock: Mutex::new(()),
        }
    }

    /// Current settings with any pending overlay applied.
    ///
    /// Online, the server copy is fetched and cached. A failed fetch, or
    /// being offline, falls back to the cache (or the default shape).
    pub async fn get_settings(&self, owner: &OwnerId) -> ProfileSettings {
        if self.connectivity.is_online().await {
            match self.remote.fetch_settings(owner).await {
                Ok(row) => {
                    let server = row.map(|r| r.resolve()).unwrap_or_default();
                    let _state = self.state_lock.lock().await;
                    let shown = self.offline.settings_state(owner).await.present(&server);
                    if let Err(e) = self.offline.set_cached_settings(owner, &shown).await {
                        tracing::warn!(%owner, error = %e, "failed to cache settings");
                    }
                    return shown;
                }
                Err(e) => {
                    tracing::warn!(%owner, error = %e, "settings fetch failed, using cache");
                }
            }
        }

        let base = self.offline.cached_settings(owner).await.unwrap_or_default();
        self.offline.settings_state(owner).await.present(&base)
    }

    /// Apply `patch`.
    ///
    /// The cache is updated first so readers see the change immediately.
    /// Online, the pending overlay is sent along with the patch; if that
    /// write fails the patch joins the overlay and waits for the next flush.
    pub async fn update_settings(
        &self,
        owner: &OwnerId,
        patch: &SettingsPatch,
    ) -> Result<SettingsWrite, ClientError> {
        if patch.is_empty() {
            return Ok(SettingsWrite::Unchanged);
        }

        let outgoing = {
            let _state = self.state_lock.lock().await;
            let base = self.offline.cached_settings(owner).await.unwrap_or_default();
            self.offline
                .set_cached_settings(owner, &base.with_patch(patch))
                .await?;
            self.offline.settings_state(owner).await.outgoing(patch)
        };

        if self.connectivity.is_online().await {
            match self.remote.update_settings(owner, &outgoing).await {
                Ok(()) => {
                    let _state = self.state_lock.lock().await;
                    let remaining = self.offline.settings_state(owner).await.acknowledge(&outgoing);
                    self.offline.store_settings_state(owner, &remaining).await?;
                    tracing::debug!(%owner, "settings written");
                    return Ok(SettingsWrite::Applied);
                }
                Err(e) => {
                    tracing::warn!(%owner, error = %e, "settings write failed, keeping change pending");
                }
            }
        }

        let _state = self.state_lock.lock().await;
        let staged = self.offline.settings_state(owner).await.stage(patch);
        self.offline.store_settings_state(owner, &staged).await?;
        tracing::info!(%owner, "settings change queued");
        Ok(SettingsWrite::Pending)
    }

    /// Send the pending overlay in one update.
    ///
    /// Returns `true` when an overlay was delivered, `false` when there was
    /// none or the write failed (the overlay is then left intact).
    pub async fn flush_pending_settings(&self, owner: &OwnerId) -> Result<bool, ClientError> {
        let _flush = self.flush_lock.lock().await;

        let Some(overlay) = self.offline.settings_state(owner).await.to_stored() else {
            return Ok(false);
        };

        if let Err(e) = self.remote.update_settings(owner, &overlay).await {
            tracing::warn!(%owner, error = %e, "settings flush failed, overlay kept");
            return Ok(false);
        }

        let _state = self.state_lock.lock().await;
        let remaining = self.offline.settings_state(owner).await.acknowledge(&overlay);
        self.offline.store_settings_state(owner, &remaining).await?;
        let base = self.offline.cached_settings(owner).await.unwrap_or_default();
        let cached = remaining.present(&base.with_patch(&overlay));
        self.offline.set_cached_settings(owner, &cached).await?;

        tracing::info!(%owner, still_pending = remaining.is_dirty(), "pending settings flushed");
        Ok(true)
    }

    /// The overlay waiting for a flush, if any.
    pub async fn pending_overlay(&self, owner: &OwnerId) -> Option<SettingsPatch> {
        self.offline.settings_state(owner).await.to_stored()
    }

    /// Whether `owner` has unconfirmed changes.
    pub async fn is_dirty(&self, owner: &OwnerId) -> bool {
        self.offline.settings_state(owner).await.is_dirty()
    }
}
