//! SyncClient - the main interface for breathsync.
//!
//! This module provides [`SyncClient`], the UI-facing API. It owns the
//! injected backend, local store and connectivity source, resolves the
//! signed-in user, and forwards to the two engines with that user as owner.
//!
//! # Architecture
//!
//! ```text
//! UI → SyncClient → SessionSync / SettingsSync → RemoteStore → Network
//!          ↓                   ↓
//!   ReconnectCoordinator   OfflineStore → LocalStore → Disk
//!          ↓
//!   sync-core (pure state machines)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sync_client::{ConnectivityOracle, MemoryStore, MockRemote, SyncClient, SyncOptions};
//! use sync_types::NewSession;
//!
//! let oracle = ConnectivityOracle::resolved(false);
//! let client = Arc::new(SyncClient::new(
//!     Arc::new(MockRemote::new()),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(oracle.clone()),
//!     &SyncOptions::default(),
//! ));
//! let reconnect = client.start_reconnect();
//!
//! client.record_session(&NewSession::new("Sleep", "4-7-8", 240)).await?;
//! oracle.report(true); // queued session is flushed
//! ```

use std::sync::Arc;
use sync_types::{NewSession, OwnerId, ProfileSettings, SettingsPatch, User};
use tokio::sync::RwLock;

use async_trait::async_trait;

use crate::config::SyncOptions;
use crate::connectivity::Connectivity;
use crate::coordinator::{CoordinatorHandle, FlushTarget, ReconnectCoordinator};
use crate::error::ClientError;
use crate::remote::RemoteStore;
use crate::sessions::{ListingSource, RecordOutcome, SessionListing, SessionSync};
use crate::settings::{SettingsSync, SettingsWrite};
use crate::store::{LocalStore, OfflineStore};

/// Snapshot of the sync layer for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    /// Display connectivity (online while unresolved).
    pub online: bool,
    /// Signed-in user, if any.
    pub user: Option<User>,
    /// Sessions waiting for a flush.
    pub pending_sessions: usize,
    /// Settings overlay waiting for a flush.
    pub pending_settings: Option<SettingsPatch>,
}

/// Offline-first sync client.
pub struct SyncClient {
    remote: Arc<dyn RemoteStore>,
    offline: OfflineStore,
    connectivity: Arc<dyn Connectivity>,
    sessions: SessionSync,
    settings: SettingsSync,
    page_size: usize,
    // Last user the backend confirmed, used while it can't be asked
    known_user: RwLock<Option<User>>,
}

impl SyncClient {
    /// Create a client from its collaborators.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        store: Arc<dyn LocalStore>,
        connectivity: Arc<dyn Connectivity>,
        options: &SyncOptions,
    ) -> Self {
        let offline = OfflineStore::new(store);
        let sessions = SessionSync::new(
            Arc::clone(&remote),
            offline.clone(),
            Arc::clone(&connectivity),
            options.page_size,
        );
        let settings = SettingsSync::new(
            Arc::clone(&remote),
            offline.clone(),
            Arc::clone(&connectivity),
        );
        Self {
            remote,
            offline,
            connectivity,
            sessions,
            settings,
            page_size: options.page_size,
            known_user: RwLock::new(None),
        }
    }

    /// Seed the signed-in user, e.g. from the host app's auth session.
    pub async fn set_user(&self, user: Option<User>) {
        *self.known_user.write().await = user;
    }

    /// The signed-in user.
    ///
    /// Asks the backend; when offline or when it can't be reached, the last
    /// confirmed (or seeded) user is returned so offline writes keep their
    /// owner.
    pub async fn current_user(&self) -> Option<User> {
        if self.connectivity.resolved_status() == Some(false) {
            return self.known_user.read().await.clone();
        }
        match self.remote.current_user().await {
            Ok(user) => {
                *self.known_user.write().await = user.clone();
                user
            }
            Err(e) => {
                let known = self.known_user.read().await.clone();
                tracing::debug!(error = %e, cached = known.is_some(), "user lookup failed");
                known
            }
        }
    }

    async fn owner(&self) -> Option<OwnerId> {
        self.current_user().await.map(|u| u.id)
    }

    /// Record a finished session for the signed-in user.
    pub async fn record_session(&self, session: &NewSession) -> Result<RecordOutcome, ClientError> {
        let owner = self.owner().await.ok_or(ClientError::NotAuthenticated)?;
        self.sessions.record_session(&owner, session).await
    }

    /// Up to `limit` sessions, newest first. Empty when signed out.
    pub async fn list_sessions(&self, limit: usize) -> SessionListing {
        match self.owner().await {
            Some(owner) => self.sessions.list_sessions(&owner, limit).await,
            None => SessionListing {
                sessions: Vec::new(),
                source: ListingSource::Cache,
            },
        }
    }

    /// One configured page of sessions.
    pub async fn list_recent(&self) -> SessionListing {
        self.list_sessions(self.page_size).await
    }

    /// Deliver queued sessions. Returns how many were delivered.
    pub async fn flush_pending_sessions(&self) -> usize {
        let Some(owner) = self.owner().await else {
            return 0;
        };
        match self.sessions.flush_pending_sessions(&owner).await {
            Ok(synced) => synced,
            Err(e) => {
                tracing::error!(%owner, error = %e, "session flush could not store its result");
                0
            }
        }
    }

    /// Current settings, or `None` when signed out.
    pub async fn get_settings(&self) -> Option<ProfileSettings> {
        let owner = self.owner().await?;
        Some(self.settings.get_settings(&owner).await)
    }

    /// Apply a settings change. Signed out, nothing is written.
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<SettingsWrite, ClientError> {
        match self.owner().await {
            Some(owner) => self.settings.update_settings(&owner, patch).await,
            None => Ok(SettingsWrite::Unchanged),
        }
    }

    /// Deliver the settings overlay. Returns whether one was delivered.
    pub async fn flush_pending_settings(&self) -> bool {
        let Some(owner) = self.owner().await else {
            return false;
        };
        match self.settings.flush_pending_settings(&owner).await {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::error!(%owner, error = %e, "settings flush could not store its result");
                false
            }
        }
    }

    /// Snapshot for status displays.
    pub async fn status(&self) -> SyncStatus {
        let user = self.current_user().await;
        let (pending_sessions, pending_settings) = match &user {
            Some(user) => (
                self.sessions.pending_count(&user.id).await,
                self.settings.pending_overlay(&user.id).await,
            ),
            None => (0, None),
        };
        SyncStatus {
            online: self.connectivity.current_status(),
            user,
            pending_sessions,
            pending_settings,
        }
    }

    /// Remove everything stored locally for the signed-in user.
    pub async fn wipe_local(&self) -> Result<(), ClientError> {
        let owner = self.owner().await.ok_or(ClientError::NotAuthenticated)?;
        self.sessions.wipe_owner(&owner).await
    }

    /// Session engine, for callers that manage owners themselves.
    pub fn sessions(&self) -> &SessionSync {
        &self.sessions
    }

    /// Settings engine, for callers that manage owners themselves.
    pub fn settings(&self) -> &SettingsSync {
        &self.settings
    }

    /// Connectivity source this client consults.
    pub fn connectivity(&self) -> &Arc<dyn Connectivity> {
        &self.connectivity
    }

    /// Flush automatically on every reconnect until the handle is shut down.
    pub fn start_reconnect(self: &Arc<Self>) -> CoordinatorHandle {
        let target: Arc<dyn FlushTarget> = Arc::clone(self) as Arc<dyn FlushTarget>;
        ReconnectCoordinator::new(target).spawn(Arc::clone(&self.connectivity))
    }
}

#[async_trait]
impl FlushTarget for SyncClient {
    async fn flush_sessions(&self) -> usize {
        self.flush_pending_sessions().await
    }

    async fn flush_settings(&self) -> bool {
        self.flush_pending_settings().await
    }
}
