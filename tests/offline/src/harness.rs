//! Offline scenario harness.
//!
//! Wires a [`SyncClient`] to a shared [`MockRemote`], a local store and a
//! [`ConnectivityOracle`] the scenario drives by hand. A harness can be
//! restarted over the same store to model the app being killed and
//! relaunched.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use sync_client::{
    Connectivity, ConnectivityOracle, CoordinatorHandle, LocalStore, MemoryStore, MockRemote, OfflineStore,
    SyncClient, SyncOptions,
};
use sync_types::{NewSession, OwnerId, PendingSession, SessionRow, User};

/// Owner id every scenario runs as.
pub const OWNER: &str = "u1";

/// The scenario user.
pub fn user() -> User {
    User {
        id: owner(),
        email: "u1@example.com".to_string(),
    }
}

/// The scenario owner id.
pub fn owner() -> OwnerId {
    OwnerId::new(OWNER).expect("non-empty owner")
}

/// A completed one-minute session with a distinct label.
pub fn session(label: &str) -> NewSession {
    NewSession::new(label, "box-breathing", 60)
}

/// One running app instance plus the backend it talks to.
pub struct OfflineHarness {
    /// Backend shared across restarts.
    pub remote: MockRemote,
    /// Local store shared across restarts.
    pub store: Arc<dyn LocalStore>,
    /// Connectivity source for this instance.
    pub oracle: ConnectivityOracle,
    /// Client for this instance.
    pub client: Arc<SyncClient>,
}

impl OfflineHarness {
    /// Fresh backend and in-memory store with connectivity resolved.
    pub async fn memory(online: bool) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), online).await
    }

    /// Fresh backend over `store`.
    ///
    /// The backend clock is fixed so delivery order is visible in
    /// `created_at`.
    pub async fn with_store(store: Arc<dyn LocalStore>, online: bool) -> Self {
        let remote = MockRemote::with_user(user());
        remote.set_server_clock(Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap());
        Self::launch(remote, store, ConnectivityOracle::resolved(online)).await
    }

    /// Fresh backend over `store` with connectivity not yet known.
    ///
    /// Reads that need connectivity give up after `resolve_timeout`.
    pub async fn unresolved(store: Arc<dyn LocalStore>, resolve_timeout: Duration) -> Self {
        Self::launch(
            MockRemote::with_user(user()),
            store,
            ConnectivityOracle::new(resolve_timeout),
        )
        .await
    }

    async fn launch(remote: MockRemote, store: Arc<dyn LocalStore>, oracle: ConnectivityOracle) -> Self {
        let client = Arc::new(SyncClient::new(
            Arc::new(remote.clone()),
            Arc::clone(&store),
            Arc::new(oracle.clone()),
            &SyncOptions::default(),
        ));
        // The host app restores its auth session before any write
        client.set_user(Some(user())).await;
        tracing::debug!(online = ?oracle.resolved_status(), "harness launched");
        Self {
            remote,
            store,
            oracle,
            client,
        }
    }

    /// A new app instance over the same backend and store.
    pub async fn restart(&self, online: bool) -> Self {
        Self::launch(
            self.remote.clone(),
            Arc::clone(&self.store),
            ConnectivityOracle::resolved(online),
        )
        .await
    }

    /// Relaunch against an existing backend over a reopened `store`.
    pub async fn relaunch(remote: MockRemote, store: Arc<dyn LocalStore>, online: bool) -> Self {
        Self::launch(remote, store, ConnectivityOracle::resolved(online)).await
    }

    /// Report the network as up.
    pub fn go_online(&self) {
        self.oracle.report(true);
    }

    /// Report the network as down.
    pub fn go_offline(&self) {
        self.oracle.report(false);
    }

    /// Start the reconnection coordinator for this instance.
    pub fn start_reconnect(&self) -> CoordinatorHandle {
        self.client.start_reconnect()
    }

    /// Typed view of the local store.
    pub fn offline_store(&self) -> OfflineStore {
        OfflineStore::new(Arc::clone(&self.store))
    }

    /// Local pending queue for the scenario owner.
    pub async fn queued(&self) -> Vec<PendingSession> {
        self.offline_store()
            .pending_sessions(&owner())
            .await
            .into_entries()
    }

    /// Backend rows for the scenario owner, newest first.
    pub fn delivered(&self) -> Vec<SessionRow> {
        self.remote.rows_for(&owner())
    }

    /// Record `labels` in order, panicking on any error.
    pub async fn record_all(&self, labels: &[&str]) {
        for label in labels {
            self.client
                .record_session(&session(label))
                .await
                .unwrap_or_else(|e| panic!("recording {} failed: {}", label, e));
        }
    }
}
