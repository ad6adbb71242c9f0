//! Session queue scenarios.
//!
//! Recording offline, flushing on return, and the failure cases around a
//! flush: rejected inserts, writes racing the flush, unreadable queues.

#[cfg(test)]
mod tests {
    use crate::assertions::{
        assert_delivered_in_order, assert_no_duplicates, assert_no_loss, assert_queue_labels,
        expect_all,
    };
    use crate::harness::{owner, session, user, OfflineHarness};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use sync_client::store::{Collection, StoreKey};
    use sync_client::{
        ConnectivityOracle, ListingSource, LocalStore, MemoryStore, MockRemote, OfflineStore,
        RecordOutcome,
        RemoteCall, RemoteError, RemoteStore, SyncClient, SyncOptions,
    };
    use sync_types::{
        NewSession, OwnerId, RowId, SessionInsert, SessionRow, SettingsPatch, SettingsRow, User,
    };
    use tokio::sync::Notify;

    fn insert_calls(remote: &MockRemote) -> usize {
        remote
            .calls()
            .iter()
            .filter(|c| matches!(c, RemoteCall::Insert(_)))
            .count()
    }

    #[tokio::test]
    async fn offline_sequence_loses_nothing() {
        let offline = OfflineHarness::memory(false).await;
        offline.record_all(&["a", "b", "c"]).await;

        expect_all(&[
            assert_queue_labels(&offline.queued().await, &["a", "b", "c"]),
            assert_no_loss(&["a", "b", "c"], &offline.delivered(), &offline.queued().await),
        ]);

        let online = offline.restart(true).await;
        assert_eq!(online.client.flush_pending_sessions().await, 3);

        expect_all(&[
            assert_delivered_in_order(&online.delivered(), &["a", "b", "c"]),
            assert_no_duplicates(&online.delivered()),
            assert_queue_labels(&online.queued().await, &[]),
        ]);
    }

    #[tokio::test]
    async fn recording_offline_makes_no_remote_calls() {
        let h = OfflineHarness::memory(false).await;

        let outcome = h
            .client
            .record_session(
                &NewSession::new("Reduce Anxiety", "4-6-breathing", 145)
                    .with_completed(true)
                    .with_hr_reduction(8),
            )
            .await
            .unwrap();

        assert_eq!(outcome, RecordOutcome::Queued { position: 0 });
        assert_eq!(h.queued().await.len(), 1);
        assert_eq!(h.remote.call_count(), 0);

        let listing = h.client.list_recent().await;
        assert_eq!(listing.source, ListingSource::Cache);
        assert_eq!(listing.sessions.len(), 1);
        let view = &listing.sessions[0];
        assert!(view.is_pending());
        assert_eq!(view.label, "Reduce Anxiety");
        assert_eq!(view.duration_seconds, 145);
        assert_eq!(view.estimated_hr_reduction, 8);
    }

    #[tokio::test]
    async fn flush_is_idempotent() {
        let offline = OfflineHarness::memory(false).await;
        offline.record_all(&["a", "b"]).await;
        let online = offline.restart(true).await;

        assert_eq!(online.client.flush_pending_sessions().await, 2);
        let inserts = insert_calls(&online.remote);

        assert_eq!(online.client.flush_pending_sessions().await, 0);
        assert_eq!(insert_calls(&online.remote), inserts);
        expect_all(&[assert_no_duplicates(&online.delivered())]);
    }

    #[tokio::test]
    async fn failed_insert_stays_queued() {
        let offline = OfflineHarness::memory(false).await;
        offline.record_all(&["a", "b", "c"]).await;
        let online = offline.restart(true).await;
        online.remote.fail_insert_attempt(2);

        assert_eq!(online.client.flush_pending_sessions().await, 2);
        expect_all(&[
            assert_queue_labels(&online.queued().await, &["b"]),
            assert_delivered_in_order(&online.delivered(), &["a", "c"]),
            assert_no_loss(&["a", "b", "c"], &online.delivered(), &online.queued().await),
        ]);

        assert_eq!(online.client.flush_pending_sessions().await, 1);
        expect_all(&[
            assert_queue_labels(&online.queued().await, &[]),
            assert_no_duplicates(&online.delivered()),
        ]);
        assert_eq!(online.delivered().len(), 3);
    }

    #[tokio::test]
    async fn unreachable_backend_keeps_whole_queue() {
        let offline = OfflineHarness::memory(false).await;
        offline.record_all(&["a", "b"]).await;
        let online = offline.restart(true).await;
        online.remote.set_unreachable(true);

        assert_eq!(online.client.flush_pending_sessions().await, 0);
        expect_all(&[assert_queue_labels(&online.queued().await, &["a", "b"])]);
    }

    #[tokio::test]
    async fn listing_after_flush_shows_each_session_once() {
        let offline = OfflineHarness::memory(false).await;
        offline.record_all(&["a"]).await;
        let online = offline.restart(true).await;
        online.client.flush_pending_sessions().await;

        let listing = online.client.list_recent().await;

        assert_eq!(listing.source, ListingSource::Remote);
        assert_eq!(listing.sessions.len(), 1);
        assert!(!listing.sessions[0].is_pending());
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_cached_page() {
        let h = OfflineHarness::memory(true).await;
        h.record_all(&["a", "b"]).await;
        h.remote.fail_next_fetch();

        let listing = h.client.list_recent().await;

        assert_eq!(listing.source, ListingSource::Cache);
        let labels: Vec<&str> = listing.sessions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn unreadable_queue_reads_as_empty() {
        let h = OfflineHarness::memory(false).await;
        let key = StoreKey::new(&owner(), Collection::PendingSessions).to_string();
        h.store.set(&key, "{not json").await.unwrap();

        assert_eq!(h.client.status().await.pending_sessions, 0);
        assert!(h.client.list_recent().await.sessions.is_empty());

        let outcome = h.client.record_session(&session("a")).await.unwrap();
        assert_eq!(outcome, RecordOutcome::Queued { position: 0 });
        expect_all(&[assert_queue_labels(&h.queued().await, &["a"])]);
    }

    /// Backend whose first insert parks until released.
    struct GatedRemote {
        inner: MockRemote,
        gated: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RemoteStore for GatedRemote {
        async fn insert_session(
            &self,
            owner: &OwnerId,
            row: &SessionInsert,
        ) -> Result<RowId, RemoteError> {
            if self.gated.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.insert_session(owner, row).await
        }

        async fn fetch_sessions(
            &self,
            owner: &OwnerId,
            limit: usize,
        ) -> Result<Vec<SessionRow>, RemoteError> {
            self.inner.fetch_sessions(owner, limit).await
        }

        async fn fetch_settings(&self, owner: &OwnerId) -> Result<Option<SettingsRow>, RemoteError> {
            self.inner.fetch_settings(owner).await
        }

        async fn update_settings(
            &self,
            owner: &OwnerId,
            patch: &SettingsPatch,
        ) -> Result<(), RemoteError> {
            self.inner.update_settings(owner, patch).await
        }

        async fn current_user(&self) -> Result<Option<User>, RemoteError> {
            self.inner.current_user().await
        }
    }

    #[tokio::test]
    async fn sessions_recorded_during_flush_survive() {
        let remote = Arc::new(GatedRemote {
            inner: MockRemote::with_user(user()),
            gated: AtomicBool::new(true),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let store = Arc::new(MemoryStore::new());
        let oracle = ConnectivityOracle::resolved(false);
        let client = Arc::new(SyncClient::new(
            remote.clone(),
            store,
            Arc::new(oracle.clone()),
            &SyncOptions::default(),
        ));
        client.set_user(Some(user())).await;
        client.record_session(&session("a")).await.unwrap();

        oracle.report(true);
        let flushing = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.flush_pending_sessions().await }
        });

        // Connection drops while "a" is in flight
        remote.entered.notified().await;
        oracle.report(false);
        let outcome = client.record_session(&session("b")).await.unwrap();
        assert!(outcome.is_queued());
        remote.release.notify_one();

        assert_eq!(flushing.await.unwrap(), 1);
        let queued = client.sessions().pending_count(&owner()).await;
        assert_eq!(queued, 1);
        let rows = remote.inner.rows_for(&owner());
        expect_all(&[assert_delivered_in_order(&rows, &["a"])]);
    }

    #[tokio::test]
    async fn session_recorded_after_wipe_during_flush_survives() {
        let remote = Arc::new(GatedRemote {
            inner: MockRemote::with_user(user()),
            gated: AtomicBool::new(true),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let oracle = ConnectivityOracle::resolved(false);
        let client = Arc::new(SyncClient::new(
            remote.clone(),
            Arc::clone(&store),
            Arc::new(oracle.clone()),
            &SyncOptions::default(),
        ));
        client.set_user(Some(user())).await;
        client.record_session(&session("old")).await.unwrap();

        oracle.report(true);
        let flushing = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.flush_pending_sessions().await }
        });

        // Wiped and recorded again while "old" is in flight
        remote.entered.notified().await;
        oracle.report(false);
        client.wipe_local().await.unwrap();
        client.record_session(&session("fresh")).await.unwrap();
        remote.release.notify_one();

        assert_eq!(flushing.await.unwrap(), 1);
        let queued = OfflineStore::new(store).pending_sessions(&owner()).await;
        expect_all(&[assert_queue_labels(queued.entries(), &["fresh"])]);
    }
}
