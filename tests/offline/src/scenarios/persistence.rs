//! Restart scenarios over the durable stores.
//!
//! The app is "killed" by dropping the harness and its store handle, then
//! relaunched over a store reopened from the same path.

#[cfg(test)]
mod tests {
    use crate::assertions::{assert_delivered_in_order, assert_queue_labels, expect_all};
    use crate::harness::{session, OfflineHarness};
    use std::sync::Arc;
    use sync_client::{FileStore, LocalStore, SqliteStore};
    use sync_types::{OwnerId, SettingsPatch};
    use tempfile::tempdir;

    async fn queue_survives_restart(
        first: Arc<dyn LocalStore>,
        reopen: impl std::future::Future<Output = Arc<dyn LocalStore>>,
    ) {
        let h = OfflineHarness::with_store(first, false).await;
        h.record_all(&["a", "b"]).await;
        h.client
            .update_settings(&SettingsPatch::notifications(false))
            .await
            .unwrap();
        let remote = h.remote.clone();
        drop(h);

        let relaunched = OfflineHarness::relaunch(remote, reopen.await, true).await;

        let status = relaunched.client.status().await;
        assert_eq!(status.pending_sessions, 2);
        assert_eq!(
            status.pending_settings,
            Some(SettingsPatch::notifications(false))
        );

        assert_eq!(relaunched.client.flush_pending_sessions().await, 2);
        assert!(relaunched.client.flush_pending_settings().await);
        expect_all(&[
            assert_delivered_in_order(&relaunched.delivered(), &["a", "b"]),
            assert_queue_labels(&relaunched.queued().await, &[]),
        ]);
    }

    #[tokio::test]
    async fn file_store_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offline");
        let first: Arc<dyn LocalStore> = Arc::new(FileStore::open(&path).await.unwrap());

        queue_survives_restart(first, async {
            Arc::new(FileStore::open(&path).await.unwrap()) as Arc<dyn LocalStore>
        })
        .await;
    }

    #[tokio::test]
    async fn sqlite_store_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offline.db");
        let first: Arc<dyn LocalStore> = Arc::new(SqliteStore::open(&path).await.unwrap());

        queue_survives_restart(first, async {
            Arc::new(SqliteStore::open(&path).await.unwrap()) as Arc<dyn LocalStore>
        })
        .await;
    }

    #[tokio::test]
    async fn wipe_only_touches_current_owner() {
        let dir = tempdir().unwrap();
        let store: Arc<dyn LocalStore> =
            Arc::new(FileStore::open(&dir.path().join("offline")).await.unwrap());
        let h = OfflineHarness::with_store(store, false).await;
        h.record_all(&["mine"]).await;

        let other = OwnerId::new("u2").unwrap();
        let offline = h.offline_store();
        offline
            .append_pending_session(
                &other,
                sync_types::PendingSession::new(&other, &session("theirs"), chrono::Utc::now()),
            )
            .await
            .unwrap();

        h.client.wipe_local().await.unwrap();

        assert!(h.queued().await.is_empty());
        assert_eq!(offline.pending_sessions(&other).await.len(), 1);
    }
}
