//! Reconnection scenarios driven through the coordinator.

#[cfg(test)]
mod tests {
    use crate::assertions::{assert_delivered_in_order, assert_no_duplicates, expect_all};
    use crate::harness::{owner, OfflineHarness};
    use std::sync::Arc;
    use std::time::Duration;
    use sync_client::{MemoryStore, RecordOutcome, RemoteCall, SettingsWrite};
    use sync_types::{SettingsPatch, SettingsRow};

    fn insert_calls(h: &OfflineHarness) -> usize {
        h.remote
            .calls()
            .iter()
            .filter(|c| matches!(c, RemoteCall::Insert(_)))
            .count()
    }

    #[tokio::test]
    async fn reconnect_delivers_queue_then_settings() {
        let h = OfflineHarness::memory(false).await;
        h.record_all(&["a", "b"]).await;
        h.client
            .update_settings(&SettingsPatch::heart_rate(true))
            .await
            .unwrap();

        let reconnect = h.start_reconnect();
        h.go_online();
        reconnect.shutdown().await;

        expect_all(&[
            assert_delivered_in_order(&h.delivered(), &["a", "b"]),
            assert_no_duplicates(&h.delivered()),
        ]);
        assert_eq!(
            h.remote.settings_for(&owner()),
            Some(SettingsRow {
                notifications_enabled: None,
                heart_rate_enabled: Some(true),
            })
        );

        let calls = h.remote.calls();
        let last_insert = calls
            .iter()
            .rposition(|c| matches!(c, RemoteCall::Insert(_)))
            .unwrap();
        let update = calls
            .iter()
            .position(|c| matches!(c, RemoteCall::UpdateSettings(_)))
            .unwrap();
        assert!(last_insert < update, "sessions flush before settings");
    }

    #[tokio::test]
    async fn repeated_online_reports_flush_once_per_transition() {
        let h = OfflineHarness::memory(false).await;
        h.record_all(&["a"]).await;
        let reconnect = h.start_reconnect();

        h.go_online();
        h.go_online();
        h.go_offline();
        h.record_all(&["b"]).await;
        h.go_online();
        reconnect.shutdown().await;

        expect_all(&[
            assert_delivered_in_order(&h.delivered(), &["a", "b"]),
            assert_no_duplicates(&h.delivered()),
        ]);
        assert_eq!(insert_calls(&h), 2);
        assert!(h.queued().await.is_empty());
    }

    #[tokio::test]
    async fn coordinator_started_online_drains_previous_run() {
        let offline = OfflineHarness::memory(false).await;
        offline.record_all(&["a", "b", "c"]).await;

        let online = offline.restart(true).await;
        online.start_reconnect().shutdown().await;

        assert_eq!(online.delivered().len(), 3);
        assert!(online.queued().await.is_empty());
    }

    #[tokio::test]
    async fn unresolved_connectivity_queues_then_flushes() {
        let h = OfflineHarness::unresolved(Arc::new(MemoryStore::new()), Duration::from_millis(20))
            .await;

        let outcome = h
            .client
            .record_session(&crate::harness::session("a"))
            .await
            .unwrap();
        assert!(outcome.is_queued());

        let reconnect = h.start_reconnect();
        h.go_online();
        reconnect.shutdown().await;

        assert_eq!(h.delivered().len(), 1);
    }

    #[tokio::test]
    async fn stopped_coordinator_ignores_reconnects() {
        let h = OfflineHarness::memory(false).await;
        h.start_reconnect().shutdown().await;

        h.record_all(&["a"]).await;
        h.go_online();
        tokio::task::yield_now().await;

        assert_eq!(h.queued().await.len(), 1);
        assert_eq!(h.oracle.listener_count(), 0);
    }

    #[tokio::test]
    async fn writes_while_online_skip_the_queue() {
        let h = OfflineHarness::memory(true).await;
        let reconnect = h.start_reconnect();

        let outcome = h
            .client
            .record_session(&crate::harness::session("a"))
            .await
            .unwrap();
        assert!(matches!(outcome, RecordOutcome::Synced(_)));
        let write = h
            .client
            .update_settings(&SettingsPatch::notifications(true))
            .await
            .unwrap();
        assert_eq!(write, SettingsWrite::Applied);

        reconnect.shutdown().await;
        assert_eq!(insert_calls(&h), 1);
        assert!(h.queued().await.is_empty());
    }
}
