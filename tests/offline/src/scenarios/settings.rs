//! Settings overlay scenarios.

#[cfg(test)]
mod tests {
    use crate::harness::{owner, OfflineHarness};
    use sync_client::{RemoteCall, SettingsWrite};
    use sync_types::{ProfileSettings, SettingsPatch, SettingsRow};

    fn server_row(notifications: bool, heart_rate: bool) -> SettingsRow {
        SettingsRow {
            notifications_enabled: Some(notifications),
            heart_rate_enabled: Some(heart_rate),
        }
    }

    #[tokio::test]
    async fn offline_change_wins_over_server_until_flushed() {
        let h = OfflineHarness::memory(true).await;
        h.remote.seed_settings(&owner(), server_row(true, false));
        assert_eq!(
            h.client.get_settings().await,
            Some(ProfileSettings {
                notifications_enabled: true,
                heart_rate_enabled: false,
            })
        );

        h.go_offline();
        let write = h
            .client
            .update_settings(&SettingsPatch::heart_rate(true))
            .await
            .unwrap();
        assert_eq!(write, SettingsWrite::Pending);

        let expected = ProfileSettings {
            notifications_enabled: true,
            heart_rate_enabled: true,
        };
        assert_eq!(h.client.get_settings().await, Some(expected));

        // Server still has the old value; the overlay keeps winning
        h.go_online();
        assert_eq!(h.client.get_settings().await, Some(expected));

        assert!(h.client.flush_pending_settings().await);
        assert_eq!(h.remote.settings_for(&owner()), Some(server_row(true, true)));
        assert_eq!(h.client.status().await.pending_settings, None);
    }

    #[tokio::test]
    async fn failed_online_write_stays_pending() {
        let h = OfflineHarness::memory(true).await;
        h.remote.seed_settings(&owner(), server_row(true, true));
        h.remote.fail_next_settings_update();

        let write = h
            .client
            .update_settings(&SettingsPatch::notifications(false))
            .await
            .unwrap();

        assert_eq!(write, SettingsWrite::Pending);
        assert_eq!(
            h.client.status().await.pending_settings,
            Some(SettingsPatch::notifications(false))
        );
        assert_eq!(
            h.client.get_settings().await.map(|s| s.notifications_enabled),
            Some(false)
        );

        assert!(h.client.flush_pending_settings().await);
        assert_eq!(h.remote.settings_for(&owner()), Some(server_row(false, true)));
        assert!(!h.client.settings().is_dirty(&owner()).await);
    }

    #[tokio::test]
    async fn online_write_carries_pending_overlay() {
        let h = OfflineHarness::memory(false).await;
        h.client
            .update_settings(&SettingsPatch::heart_rate(true))
            .await
            .unwrap();

        h.go_online();
        h.remote.clear_calls();
        let write = h
            .client
            .update_settings(&SettingsPatch::notifications(false))
            .await
            .unwrap();

        assert_eq!(write, SettingsWrite::Applied);
        let sent = SettingsPatch {
            notifications_enabled: Some(false),
            heart_rate_enabled: Some(true),
        };
        assert!(h.remote.calls().contains(&RemoteCall::UpdateSettings(sent)));
        assert_eq!(h.remote.settings_for(&owner()), Some(server_row(false, true)));
        assert_eq!(h.client.status().await.pending_settings, None);
    }

    #[tokio::test]
    async fn later_offline_change_to_same_field_wins() {
        let h = OfflineHarness::memory(false).await;
        for enabled in [true, false, true, false] {
            h.client
                .update_settings(&SettingsPatch::notifications(enabled))
                .await
                .unwrap();
        }

        assert_eq!(
            h.client.status().await.pending_settings,
            Some(SettingsPatch::notifications(false))
        );
    }

    #[tokio::test]
    async fn failed_flush_keeps_overlay() {
        let h = OfflineHarness::memory(false).await;
        h.client
            .update_settings(&SettingsPatch::heart_rate(false))
            .await
            .unwrap();

        h.go_online();
        h.remote.fail_next_settings_update();
        assert!(!h.client.flush_pending_settings().await);
        assert_eq!(
            h.client.status().await.pending_settings,
            Some(SettingsPatch::heart_rate(false))
        );

        assert!(h.client.flush_pending_settings().await);
        assert_eq!(h.client.status().await.pending_settings, None);
    }

    #[tokio::test]
    async fn empty_change_does_nothing() {
        let h = OfflineHarness::memory(true).await;

        let write = h
            .client
            .update_settings(&SettingsPatch::default())
            .await
            .unwrap();

        assert_eq!(write, SettingsWrite::Unchanged);
        assert!(!h
            .remote
            .calls()
            .iter()
            .any(|c| matches!(c, RemoteCall::UpdateSettings(_))));
    }
}
