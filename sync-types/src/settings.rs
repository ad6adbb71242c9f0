//! Profile settings and partial updates.

use serde::{Deserialize, Serialize};

/// The full profile-settings record for one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettings {
    /// Reminder notifications on or off.
    pub notifications_enabled: bool,
    /// Heart-rate capture on or off.
    pub heart_rate_enabled: bool,
}

impl Default for ProfileSettings {
    /// Shape used when neither server nor cache has a record yet.
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            heart_rate_enabled: false,
        }
    }
}

impl ProfileSettings {
    /// Return a copy with every field set in `patch` replaced.
    pub fn with_patch(&self, patch: &SettingsPatch) -> Self {
        Self {
            notifications_enabled: patch
                .notifications_enabled
                .unwrap_or(self.notifications_enabled),
            heart_rate_enabled: patch.heart_rate_enabled.unwrap_or(self.heart_rate_enabled),
        }
    }
}

/// A partial settings record: only the fields that changed.
///
/// Serializes without the unset fields, so it can be sent as-is in a
/// partial update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    /// New value for `notifications_enabled`, if changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    /// New value for `heart_rate_enabled`, if changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_enabled: Option<bool>,
}

impl SettingsPatch {
    /// Patch that only sets `notifications_enabled`.
    pub fn notifications(enabled: bool) -> Self {
        Self {
            notifications_enabled: Some(enabled),
            ..Self::default()
        }
    }

    /// Patch that only sets `heart_rate_enabled`.
    pub fn heart_rate(enabled: bool) -> Self {
        Self {
            heart_rate_enabled: Some(enabled),
            ..Self::default()
        }
    }

    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        self.notifications_enabled.is_none() && self.heart_rate_enabled.is_none()
    }

    /// Fold `later` on top of this patch. Fields set in `later` win.
    pub fn merge(&mut self, later: &SettingsPatch) {
        if later.notifications_enabled.is_some() {
            self.notifications_enabled = later.notifications_enabled;
        }
        if later.heart_rate_enabled.is_some() {
            self.heart_rate_enabled = later.heart_rate_enabled;
        }
    }

    /// Non-mutating form of [`merge`](Self::merge).
    pub fn merged(mut self, later: &SettingsPatch) -> Self {
        self.merge(later);
        self
    }
}

/// Settings columns as stored remotely. Both columns are nullable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRow {
    /// Nullable `notifications_enabled` column.
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    /// Nullable `heart_rate_enabled` column.
    #[serde(default)]
    pub heart_rate_enabled: Option<bool>,
}

impl SettingsRow {
    /// Resolve nulls to the default shape.
    pub fn resolve(&self) -> ProfileSettings {
        let defaults = ProfileSettings::default();
        ProfileSettings {
            notifications_enabled: self
                .notifications_enabled
                .unwrap_or(defaults.notifications_enabled),
            heart_rate_enabled: self
                .heart_rate_enabled
                .unwrap_or(defaults.heart_rate_enabled),
        }
    }
}

impl From<ProfileSettings> for SettingsRow {
    fn from(settings: ProfileSettings) -> Self {
        Self {
            notifications_enabled: Some(settings.notifications_enabled),
            heart_rate_enabled: Some(settings.heart_rate_enabled),
        }
    }
}
