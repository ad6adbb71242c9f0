//! Settings overlay state machine for breathsync.
//!
//! Settings changes made while offline accumulate in a single pending patch
//! (the overlay) rather than a queue. The overlay moves through two states:
//!
//! ```text
//! Clean --stage(patch)--> Dirty(overlay) --stage(patch)--> Dirty(overlay ∪ patch)
//!   ^                          |
//!   +----acknowledge(sent)-----+
//! ```
//!
//! `acknowledge` is only called after the backend accepted a write. It clears
//! the overlay fields whose value equals what was sent; a field staged again
//! while the write was in flight stays pending. While dirty, overlay fields
//! win over cached and server values.

use sync_types::{ProfileSettings, SettingsPatch};

/// Pending-update state for one owner's settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingsState {
    /// No local changes awaiting the backend.
    #[default]
    Clean,
    /// Local changes not yet confirmed by the backend.
    Dirty(SettingsPatch),
}

impl SettingsState {
    /// Rebuild from the persisted overlay. An empty patch counts as clean.
    pub fn from_stored(overlay: Option<SettingsPatch>) -> Self {
        match overlay {
            Some(patch) if !patch.is_empty() => Self::Dirty(patch),
            _ => Self::Clean,
        }
    }

    /// Value to persist: `None` means the overlay key should be removed.
    pub fn to_stored(&self) -> Option<SettingsPatch> {
        self.overlay().copied()
    }

    /// The pending overlay, if any.
    pub fn overlay(&self) -> Option<&SettingsPatch> {
        match self {
            Self::Clean => None,
            Self::Dirty(patch) => Some(patch),
        }
    }

    /// Check if there are unconfirmed changes.
    pub fn is_dirty(&self) -> bool {
        matches!(self, Self::Dirty(_))
    }

    /// Accumulate a local change into the overlay.
    pub fn stage(self, patch: &SettingsPatch) -> Self {
        match self {
            Self::Clean if patch.is_empty() => Self::Clean,
            Self::Clean => Self::Dirty(*patch),
            Self::Dirty(overlay) => Self::Dirty(overlay.merged(patch)),
        }
    }

    /// The backend accepted `sent`. Drop every overlay field it covers.
    pub fn acknowledge(self, sent: &SettingsPatch) -> Self {
        let Self::Dirty(mut overlay) = self else {
            return Self::Clean;
        };
        if sent.notifications_enabled.is_some()
            && overlay.notifications_enabled == sent.notifications_enabled
        {
            overlay.notifications_enabled = None;
        }
        if sent.heart_rate_enabled.is_some() && overlay.heart_rate_enabled == sent.heart_rate_enabled
        {
            overlay.heart_rate_enabled = None;
        }
        Self::from_stored(Some(overlay))
    }

    /// Current settings as the UI should see them.
    pub fn present(&self, base: &ProfileSettings) -> ProfileSettings {
        match self {
            Self::Clean => *base,
            Self::Dirty(overlay) => base.with_patch(overlay),
        }
    }

    /// Patch to send for a direct write of `patch`.
    ///
    /// Carries the whole overlay along, so that a successful write makes
    /// every pending field authoritative and `acknowledge` loses nothing.
    pub fn outgoing(&self, patch: &SettingsPatch) -> SettingsPatch {
        match self {
            Self::Clean => *patch,
            Self::Dirty(overlay) => overlay.merged(patch),
        }
    }
}
