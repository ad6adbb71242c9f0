//! Link state machine for breathsync.
//!
//! This module tracks the last observed connectivity state and decides when
//! pending writes must be flushed. It is edge-triggered: only a move into
//! `Online` from `Unresolved` or `Offline` produces flush actions, and repeated
//! reports of the same state produce nothing.
//!
//! The actual flushing is performed by sync-client, not by this module.

/// Last observed connectivity - NO I/O, just transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkState {
    /// No connectivity report seen yet.
    #[default]
    Unresolved,
    /// Last report said the device is offline.
    Offline,
    /// Last report said the device is online.
    Online,
}

impl LinkState {
    /// Create a new state machine in the Unresolved state.
    pub fn new() -> Self {
        Self::Unresolved
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (sync-client)
    /// is responsible for executing the returned actions, in order.
    pub fn on_event(self, event: Event) -> (Self, Vec<Action>) {
        match (self, event) {
            (Self::Unresolved | Self::Offline, Event::Online) => (
                Self::Online,
                vec![Action::FlushSessions, Action::FlushSettings],
            ),
            (_, Event::Offline) => (Self::Offline, vec![]),
            // Repeated online report
            (Self::Online, Event::Online) => (Self::Online, vec![]),
        }
    }

    /// Check if the last report was online.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    /// Check if any report has been seen.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// A connectivity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The platform reports the network reachable.
    Online,
    /// The platform reports the network unreachable.
    Offline,
}

impl From<bool> for Event {
    fn from(reachable: bool) -> Self {
        if reachable {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

/// Actions to be executed by sync-client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Deliver the pending session queue.
    FlushSessions,
    /// Deliver the pending settings overlay.
    FlushSettings,
}
