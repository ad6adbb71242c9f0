//! Reconnection coordinator.
//!
//! Interprets the pure [`LinkState`] machine from sync-core: every move into
//! online (from unresolved or offline) flushes pending sessions, then the
//! pending settings overlay. Repeated reports of the same state do nothing.
//!
//! ```text
//! Connectivity ──report──▶ channel ──▶ coordinator task ──▶ FlushTarget
//!                                          │
//!                                   sync-core LinkState
//! ```
//!
//! Reports are forwarded through an unbounded channel into a single task,
//! so flushes never overlap and arrive in report order.

use async_trait::async_trait;
use std::sync::Arc;
use sync_core::{Action, Event, LinkState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::connectivity::{Connectivity, Subscription};

/// Something that can drain pending writes for the current owner.
#[async_trait]
pub trait FlushTarget: Send + Sync {
    /// Flush queued sessions, returning how many were delivered.
    async fn flush_sessions(&self) -> usize;

    /// Flush the settings overlay, returning whether one was delivered.
    async fn flush_settings(&self) -> bool;
}

/// Drives flushes from connectivity reports.
pub struct ReconnectCoordinator {
    target: Arc<dyn FlushTarget>,
    state: LinkState,
}

impl ReconnectCoordinator {
    /// Create a coordinator in the unresolved state.
    pub fn new(target: Arc<dyn FlushTarget>) -> Self {
        Self {
            target,
            state: LinkState::new(),
        }
    }

    /// Last observed link state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Apply one report and run the resulting flushes, in order.
    pub async fn handle_report(&mut self, online: bool) -> Vec<Action> {
        let (next, actions) = self.state.on_event(Event::from(online));
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "link state changed");
        }
        self.state = next;

        for action in &actions {
            match action {
                Action::FlushSessions => {
                    let synced = self.target.flush_sessions().await;
                    tracing::info!(synced, "reconnect: sessions flushed");
                }
                Action::FlushSettings => {
                    let delivered = self.target.flush_settings().await;
                    tracing::info!(delivered, "reconnect: settings flushed");
                }
            }
        }
        actions
    }

    /// Subscribe to `connectivity` and run the coordinator on a tokio task.
    ///
    /// An already resolved state is handled first, so a coordinator started
    /// while online flushes what was left from a previous run.
    pub fn spawn(self, connectivity: Arc<dyn Connectivity>) -> CoordinatorHandle {
        let (tx, mut rx) = mpsc::unbounded_channel::<bool>();
        let subscription = connectivity.on_change(Arc::new(move |online| {
            // Closed only after shutdown
            let _ = tx.send(online);
        }));
        let initial = connectivity.resolved_status();

        let task = tokio::spawn(async move {
            let mut coordinator = self;
            if let Some(online) = initial {
                coordinator.handle_report(online).await;
            }
            while let Some(online) = rx.recv().await {
                coordinator.handle_report(online).await;
            }
            tracing::debug!("reconnect coordinator stopped");
        });

        CoordinatorHandle {
            subscription: Some(subscription),
            task,
        }
    }
}

/// Running coordinator.
///
/// Dropping the handle unsubscribes; the task then finishes the reports
/// already queued and exits.
#[derive(Debug)]
pub struct CoordinatorHandle {
    subscription: Option<Subscription>,
    task: JoinHandle<()>,
}

impl CoordinatorHandle {
    /// Stop listening, let queued reports (and any running flush) finish,
    /// and wait for the task to exit.
    pub async fn shutdown(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Err(e) = (&mut self.task).await {
            tracing::error!(error = %e, "reconnect coordinator task failed");
        }
    }

    /// Stop immediately, abandoning queued reports.
    pub fn abort(mut self) {
        drop(self.subscription.take());
        self.task.abort();
    }

    /// Check if the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
