//! Connectivity oracle for breathsync.
//!
//! The platform bridge feeds reachability reports in through
//! [`ConnectivityOracle::report`]; the sync engines ask [`Connectivity::is_online`]
//! before choosing between a direct write and the local queue, and the
//! reconnect coordinator subscribes with [`Connectivity::on_change`].
//!
//! Before the first report the oracle is *unresolved*: the display status
//! reads as online (no offline flash at startup), while `is_online` waits a
//! bounded time and then reports offline so a write never blocks on it.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;

/// Callback invoked with every reported state.
pub type Listener = Arc<dyn Fn(bool) + Send + Sync>;

/// Source of reachability information.
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Last reported state, `true` while unresolved.
    fn current_status(&self) -> bool;

    /// Last reported state, `None` while unresolved.
    fn resolved_status(&self) -> Option<bool>;

    /// Wait (bounded) for a first report and return it; offline on timeout.
    async fn is_online(&self) -> bool;

    /// Register `listener` for every subsequent report.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    fn on_change(&self, listener: Listener) -> Subscription;
}

/// Handle for a registered listener.
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap the action that unregisters a listener.
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unregister the listener now.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Default time `is_online` waits for a first report.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Report-driven [`Connectivity`] implementation.
///
/// Clones share state: the platform bridge keeps one handle to report on,
/// the engines and the coordinator hold others.
#[derive(Clone)]
pub struct ConnectivityOracle {
    inner: Arc<OracleInner>,
}

struct OracleInner {
    status: watch::Sender<Option<bool>>,
    listeners: DashMap<u64, Listener>,
    next_id: AtomicU64,
    resolve_timeout: Duration,
}

impl ConnectivityOracle {
    /// Create an unresolved oracle.
    pub fn new(resolve_timeout: Duration) -> Self {
        let (status, _) = watch::channel(None);
        Self {
            inner: Arc::new(OracleInner {
                status,
                listeners: DashMap::new(),
                next_id: AtomicU64::new(0),
                resolve_timeout,
            }),
        }
    }

    /// Create an oracle that already reports `online`.
    pub fn resolved(online: bool) -> Self {
        let oracle = Self::new(DEFAULT_RESOLVE_TIMEOUT);
        oracle.inner.status.send_replace(Some(online));
        oracle
    }

    /// Feed a platform report. Listeners are called for every report,
    /// including repeats of the current state.
    pub fn report(&self, online: bool) {
        let previous = self.inner.status.send_replace(Some(online));
        tracing::debug!(online, ?previous, "connectivity report");

        // Snapshot first so a listener may (un)subscribe without deadlocking
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for listener in listeners {
            listener(online);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

impl Default for ConnectivityOracle {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLVE_TIMEOUT)
    }
}

#[async_trait]
impl Connectivity for ConnectivityOracle {
    fn current_status(&self) -> bool {
        self.resolved_status().unwrap_or(true)
    }

    fn resolved_status(&self) -> Option<bool> {
        *self.inner.status.borrow()
    }

    async fn is_online(&self) -> bool {
        let mut rx = self.inner.status.subscribe();
        let waited =
            tokio::time::timeout(self.inner.resolve_timeout, rx.wait_for(Option::is_some)).await;
        let resolved = match waited {
            Ok(Ok(status)) => *status,
            _ => None,
        };
        if resolved.is_none() {
            tracing::debug!("connectivity unresolved, treating as offline");
        }
        resolved.unwrap_or(false)
    }

    fn on_change(&self, listener: Listener) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.insert(id, listener);

        let weak: Weak<OracleInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.remove(&id);
            }
        })
    }
}
