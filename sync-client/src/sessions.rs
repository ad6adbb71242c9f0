//! Session sync engine.
//!
//! Records breathing sessions either straight to the backend (online) or
//! into the owner's pending queue (offline), lists the merged view of both,
//! and drains the queue when connectivity returns.
//!
//! # Locking
//!
//! Two per-engine locks, never held across each other's critical path:
//! - `flush_lock` serializes flushes (held for the whole pass, including
//!   network I/O)
//! - `queue_lock` guards the local read-modify-write of the stored queue
//!   (append, owner wipe, and the final settle of a flush); never held
//!   across network I/O. It also holds the wipe generation, so a flush that
//!   started before a wipe settles against the wiped queue correctly

use chrono::Utc;
use std::sync::Arc;
use sync_core::{newest_first, FlushBatch};
use sync_types::{NewSession, OwnerId, PendingSession, RowId, SessionInsert, SessionRow, SessionView};
use tokio::sync::Mutex;

use crate::connectivity::Connectivity;
use crate::error::ClientError;
use crate::remote::RemoteStore;
use crate::store::OfflineStore;

/// Outcome of [`SessionSync::record_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Inserted remotely; carries the server id.
    Synced(RowId),
    /// Queued locally at `position` for a later flush.
    Queued {
        /// Position in the pending queue.
        position: usize,
    },
}

impl RecordOutcome {
    /// Check if the record is waiting in the local queue.
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }
}

/// Where the synced part of a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    /// A fresh fetch from the backend.
    Remote,
    /// The last cached page (offline, or the fetch failed).
    Cache,
}

/// Result of [`SessionSync::list_sessions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListing {
    /// Pending and synced sessions, newest first.
    pub sessions: Vec<SessionView>,
    /// Freshness of the synced part.
    pub source: ListingSource,
}

impl SessionListing {
    /// Number of entries not yet on the backend.
    pub fn pending(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_pending()).count()
    }
}

/// Offline-first engine for session records.
pub struct SessionSync {
    remote: Arc<dyn RemoteStore>,
    offline: OfflineStore,
    connectivity: Arc<dyn Connectivity>,
    page_size: usize,
    flush_lock: Mutex<()>,
    queue_lock: Mutex<u64>,
}

impl SessionSync {
    /// Create an engine. `page_size` bounds the cached session page.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        offline: OfflineStore,
        connectivity: Arc<dyn Connectivity>,
        page_size: usize,
    ) -> Self {
        Self {
            remote,
            offline,
            connectivity,
            page_size,
            flush_lock: Mutex::new(()),
            queue_lock: Mutex::new(0),
        }
    }

    /// Record a finished session.
    ///
    /// Online, the row is inserted directly and an insert failure is
    /// returned as-is (nothing is queued). Offline, the session is appended
    /// to the pending queue without any network I/O.
    pub async fn record_session(
        &self,
        owner: &OwnerId,
        session: &NewSession,
    ) -> Result<RecordOutcome, ClientError> {
        session.validate()?;

        if self.connectivity.is_online().await {
            let insert = SessionInsert::new(owner, session);
            let id = self.remote.insert_session(owner, &insert).await?;
            tracing::debug!(%owner, row = %id, "session inserted");
            self.refresh_cache(owner).await;
            return Ok(RecordOutcome::Synced(id));
        }

        let entry = PendingSession::new(owner, session, Utc::now());
        let position = {
            let _queue = self.queue_lock.lock().await;
            self.offline.append_pending_session(owner, entry).await?
        };
        tracing::info!(%owner, position, "session queued offline");
        Ok(RecordOutcome::Queued { position })
    }

    /// List up to `limit` sessions, queued ones included, newest first.
    ///
    /// Never fails: a failed fetch falls back to the cached page.
    pub async fn list_sessions(&self, owner: &OwnerId, limit: usize) -> SessionListing {
        // An empty page must not overwrite the cache.
        if limit == 0 {
            return SessionListing {
                sessions: Vec::new(),
                source: ListingSource::Cache,
            };
        }

        let pending = self.offline.pending_sessions(owner).await.views();

        if self.connectivity.is_online().await {
            match self.remote.fetch_sessions(owner, limit).await {
                Ok(rows) => {
                    if let Err(e) = self.offline.set_cached_sessions(owner, &rows).await {
                        tracing::warn!(%owner, error = %e, "failed to cache session page");
                    }
                    let synced = rows.iter().map(SessionRow::to_view).collect();
                    return SessionListing {
                        sessions: newest_first(pending, synced, limit),
                        source: ListingSource::Remote,
                    };
                }
                Err(e) => {
                    tracing::warn!(%owner, error = %e, "session fetch failed, using cache");
                }
            }
        }

        let cached = self
            .offline
            .cached_sessions(owner)
            .await
            .iter()
            .map(SessionRow::to_view)
            .collect();
        SessionListing {
            sessions: newest_first(pending, cached, limit),
            source: ListingSource::Cache,
        }
    }

    /// Deliver the pending queue in order and return how many were inserted.
    ///
    /// Failed entries stay queued in their original order, followed by any
    /// entries recorded while the pass was running. The session cache is
    /// not refreshed.
    pub async fn flush_pending_sessions(&self, owner: &OwnerId) -> Result<usize, ClientError> {
        let _flush = self.flush_lock.lock().await;

        let (snapshot, generation) = {
            let generation = self.queue_lock.lock().await;
            (self.offline.pending_sessions(owner).await, *generation)
        };
        if snapshot.is_empty() {
            return Ok(0);
        }

        let mut batch = FlushBatch::new(&snapshot, generation);
        for entry in snapshot.into_entries() {
            match self.remote.insert_session(owner, &entry.to_insert()).await {
                Ok(id) => {
                    tracing::debug!(%owner, row = %id, "queued session delivered");
                    batch.delivered(entry);
                }
                Err(e) => {
                    tracing::warn!(%owner, label = %entry.label, error = %e, "flush insert failed, keeping entry");
                    batch.failed(entry);
                }
            }
        }

        let settlement = {
            let generation = self.queue_lock.lock().await;
            let current = self.offline.pending_sessions(owner).await;
            let settlement = batch.settle(current, *generation);
            self.offline
                .replace_pending_sessions(owner, &settlement.queue)
                .await?;
            settlement
        };

        tracing::info!(
            %owner,
            synced = settlement.synced,
            retained = settlement.retained,
            remaining = settlement.queue.len(),
            "pending sessions flushed"
        );
        Ok(settlement.synced)
    }

    /// Remove every locally stored record for `owner`.
    ///
    /// Runs under the queue lock and bumps the wipe generation, so a flush
    /// in flight never restores wiped entries or drops sessions recorded
    /// after the wipe.
    pub async fn wipe_owner(&self, owner: &OwnerId) -> Result<(), ClientError> {
        let mut generation = self.queue_lock.lock().await;
        self.offline.wipe_owner(owner).await?;
        *generation += 1;
        tracing::info!(%owner, generation = *generation, "local data wiped");
        Ok(())
    }

    /// Number of sessions waiting for a flush.
    pub async fn pending_count(&self, owner: &OwnerId) -> usize {
        self.offline.pending_sessions(owner).await.len()
    }

    async fn refresh_cache(&self, owner: &OwnerId) {
        match self.remote.fetch_sessions(owner, self.page_size).await {
            Ok(rows) => {
                if let Err(e) = self.offline.set_cached_sessions(owner, &rows).await {
                    tracing::warn!(%owner, error = %e, "failed to cache session page");
                }
            }
            Err(e) => {
                tracing::warn!(%owner, error = %e, "session refetch after insert failed");
            }
        }
    }
}
