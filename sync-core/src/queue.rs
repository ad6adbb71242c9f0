//! Pending session queue for breathsync.
//!
//! This module provides the queue of sessions recorded while offline:
//! - FIFO ordering for delivery
//! - Append-only from the UI side
//! - Flush settlement that keeps failures in order and never drops entries
//!   appended while a flush was in flight
//!
//! The queue is persisted by sync-client as a whole value. A flush reads a
//! snapshot, attempts each entry, then writes back the result of
//! [`FlushBatch::settle`] in a single replace.

use sync_types::{PendingSession, SessionView};

/// Ordered sessions not yet acknowledged by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingQueue {
    entries: Vec<PendingSession>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from persisted entries, keeping their order.
    pub fn from_entries(entries: Vec<PendingSession>) -> Self {
        Self { entries }
    }

    /// Append a session and return its position.
    pub fn push(&mut self, entry: PendingSession) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Number of queued sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued sessions in enqueue order.
    pub fn entries(&self) -> &[PendingSession] {
        &self.entries
    }

    /// Consume the queue for persistence.
    pub fn into_entries(self) -> Vec<PendingSession> {
        self.entries
    }

    /// Display form of every entry, ids derived from queue position.
    pub fn views(&self) -> Vec<SessionView> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_view(index))
            .collect()
    }
}

/// Bookkeeping for one pass over a queue snapshot.
///
/// Feed each attempt outcome in snapshot order, then call [`settle`](Self::settle)
/// with the queue as it is stored at the end of the pass.
///
/// `generation` counts owner wipes. A batch started before a wipe no longer
/// owns the stored queue and must not put its failures back.
#[derive(Debug)]
pub struct FlushBatch {
    snapshot: Vec<PendingSession>,
    generation: u64,
    delivered: Vec<PendingSession>,
    failed: Vec<PendingSession>,
}

impl FlushBatch {
    /// Start a pass over `snapshot`, taken at wipe generation `generation`.
    pub fn new(snapshot: &PendingQueue, generation: u64) -> Self {
        Self {
            snapshot: snapshot.entries().to_vec(),
            generation,
            delivered: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Record a delivered entry. It is not carried into the new queue.
    pub fn delivered(&mut self, entry: PendingSession) {
        self.delivered.push(entry);
    }

    /// Record an entry that failed delivery. It is retained, in order.
    pub fn failed(&mut self, entry: PendingSession) {
        self.failed.push(entry);
    }

    /// Number of outcomes recorded so far.
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    /// Build the replacement queue.
    ///
    /// `current` is the stored queue at settle time and `generation` the
    /// wipe generation at settle time. While the snapshot is still the
    /// stored prefix, the result is the failures followed by everything
    /// appended during the pass. Otherwise the queue was replaced under the
    /// pass: `current` is kept as stored, minus the entries this pass
    /// delivered.
    pub fn settle(self, current: PendingQueue, generation: u64) -> FlushSettlement {
        let synced = self.delivered.len();
        let mut current = current.into_entries();

        if generation == self.generation && current.starts_with(&self.snapshot) {
            let mut survivors = self.failed;
            let retained = survivors.len();
            survivors.extend(current.drain(self.snapshot.len()..));
            return FlushSettlement {
                queue: PendingQueue::from_entries(survivors),
                synced,
                retained,
            };
        }

        for sent in &self.delivered {
            if let Some(pos) = current.iter().position(|e| e == sent) {
                current.remove(pos);
            }
        }
        let retained = self.failed.iter().filter(|e| current.contains(e)).count();
        FlushSettlement {
            queue: PendingQueue::from_entries(current),
            synced,
            retained,
        }
    }
}

/// Result of settling a flush pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushSettlement {
    /// The queue to store in place of the old one.
    pub queue: PendingQueue,
    /// Entries delivered during the pass.
    pub synced: usize,
    /// Entries from the snapshot kept for a later pass.
    pub retained: usize,
}
