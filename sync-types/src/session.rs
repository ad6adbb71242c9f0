//! Breathing session records.
//!
//! A session moves through up to three shapes:
//! - [`NewSession`] - the fields a caller supplies when a session ends
//! - [`PendingSession`] - a queued record waiting for a flush (client timestamp)
//! - [`SessionRow`] - the server-authoritative row (server id and timestamp)
//!
//! Both queued and synced records are presented to the UI as [`SessionView`].
//! Records are immutable once created; there is no update shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ModelError;
use crate::ids::{OwnerId, RowId, SessionId};

/// Caller-supplied fields of a finished breathing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    /// Problem or protocol category shown to the user.
    pub label: String,
    /// Breathing pattern identifier.
    pub protocol: String,
    /// Wall-clock seconds spent in the session.
    pub duration_seconds: u32,
    /// Whether the session ran to its natural end.
    pub completed: bool,
    /// Derived heart-rate reduction estimate (not measured).
    pub estimated_hr_reduction: u32,
}

impl NewSession {
    /// Create a completed session with no heart-rate estimate.
    pub fn new(label: &str, protocol: &str, duration_seconds: u32) -> Self {
        Self {
            label: label.to_string(),
            protocol: protocol.to_string(),
            duration_seconds,
            completed: true,
            estimated_hr_reduction: 0,
        }
    }

    /// Set whether the session ran to completion.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Set the heart-rate reduction estimate.
    pub fn with_hr_reduction(mut self, estimate: u32) -> Self {
        self.estimated_hr_reduction = estimate;
        self
    }

    /// Check that the text fields are present.
    ///
    /// Label and protocol are free text, but blank values are rejected
    /// because they have nothing to display.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.label.trim().is_empty() {
            return Err(ModelError::EmptyField("label"));
        }
        if self.protocol.trim().is_empty() {
            return Err(ModelError::EmptyField("protocol"));
        }
        Ok(())
    }
}

/// Row payload sent to the backend on insert.
///
/// The server assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInsert {
    /// Owner of the row.
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    /// Problem or protocol category.
    #[serde(rename = "problem_title")]
    pub label: String,
    /// Breathing pattern identifier.
    pub protocol: String,
    /// Session length in seconds.
    pub duration_seconds: u32,
    /// Whether the session ran to its natural end.
    pub completed: bool,
    /// Heart-rate reduction estimate.
    pub estimated_hr_reduction: u32,
}

impl SessionInsert {
    /// Build an insert payload for `owner`.
    pub fn new(owner: &OwnerId, session: &NewSession) -> Self {
        Self {
            owner: owner.clone(),
            label: session.label.clone(),
            protocol: session.protocol.clone(),
            duration_seconds: session.duration_seconds,
            completed: session.completed,
            estimated_hr_reduction: session.estimated_hr_reduction,
        }
    }
}

/// A session accepted locally but not yet confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSession {
    /// Owner of the record.
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    /// Problem or protocol category.
    #[serde(rename = "problem_title")]
    pub label: String,
    /// Breathing pattern identifier.
    pub protocol: String,
    /// Session length in seconds.
    pub duration_seconds: u32,
    /// Whether the session ran to its natural end.
    pub completed: bool,
    /// Heart-rate reduction estimate.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub estimated_hr_reduction: u32,
    /// Client clock at enqueue time.
    pub created_at: DateTime<Utc>,
}

impl PendingSession {
    /// Stamp a new session for the queue.
    pub fn new(owner: &OwnerId, session: &NewSession, created_at: DateTime<Utc>) -> Self {
        Self {
            owner: owner.clone(),
            label: session.label.clone(),
            protocol: session.protocol.clone(),
            duration_seconds: session.duration_seconds,
            completed: session.completed,
            estimated_hr_reduction: session.estimated_hr_reduction,
            created_at,
        }
    }

    /// Insert payload for delivering this record. The client timestamp is
    /// not sent; the server stamps its own.
    pub fn to_insert(&self) -> SessionInsert {
        SessionInsert {
            owner: self.owner.clone(),
            label: self.label.clone(),
            protocol: self.protocol.clone(),
            duration_seconds: self.duration_seconds,
            completed: self.completed,
            estimated_hr_reduction: self.estimated_hr_reduction,
        }
    }

    /// Display form, with a synthetic id from the queue position.
    pub fn to_view(&self, index: usize) -> SessionView {
        SessionView {
            id: SessionId::Local {
                index,
                created_at: self.created_at,
            },
            created_at: self.created_at,
            label: self.label.clone(),
            protocol: self.protocol.clone(),
            duration_seconds: self.duration_seconds,
            completed: self.completed,
            estimated_hr_reduction: self.estimated_hr_reduction,
        }
    }
}

/// A server-authoritative session row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRow {
    /// Server-assigned id.
    pub id: RowId,
    /// Owner of the row.
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    /// Problem or protocol category.
    #[serde(rename = "problem_title")]
    pub label: String,
    /// Breathing pattern identifier.
    #[serde(default)]
    pub protocol: String,
    /// Session length in seconds.
    pub duration_seconds: u32,
    /// Whether the session ran to its natural end.
    pub completed: bool,
    /// Heart-rate reduction estimate (nullable server-side).
    #[serde(default, deserialize_with = "null_as_zero")]
    pub estimated_hr_reduction: u32,
    /// Server clock at insert time.
    pub created_at: DateTime<Utc>,
}

impl SessionRow {
    /// Display form.
    pub fn to_view(&self) -> SessionView {
        SessionView {
            id: SessionId::Remote(self.id.clone()),
            created_at: self.created_at,
            label: self.label.clone(),
            protocol: self.protocol.clone(),
            duration_seconds: self.duration_seconds,
            completed: self.completed,
            estimated_hr_reduction: self.estimated_hr_reduction,
        }
    }
}

/// A session as presented to the UI, whether queued or synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// Server id, or synthetic id for queued records.
    pub id: SessionId,
    /// Creation time (client clock for queued, server clock for synced).
    pub created_at: DateTime<Utc>,
    /// Problem or protocol category.
    pub label: String,
    /// Breathing pattern identifier.
    pub protocol: String,
    /// Session length in seconds.
    pub duration_seconds: u32,
    /// Whether the session ran to its natural end.
    pub completed: bool,
    /// Heart-rate reduction estimate.
    pub estimated_hr_reduction: u32,
}

impl SessionView {
    /// Check if this entry has not reached the backend yet.
    pub fn is_pending(&self) -> bool {
        self.id.is_local()
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}
