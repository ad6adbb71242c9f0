//! Identity types for breathsync.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;

/// Opaque reference to the authenticated user that owns a record.
///
/// Every stored collection and every remote row is scoped by an owner.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an OwnerId, rejecting empty or whitespace-only values.
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModelError::EmptyOwner);
        }
        Ok(Self(id))
    }

    /// Get the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

/// Server-assigned identifier of a synced row.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Wrap a server-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowId({})", self.0)
    }
}

/// Identifier shown for a session in listings.
///
/// Synced sessions carry their server id. Queued sessions get a synthetic id
/// built from their queue position and enqueue timestamp. Synthetic ids are
/// for display only: they shift when the queue is compacted by a flush and
/// must not be persisted as keys.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum SessionId {
    /// Server-assigned id of a synced row.
    Remote(RowId),
    /// Synthetic id of a queued, not yet synced record.
    Local {
        /// Position in the pending queue at listing time.
        index: usize,
        /// Client timestamp taken at enqueue.
        created_at: DateTime<Utc>,
    },
}

impl SessionId {
    /// Check if this id belongs to a queued record.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(id) => write!(f, "{}", id),
            Self::Local { index, created_at } => write!(
                f,
                "local_{}_{}",
                index,
                created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
        }
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self)
    }
}

/// The currently authenticated user, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Owner id used to scope all records.
    pub id: OwnerId,
    /// Account email.
    pub email: String,
}
