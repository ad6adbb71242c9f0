//! Remote backend abstraction for breathsync.
//!
//! This module provides the seam between the sync engines and the hosted
//! backend (a PostgREST-style HTTP API, or a mock for testing).
//!
//! # Design
//!
//! The trait speaks in typed rows, never raw HTTP:
//! - `insert_session()` appends one row and returns its server id
//! - `fetch_sessions()` returns the newest rows for an owner
//! - `fetch_settings()` / `update_settings()` read and patch the profile
//! - `current_user()` resolves the authenticated user
//!
//! Every failure is a [`RemoteError`]; the engines decide whether it means
//! "queue locally" or "fall back to cache".

mod mock;
mod rest;

pub use mock::{MockRemote, RemoteCall};
pub use rest::{connect, ConnectionStatus, RestRemote};

use async_trait::async_trait;
use sync_types::{OwnerId, RowId, SessionInsert, SessionRow, SettingsPatch, SettingsRow, User};
use thiserror::Error;

/// Remote backend errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The backend could not be reached (DNS, connect, timeout).
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, for logs.
        body: String,
    },

    /// Credentials were missing or rejected.
    #[error("not authorized")]
    Unauthorized,

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Trait for the hosted backend holding the authoritative records.
///
/// Implementations must not retry internally: a failed call is reported and
/// the caller decides whether to queue.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert one session row. The server assigns id and timestamp.
    async fn insert_session(
        &self,
        owner: &OwnerId,
        row: &SessionInsert,
    ) -> Result<RowId, RemoteError>;

    /// Fetch up to `limit` rows for `owner`, newest first.
    async fn fetch_sessions(
        &self,
        owner: &OwnerId,
        limit: usize,
    ) -> Result<Vec<SessionRow>, RemoteError>;

    /// Fetch the settings columns of `owner`'s profile, if the profile exists.
    async fn fetch_settings(&self, owner: &OwnerId) -> Result<Option<SettingsRow>, RemoteError>;

    /// Apply a partial update to `owner`'s profile.
    async fn update_settings(
        &self,
        owner: &OwnerId,
        patch: &SettingsPatch,
    ) -> Result<(), RemoteError>;

    /// The authenticated user, or `None` when signed out.
    async fn current_user(&self) -> Result<Option<User>, RemoteError>;
}
