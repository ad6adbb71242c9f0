//! Client error type.

use sync_types::ModelError;
use thiserror::Error;

use crate::remote::RemoteError;
use crate::store::StorageError;

/// Errors surfaced by the sync engines and [`SyncClient`](crate::SyncClient).
///
/// Only direct writes return these. Reads degrade to cached data and
/// background flushes log and retry later.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No user is signed in.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A direct remote write failed.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A local write failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Caller input was rejected.
    #[error("invalid input: {0}")]
    Invalid(#[from] ModelError),
}
