//! Error types for the breathsync data model.

use thiserror::Error;

/// Errors raised while building model values from caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Owner id was empty.
    #[error("owner id must not be empty")]
    EmptyOwner,

    /// A required text field was empty.
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
}
