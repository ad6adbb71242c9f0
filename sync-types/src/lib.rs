//! # sync-types
//!
//! Data model for the breathsync offline-first sync layer.
//!
//! This crate provides the foundational types used across all breathsync crates:
//! - [`OwnerId`], [`RowId`], [`SessionId`], [`User`] - Identity types
//! - [`NewSession`], [`PendingSession`], [`SessionRow`], [`SessionView`] - Session records
//! - [`ProfileSettings`], [`SettingsPatch`], [`SettingsRow`] - Profile settings
//! - [`ModelError`] - Validation errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod session;
mod settings;

pub use error::ModelError;
pub use ids::{OwnerId, RowId, SessionId, User};
pub use session::{NewSession, PendingSession, SessionInsert, SessionRow, SessionView};
pub use settings::{ProfileSettings, SettingsPatch, SettingsRow};
