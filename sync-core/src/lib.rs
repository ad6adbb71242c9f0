//! # sync-core
//!
//! Pure logic for breathsync (no I/O, instant tests).
//!
//! This crate implements the state machines and algorithms of the offline
//! sync layer without any network or disk I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects:
//! - [`queue`] - pending session queue and flush settlement
//! - [`merge`] - newest-first merge of queued and synced sessions
//! - [`overlay`] - settings overlay (`Clean` / `Dirty`) transitions
//! - [`link`] - edge-triggered connectivity state machine
//!
//! The actual I/O (remote backend, local storage) is performed by
//! `sync-client`, which interprets the values produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod link;
pub mod merge;
pub mod overlay;
pub mod queue;

pub use link::{Action, Event, LinkState};
pub use merge::newest_first;
pub use overlay::SettingsState;
pub use queue::{FlushBatch, FlushSettlement, PendingQueue};
