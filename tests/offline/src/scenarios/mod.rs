//! Offline scenarios, grouped by concern:
//!
//! - `sessions` - queueing, flushing, partial failures, corrupt queues
//! - `settings` - overlay precedence and failed writes
//! - `reconnect` - edge-triggered flushes through the coordinator
//! - `persistence` - restarts over the file and SQLite stores

pub mod persistence;
pub mod reconnect;
pub mod sessions;
pub mod settings;
