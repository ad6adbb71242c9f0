//! # offline-scenarios
//!
//! Scenario tests for breathsync under loss of connectivity.
//!
//! Every scenario runs the real engines against [`sync_client::MockRemote`]
//! and a real [`sync_client::LocalStore`], flipping a
//! [`sync_client::ConnectivityOracle`] to simulate the network:
//! - Queueing while offline and delivery on reconnect
//! - Partial flush failures and writes racing a flush
//! - Settings overlays surviving failed writes
//! - Restarts over durable backends

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assertions;
pub mod harness;

pub mod scenarios;
