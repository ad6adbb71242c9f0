//! # sync-client
//!
//! Offline-first sync for the breathing app.
//!
//! This is the library the app links to record sessions and change profile
//! settings whether or not the device is online.
//!
//! ## Features
//!
//! - **Durable Local Queue**: sessions recorded offline survive restarts
//!   (file or SQLite backend) and are delivered in order on reconnect
//! - **Merged Reads**: listings show queued and synced sessions together,
//!   newest first, falling back to the last cached page
//! - **Settings Overlay**: offline setting changes win locally until the
//!   backend confirms them
//! - **Edge-Triggered Reconnect**: one flush per offline→online transition
//! - **Pluggable Backends**: `RemoteStore` (REST, mock) and `LocalStore`
//!   (file, SQLite, memory) traits
//! - **Pure State Machines**: queue, overlay and link logic live in sync-core
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sync_client::{connect, open_store, ClientConfig, ConnectivityOracle, SyncClient};
//!
//! let mut config = ClientConfig::from_file("breathsync.toml".as_ref())?;
//! config.apply_env();
//!
//! let remote = connect(&config.remote)?;
//! let store = open_store(&config.storage, data_dir).await?;
//! let oracle = ConnectivityOracle::new(config.sync.connectivity_timeout());
//! let client = Arc::new(SyncClient::new(
//!     Arc::new(remote),
//!     store,
//!     Arc::new(oracle.clone()),
//!     &config.sync,
//! ));
//! let _reconnect = client.start_reconnect();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod error;
pub mod remote;
pub mod sessions;
pub mod settings;
pub mod store;

pub use client::{SyncClient, SyncStatus};
pub use config::{ClientConfig, ConfigError, RemoteConfig, StorageBackend, StorageConfig, SyncOptions};
pub use connectivity::{Connectivity, ConnectivityOracle, Listener, Subscription};
pub use coordinator::{CoordinatorHandle, FlushTarget, ReconnectCoordinator};
pub use error::ClientError;
pub use remote::{
    connect, ConnectionStatus, MockRemote, RemoteCall, RemoteError, RemoteStore, RestRemote,
};
pub use sessions::{ListingSource, RecordOutcome, SessionListing, SessionSync};
pub use settings::{SettingsSync, SettingsWrite};
pub use store::{
    open_store, FileStore, LocalStore, MemoryStore, OfflineStore, SqliteStore, StorageError,
};
