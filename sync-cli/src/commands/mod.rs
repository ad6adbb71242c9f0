//! CLI command implementations.

pub mod flush;
pub mod list;
pub mod record;
pub mod settings;
pub mod status;
pub mod wipe;

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sync_client::{connect, open_store, ClientConfig, ConnectivityOracle, RestRemote, SyncClient};
use sync_types::{OwnerId, User};

use crate::config::SavedUser;

/// Everything a command needs: the client plus CLI-level state.
pub struct AppContext {
    /// The sync client.
    pub client: Arc<SyncClient>,
    /// REST backend, for health checks (absent in tests).
    pub remote: Option<RestRemote>,
    /// Data directory holding the local store and saved user.
    pub data_dir: PathBuf,
    /// Whether `--offline` was given.
    pub offline: bool,
}

impl AppContext {
    /// Build the client from configuration.
    ///
    /// Connectivity is resolved up front: offline with `--offline`, online
    /// otherwise. `user` (from `--user`) or the saved user seeds the owner
    /// for offline use.
    pub async fn open(
        data_dir: &Path,
        config: &ClientConfig,
        offline: bool,
        user: Option<&str>,
    ) -> Result<Self> {
        let remote = connect(&config.remote).context(
            "Backend not configured. Set BREATHSYNC_REMOTE_URL and BREATHSYNC_ANON_KEY or use --config.",
        )?;
        let store = open_store(&config.storage, data_dir)
            .await
            .context("Failed to open local store")?;

        let oracle = ConnectivityOracle::new(config.sync.connectivity_timeout());
        oracle.report(!offline);

        let client = Arc::new(SyncClient::new(
            Arc::new(remote.clone()),
            store,
            Arc::new(oracle),
            &config.sync,
        ));

        let seeded = match user {
            Some(id) => Some(User {
                id: OwnerId::new(id).context("--user must not be empty")?,
                email: String::new(),
            }),
            None => match SavedUser::load(data_dir).await? {
                Some(saved) => Some(saved.to_user()?),
                None => None,
            },
        };
        client.set_user(seeded).await;

        Ok(Self {
            client,
            remote: Some(remote),
            data_dir: data_dir.to_path_buf(),
            offline,
        })
    }

    /// Wrap an existing client.
    #[cfg(test)]
    pub fn with_client(client: Arc<SyncClient>, data_dir: &Path, offline: bool) -> Self {
        Self {
            client,
            remote: None,
            data_dir: data_dir.to_path_buf(),
            offline,
        }
    }

    /// The signed-in user, remembered for later offline runs.
    pub async fn require_user(&self) -> Result<User> {
        let user = self.client.current_user().await.ok_or_else(|| {
            anyhow!("Not signed in. Set BREATHSYNC_ACCESS_TOKEN, or pass --user when offline.")
        })?;
        if !self.offline {
            SavedUser::from_user(&user).save(&self.data_dir).await?;
        }
        Ok(user)
    }
}
