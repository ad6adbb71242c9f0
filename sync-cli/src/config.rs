//! Configuration management for breathsync-cli.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sync_client::ClientConfig;
use sync_types::{OwnerId, User};

/// Config file looked up in the data directory when `--config` is not given.
pub const CONFIG_FILE: &str = "breathsync.toml";

const USER_FILE: &str = "user.json";

/// Load the client configuration and apply environment overrides.
///
/// An explicit `path` must exist. Without one, `{data_dir}/breathsync.toml`
/// is read if present, otherwise defaults are used.
pub fn load_client_config(data_dir: &Path, path: Option<&Path>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => {
            let default_path = data_dir.join(CONFIG_FILE);
            if default_path.exists() {
                ClientConfig::from_file(&default_path)?
            } else {
                ClientConfig::default()
            }
        }
    };
    config.apply_env();
    Ok(config)
}

/// Last signed-in user, kept so offline commands know their owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedUser {
    /// Owner id.
    pub id: String,
    /// Email shown in status output.
    #[serde(default)]
    pub email: String,
}

impl SavedUser {
    /// Build from a resolved user.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
        }
    }

    /// Convert back, rejecting a blank id.
    pub fn to_user(&self) -> Result<User> {
        Ok(User {
            id: OwnerId::new(self.id.clone()).context("Saved user has an empty id")?,
            email: self.email.clone(),
        })
    }

    /// Load the saved user from a directory, if any.
    pub async fn load(data_dir: &Path) -> Result<Option<Self>> {
        let path = data_dir.join(USER_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let user = serde_json::from_str(&contents).context("Invalid saved user")?;
                Ok(Some(user))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read saved user"),
        }
    }

    /// Save the user to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(USER_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save user")?;
        set_file_permissions_0600(&path).await?;
        Ok(())
    }

    /// Forget the saved user.
    pub async fn clear(data_dir: &Path) -> Result<()> {
        match tokio::fs::remove_file(data_dir.join(USER_FILE)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove saved user"),
        }
    }
}

/// Get the default data directory for breathsync.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("app", "breathsync", "breathsync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
