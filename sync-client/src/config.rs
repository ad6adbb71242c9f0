//! Configuration loading for breathsync.
//!
//! Configuration is loaded from a TOML file, then selected fields are
//! overridden from the environment (`BREATHSYNC_REMOTE_URL`,
//! `BREATHSYNC_ANON_KEY`, `BREATHSYNC_ACCESS_TOKEN`).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `remote.url`.
pub const ENV_REMOTE_URL: &str = "BREATHSYNC_REMOTE_URL";
/// Environment variable overriding `remote.anon_key`.
pub const ENV_ANON_KEY: &str = "BREATHSYNC_ANON_KEY";
/// Environment variable overriding `remote.access_token`.
pub const ENV_ACCESS_TOKEN: &str = "BREATHSYNC_ACCESS_TOKEN";

/// Root configuration for a breathsync client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Remote backend configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Local storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Sync engine tuning.
    #[serde(default)]
    pub sync: SyncOptions,
}

/// Remote backend configuration.
#[derive(Clone, Default, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the backend project.
    pub url: Option<String>,
    /// Public (anon) API key sent with every request.
    pub anon_key: Option<String>,
    /// User access token; requests fall back to the anon key without one.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds (default: transport default).
    pub request_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Which [`LocalStore`](crate::store::LocalStore) backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-lifetime only.
    Memory,
    /// One JSON file per key.
    #[default]
    File,
    /// SQLite database.
    Sqlite,
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Backend kind (default: file).
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory (file) or database path (sqlite), relative to the data dir.
    pub path: Option<PathBuf>,
}

/// Sync engine tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncOptions {
    /// Rows fetched to refresh the session cache (default: 50, at least 1).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// How long `is_online` waits for a first connectivity report (default: 2000ms).
    #[serde(default = "default_connectivity_timeout_ms")]
    pub connectivity_timeout_ms: u64,
}

impl SyncOptions {
    /// Connectivity resolution timeout as a [`Duration`].
    pub fn connectivity_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity_timeout_ms)
    }

    /// Reject values the engines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "sync.page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            connectivity_timeout_ms: default_connectivity_timeout_ms(),
        }
    }
}

// Default value functions
fn default_page_size() -> usize {
    50
}

fn default_connectivity_timeout_ms() -> u64 {
    2000
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// unusable value.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.sync.validate()?;
        Ok(config)
    }

    /// Override remote fields from `lookup`. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_REMOTE_URL) {
            self.remote.url = Some(url);
        }
        if let Some(key) = get(ENV_ANON_KEY) {
            self.remote.anon_key = Some(key);
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.remote.access_token = Some(token);
        }
    }

    /// Override remote fields from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is present but unusable.
    #[error("invalid configuration value {field}: {reason}")]
    Invalid {
        /// Dotted name of the offending key.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// A required value is not set.
    #[error("missing configuration value: {0}")]
    Missing(&'static str),
    /// The backend URL is not usable.
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}
