//! HTTP backend speaking a PostgREST-style API.
//!
//! Rows live in two tables: `breathing_sessions` (insert/select) and
//! `profiles` (select/patch the settings columns). The current user comes
//! from the auth service.

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use sync_types::{OwnerId, RowId, SessionInsert, SessionRow, SettingsPatch, SettingsRow, User};

use super::{RemoteError, RemoteStore};
use crate::config::{ConfigError, RemoteConfig};

const SESSIONS_PATH: &str = "rest/v1/breathing_sessions";
const PROFILES_PATH: &str = "rest/v1/profiles";
const USER_PATH: &str = "auth/v1/user";
const AUTH_SETTINGS_PATH: &str = "auth/v1/settings";
const SETTINGS_COLUMNS: &str = "notifications_enabled,heart_rate_enabled";

/// Validate `config` and build a ready backend client.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] when the URL or anon key is unset or
/// blank, and [`ConfigError::InvalidUrl`] when the URL does not parse as an
/// http(s) URL.
pub fn connect(config: &RemoteConfig) -> Result<RestRemote, ConfigError> {
    let raw_url = config
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(ConfigError::Missing("remote.url"))?;
    let anon_key = config
        .anon_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::Missing("remote.anon_key"))?;

    let base = normalize_base(raw_url)?;

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let http = builder.build()?;

    tracing::debug!(url = %base, "remote backend configured");
    Ok(RestRemote {
        http,
        base,
        anon_key: anon_key.to_string(),
        access_token: config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    })
}

fn normalize_base(raw: &str) -> Result<Url, ConfigError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    Ok(url)
}

/// Reachability of the configured backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// URL and anon key are present.
    pub configured: bool,
    /// The auth service answered.
    pub auth: bool,
    /// The database API answered.
    pub db: bool,
    /// First problem found, if any.
    pub error: Option<String>,
}

impl ConnectionStatus {
    /// Check if every probe passed.
    pub fn is_ready(&self) -> bool {
        self.configured && self.auth && self.db
    }

    /// Status for a configuration that could not produce a client.
    pub fn unconfigured(error: &ConfigError) -> Self {
        Self {
            configured: false,
            auth: false,
            db: false,
            error: Some(error.to_string()),
        }
    }
}

/// Backend client over HTTP.
#[derive(Clone)]
pub struct RestRemote {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for RestRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestRemote")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: RowId,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl RestRemote {
    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|e| RemoteError::Unreachable(format!("bad endpoint {}: {}", path, e)))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder, RemoteError> {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        Ok(self
            .http
            .request(method, self.endpoint(path)?)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer))
    }

    /// Probe the auth service, then the database API.
    pub async fn health_check(&self) -> ConnectionStatus {
        let mut status = ConnectionStatus {
            configured: true,
            auth: false,
            db: false,
            error: None,
        };

        let auth = match self.request(reqwest::Method::GET, AUTH_SETTINGS_PATH) {
            Ok(req) => send(req).await,
            Err(e) => Err(e),
        };
        if let Err(e) = auth {
            status.error = Some(format!("auth unreachable: {}", e));
            return status;
        }
        status.auth = true;

        let db = match self.request(reqwest::Method::GET, PROFILES_PATH) {
            Ok(req) => send(req.query(&[("select", "id"), ("limit", "1")])).await,
            Err(e) => Err(e),
        };
        match db {
            Ok(_) => status.db = true,
            Err(e) => status.error = Some(format!("database unreachable: {}", e)),
        }
        status
    }
}

/// Send a request and map transport failures and error statuses.
async fn send(req: reqwest::RequestBuilder) -> Result<Response, RemoteError> {
    let resp = req
        .send()
        .await
        .map_err(|e| RemoteError::Unreachable(e.to_string()))?;
    check_status(resp).await
}

async fn check_status(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(RemoteError::Unauthorized);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::Http {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    resp.json::<T>()
        .await
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

fn owner_filter(owner: &OwnerId) -> String {
    format!("eq.{}", owner)
}

#[async_trait]
impl RemoteStore for RestRemote {
    async fn insert_session(
        &self,
        _owner: &OwnerId,
        row: &SessionInsert,
    ) -> Result<RowId, RemoteError> {
        let req = self
            .request(reqwest::Method::POST, SESSIONS_PATH)?
            .header("Prefer", "return=representation")
            .json(row);
        let rows: Vec<InsertedRow> = decode(send(req).await?).await?;
        rows.into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| RemoteError::Decode("insert returned no rows".to_string()))
    }

    async fn fetch_sessions(
        &self,
        owner: &OwnerId,
        limit: usize,
    ) -> Result<Vec<SessionRow>, RemoteError> {
        let req = self.request(reqwest::Method::GET, SESSIONS_PATH)?.query(&[
            ("select", "*".to_string()),
            ("user_id", owner_filter(owner)),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ]);
        decode(send(req).await?).await
    }

    async fn fetch_settings(&self, owner: &OwnerId) -> Result<Option<SettingsRow>, RemoteError> {
        let req = self
            .request(reqwest::Method::GET, PROFILES_PATH)?
            .query(&[("id", owner_filter(owner)), ("select", SETTINGS_COLUMNS.to_string())]);
        let rows: Vec<SettingsRow> = decode(send(req).await?).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_settings(
        &self,
        owner: &OwnerId,
        patch: &SettingsPatch,
    ) -> Result<(), RemoteError> {
        let req = self
            .request(reqwest::Method::PATCH, PROFILES_PATH)?
            .query(&[("id", owner_filter(owner))])
            .json(patch);
        send(req).await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, RemoteError> {
        if self.access_token.is_none() {
            return Ok(None);
        }
        let req = self.request(reqwest::Method::GET, USER_PATH)?;
        let resp = match send(req).await {
            Ok(resp) => resp,
            Err(RemoteError::Unauthorized) => return Ok(None),
            Err(e) => return Err(e),
        };
        let user: AuthUser = decode(resp).await?;
        let id = OwnerId::new(user.id)
            .map_err(|e| RemoteError::Decode(format!("user id: {}", e)))?;
        Ok(Some(User {
            id,
            email: user.email.unwrap_or_default(),
        }))
    }
}
