//! Mock remote backend for testing.
//!
//! Keeps rows in memory, records every call, and can be told to fail.

use super::{RemoteError, RemoteStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use sync_types::{OwnerId, RowId, SessionInsert, SessionRow, SettingsPatch, SettingsRow, User};

/// A call observed by [`MockRemote`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `insert_session` with the row label.
    Insert(String),
    /// `fetch_sessions` with the requested limit.
    FetchSessions(usize),
    /// `fetch_settings`.
    FetchSettings,
    /// `update_settings` with the patch sent.
    UpdateSettings(SettingsPatch),
    /// `current_user`.
    CurrentUser,
}

/// Mock remote backend for testing.
///
/// Clones share state, so a test can keep a handle while the engines own
/// another. Updating a missing profile creates it.
#[derive(Debug, Default, Clone)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    rows: Vec<SessionRow>,
    settings: HashMap<OwnerId, SettingsRow>,
    user: Option<User>,
    unreachable: bool,
    calls: Vec<RemoteCall>,
    insert_attempts: usize,
    failing_inserts: HashSet<usize>,
    fail_next_fetch: bool,
    fail_next_settings_fetch: bool,
    fail_next_settings_update: bool,
    server_clock: Option<DateTime<Utc>>,
}

impl MockRemote {
    /// Create an empty mock backend with no signed-in user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock backend with `user` signed in.
    pub fn with_user(user: User) -> Self {
        let remote = Self::new();
        remote.set_user(Some(user));
        remote
    }

    /// Sign a user in (or out with `None`).
    pub fn set_user(&self, user: Option<User>) {
        self.inner.lock().unwrap().user = user;
    }

    /// Make every call fail as unreachable until cleared.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unwrap().unreachable = unreachable;
    }

    /// Fail the `n`-th insert from now (1-based).
    pub fn fail_insert_attempt(&self, n: usize) {
        let mut inner = self.inner.lock().unwrap();
        let attempt = inner.insert_attempts + n;
        inner.failing_inserts.insert(attempt);
    }

    /// Cause the next `fetch_sessions()` to fail.
    pub fn fail_next_fetch(&self) {
        self.inner.lock().unwrap().fail_next_fetch = true;
    }

    /// Cause the next `fetch_settings()` to fail.
    pub fn fail_next_settings_fetch(&self) {
        self.inner.lock().unwrap().fail_next_settings_fetch = true;
    }

    /// Cause the next `update_settings()` to fail.
    pub fn fail_next_settings_update(&self) {
        self.inner.lock().unwrap().fail_next_settings_update = true;
    }

    /// Stamp inserts from a fixed clock that advances one second per insert.
    pub fn set_server_clock(&self, start: DateTime<Utc>) {
        self.inner.lock().unwrap().server_clock = Some(start);
    }

    /// Add an already-synced row.
    pub fn seed_session(&self, row: SessionRow) {
        self.inner.lock().unwrap().rows.push(row);
    }

    /// Set the stored profile settings for `owner`.
    pub fn seed_settings(&self, owner: &OwnerId, row: SettingsRow) {
        self.inner
            .lock()
            .unwrap()
            .settings
            .insert(owner.clone(), row);
    }

    /// Stored rows for `owner`, newest first.
    pub fn rows_for(&self, owner: &OwnerId) -> Vec<SessionRow> {
        let inner = self.inner.lock().unwrap();
        newest_rows(&inner.rows, owner, usize::MAX)
    }

    /// Stored profile settings for `owner`.
    pub fn settings_for(&self, owner: &OwnerId) -> Option<SettingsRow> {
        self.inner.lock().unwrap().settings.get(owner).copied()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    /// Forget recorded calls (stored data is kept).
    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }
}

impl MockRemoteInner {
    fn check_reachable(&self) -> Result<(), RemoteError> {
        if self.unreachable {
            return Err(RemoteError::Unreachable("mock offline".to_string()));
        }
        Ok(())
    }

    fn next_timestamp(&mut self) -> DateTime<Utc> {
        match self.server_clock {
            Some(now) => {
                self.server_clock = Some(now + Duration::seconds(1));
                now
            }
            None => Utc::now(),
        }
    }
}

fn newest_rows(rows: &[SessionRow], owner: &OwnerId, limit: usize) -> Vec<SessionRow> {
    let mut out: Vec<SessionRow> = rows.iter().filter(|r| &r.owner == owner).cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out.truncate(limit);
    out
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn insert_session(
        &self,
        owner: &OwnerId,
        row: &SessionInsert,
    ) -> Result<RowId, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::Insert(row.label.clone()));
        inner.check_reachable()?;

        inner.insert_attempts += 1;
        let attempt = inner.insert_attempts;
        if inner.failing_inserts.remove(&attempt) {
            return Err(RemoteError::Http {
                status: 503,
                body: format!("insert attempt {} rejected", attempt),
            });
        }

        let id = RowId::new(uuid::Uuid::new_v4().to_string());
        let created_at = inner.next_timestamp();
        inner.rows.push(SessionRow {
            id: id.clone(),
            owner: owner.clone(),
            label: row.label.clone(),
            protocol: row.protocol.clone(),
            duration_seconds: row.duration_seconds,
            completed: row.completed,
            estimated_hr_reduction: row.estimated_hr_reduction,
            created_at,
        });
        Ok(id)
    }

    async fn fetch_sessions(
        &self,
        owner: &OwnerId,
        limit: usize,
    ) -> Result<Vec<SessionRow>, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::FetchSessions(limit));
        inner.check_reachable()?;

        if std::mem::take(&mut inner.fail_next_fetch) {
            return Err(RemoteError::Unreachable("fetch failed".to_string()));
        }
        Ok(newest_rows(&inner.rows, owner, limit))
    }

    async fn fetch_settings(&self, owner: &OwnerId) -> Result<Option<SettingsRow>, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::FetchSettings);
        inner.check_reachable()?;

        if std::mem::take(&mut inner.fail_next_settings_fetch) {
            return Err(RemoteError::Unreachable("settings fetch failed".to_string()));
        }
        Ok(inner.settings.get(owner).copied())
    }

    async fn update_settings(
        &self,
        owner: &OwnerId,
        patch: &SettingsPatch,
    ) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::UpdateSettings(*patch));
        inner.check_reachable()?;

        if std::mem::take(&mut inner.fail_next_settings_update) {
            return Err(RemoteError::Http {
                status: 500,
                body: "update rejected".to_string(),
            });
        }

        let row = inner.settings.entry(owner.clone()).or_default();
        if patch.notifications_enabled.is_some() {
            row.notifications_enabled = patch.notifications_enabled;
        }
        if patch.heart_rate_enabled.is_some() {
            row.heart_rate_enabled = patch.heart_rate_enabled;
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::CurrentUser);
        inner.check_reachable()?;
        Ok(inner.user.clone())
    }
}
