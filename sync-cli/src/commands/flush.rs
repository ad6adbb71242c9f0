//! Push queued sessions and settings to the backend.

use anyhow::{bail, Result};

use super::AppContext;

/// What a flush delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    /// Sessions delivered.
    pub sessions: usize,
    /// Whether a settings overlay was delivered.
    pub settings: bool,
}

/// Run the flush command.
pub async fn run(ctx: &AppContext) -> Result<FlushReport> {
    if ctx.offline {
        bail!("Cannot flush with --offline.");
    }
    ctx.require_user().await?;

    let sessions = ctx.client.flush_pending_sessions().await;
    let settings = ctx.client.flush_pending_settings().await;

    println!("Sessions synced: {}", sessions);
    if settings {
        println!("Settings synced.");
    }
    let status = ctx.client.status().await;
    if status.pending_sessions > 0 || status.pending_settings.is_some() {
        println!(
            "Still pending: {} session(s){}",
            status.pending_sessions,
            if status.pending_settings.is_some() {
                " and settings"
            } else {
                ""
            }
        );
    }
    Ok(FlushReport { sessions, settings })
}
