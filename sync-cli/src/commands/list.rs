//! List recent sessions.

use anyhow::Result;
use chrono::Local;
use sync_client::{ListingSource, SessionListing};
use sync_types::SessionView;

use super::AppContext;

/// Run the list command.
pub async fn run(ctx: &AppContext, limit: usize) -> Result<SessionListing> {
    ctx.require_user().await?;

    let listing = ctx.client.list_sessions(limit).await;
    let source = match listing.source {
        ListingSource::Remote => "live",
        ListingSource::Cache => "cached",
    };
    println!(
        "=== {} sessions ({}, {} pending) ===",
        listing.sessions.len(),
        source,
        listing.pending()
    );
    for session in &listing.sessions {
        println!("{}", format_row(session));
    }
    Ok(listing)
}

/// One output line: pending marker, local time, label, protocol, duration.
fn format_row(session: &SessionView) -> String {
    let marker = if session.is_pending() { "*" } else { " " };
    let status = if session.completed { "" } else { " (stopped early)" };
    let hr = if session.estimated_hr_reduction > 0 {
        format!(" -{} bpm", session.estimated_hr_reduction)
    } else {
        String::new()
    };
    format!(
        "{} {}  {:<24} {:<16} {}{}{}",
        marker,
        session
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M"),
        session.label,
        session.protocol,
        format_duration(session.duration_seconds),
        hr,
        status
    )
}

/// Format seconds as `m:ss`.
fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
