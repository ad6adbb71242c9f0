//! Show sync state and backend health.

use anyhow::Result;
use sync_client::{ConnectionStatus, SyncStatus};

use super::AppContext;

fn check(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "unreachable"
    }
}

/// Run the status command.
pub async fn run(ctx: &AppContext) -> Result<SyncStatus> {
    let status = ctx.client.status().await;

    println!("=== breathsync status ===");
    println!("Data dir: {}", ctx.data_dir.display());
    println!(
        "Mode:     {}",
        if ctx.offline {
            "offline (forced)"
        } else if status.online {
            "online"
        } else {
            "offline"
        }
    );
    match &status.user {
        Some(user) if user.email.is_empty() => println!("User:     {}", user.id),
        Some(user) => println!("User:     {} <{}>", user.id, user.email),
        None => println!("User:     not signed in"),
    }
    println!("Pending sessions: {}", status.pending_sessions);
    match &status.pending_settings {
        Some(patch) => {
            let mut fields = Vec::new();
            if let Some(enabled) = patch.notifications_enabled {
                fields.push(format!("notifications={}", enabled));
            }
            if let Some(enabled) = patch.heart_rate_enabled {
                fields.push(format!("heart_rate={}", enabled));
            }
            println!("Pending settings: {}", fields.join(", "));
        }
        None => println!("Pending settings: none"),
    }

    if !ctx.offline {
        if let Some(remote) = &ctx.remote {
            print_health(&remote.health_check().await);
        }
    }
    Ok(status)
}

/// Print the result of a backend probe.
pub fn print_health(health: &ConnectionStatus) {
    println!();
    println!("Backend: {}", if health.is_ready() { "ready" } else { "not ready" });
    if health.configured {
        println!("  auth: {}", check(health.auth));
        println!("  db:   {}", check(health.db));
    }
    if let Some(error) = &health.error {
        println!("  error: {}", error);
    }
}
