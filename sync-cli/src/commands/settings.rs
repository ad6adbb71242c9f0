//! Show or change profile settings.

use anyhow::{bail, Result};
use sync_client::SettingsWrite;
use sync_types::{ProfileSettings, SettingsPatch};

use super::AppContext;

/// Parse an on/off switch.
pub fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{}'", other)),
    }
}

fn switch(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

/// Show the effective settings.
pub async fn show(ctx: &AppContext) -> Result<Option<ProfileSettings>> {
    let user = ctx.require_user().await?;

    let settings = ctx.client.get_settings().await;
    match &settings {
        Some(settings) => {
            println!("Notifications: {}", switch(settings.notifications_enabled));
            println!("Heart rate:    {}", switch(settings.heart_rate_enabled));
        }
        None => println!("No settings known for {} yet.", user.id),
    }
    if ctx.client.settings().is_dirty(&user.id).await {
        println!("(local changes waiting to sync)");
    }
    Ok(settings)
}

/// Change one or both settings.
pub async fn set(
    ctx: &AppContext,
    notifications: Option<bool>,
    heart_rate: Option<bool>,
) -> Result<SettingsWrite> {
    let patch = SettingsPatch {
        notifications_enabled: notifications,
        heart_rate_enabled: heart_rate,
    };
    if patch.is_empty() {
        bail!("Nothing to change. Pass --notifications and/or --heart-rate.");
    }
    ctx.require_user().await?;

    let write = ctx.client.update_settings(&patch).await?;
    match write {
        SettingsWrite::Applied => println!("Settings saved."),
        SettingsWrite::Pending => println!("Settings saved locally; they will sync when online."),
        SettingsWrite::Unchanged => println!("Nothing changed."),
    }
    Ok(write)
}
