//! Remove local data for the current user.

use anyhow::Result;

use super::AppContext;
use crate::config::SavedUser;

/// Run the wipe command.
///
/// Queued sessions and settings that were never delivered are lost.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let user = ctx.require_user().await?;

    let pending = ctx.client.status().await.pending_sessions;
    ctx.client.wipe_local().await?;
    SavedUser::clear(&ctx.data_dir).await?;

    println!("Local data removed for {}.", user.id);
    if pending > 0 {
        println!("Discarded {} unsynced session(s).", pending);
    }
    Ok(())
}
