//! Record a finished breathing session.

use anyhow::Result;
use sync_client::RecordOutcome;
use sync_types::NewSession;

use super::AppContext;

/// Run the record command.
pub async fn run(ctx: &AppContext, session: &NewSession) -> Result<RecordOutcome> {
    ctx.require_user().await?;

    let outcome = ctx.client.record_session(session).await?;
    match &outcome {
        RecordOutcome::Synced(id) => println!("Saved session {}", id),
        RecordOutcome::Queued { position } => {
            println!("Offline: session queued (position {})", position + 1);
            println!("Run 'breathsync flush' when back online.");
        }
    }
    Ok(outcome)
}
