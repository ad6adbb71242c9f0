//! Newest-first merge of queued and fetched sessions.

use sync_types::SessionView;

/// Concatenate `pending` then `synced`, order newest first, keep `limit`.
///
/// The sort is stable, so entries with equal timestamps keep their input
/// order: a queued record sorts before a synced one stamped at the same
/// instant.
pub fn newest_first(
    pending: Vec<SessionView>,
    synced: Vec<SessionView>,
    limit: usize,
) -> Vec<SessionView> {
    let mut combined = pending;
    combined.extend(synced);
    // `sort_by` is a stable merge sort
    combined.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    combined.truncate(limit);
    combined
}
