//! Assertion helpers for offline scenarios.
//!
//! Pure checks over backend rows and local queues. They return a result
//! instead of panicking so scenarios can report every failed check at once.

use std::collections::HashMap;
use sync_types::{PendingSession, SessionRow};

/// Result of an assertion check.
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Description of what was checked
    pub description: String,
    /// Details on failure
    pub failure_details: Option<String>,
}

impl AssertionResult {
    /// Create a passing result.
    pub fn pass(description: &str) -> Self {
        Self {
            passed: true,
            description: description.into(),
            failure_details: None,
        }
    }

    /// Create a failing result.
    pub fn fail(description: &str, details: &str) -> Self {
        Self {
            passed: false,
            description: description.into(),
            failure_details: Some(details.into()),
        }
    }
}

/// Panic with every failed check.
pub fn expect_all(results: &[AssertionResult]) {
    let failures: Vec<String> = results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| {
            format!(
                "{}: {}",
                r.description,
                r.failure_details.as_deref().unwrap_or("failed")
            )
        })
        .collect();
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

/// Assert that no label appears more than once among `rows`.
///
/// Scenarios give every session a distinct label, so a repeated label means
/// the same queued session was inserted twice.
pub fn assert_no_duplicates(rows: &[SessionRow]) -> AssertionResult {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *seen.entry(row.label.as_str()).or_default() += 1;
    }
    let mut repeated: Vec<String> = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(label, n)| format!("{} x{}", label, n))
        .collect();
    repeated.sort();

    if repeated.is_empty() {
        AssertionResult::pass("No duplicate rows")
    } else {
        AssertionResult::fail("No duplicate rows", &repeated.join(", "))
    }
}

/// Assert that every expected label reached the backend in order.
///
/// `rows` are newest first, as the backend returns them.
pub fn assert_delivered_in_order(rows: &[SessionRow], expected: &[&str]) -> AssertionResult {
    let oldest_first: Vec<&str> = rows.iter().rev().map(|r| r.label.as_str()).collect();
    if oldest_first == expected {
        AssertionResult::pass("Sessions delivered in enqueue order")
    } else {
        AssertionResult::fail(
            "Sessions delivered in enqueue order",
            &format!("expected {:?}, got {:?}", expected, oldest_first),
        )
    }
}

/// Assert that the local queue holds exactly `expected`, in order.
pub fn assert_queue_labels(queue: &[PendingSession], expected: &[&str]) -> AssertionResult {
    let labels: Vec<&str> = queue.iter().map(|e| e.label.as_str()).collect();
    if labels == expected {
        AssertionResult::pass("Queue contents")
    } else {
        AssertionResult::fail(
            "Queue contents",
            &format!("expected {:?}, got {:?}", expected, labels),
        )
    }
}

/// Assert that every recorded label is either delivered or still queued.
pub fn assert_no_loss(
    recorded: &[&str],
    delivered: &[SessionRow],
    queued: &[PendingSession],
) -> AssertionResult {
    let missing: Vec<&str> = recorded
        .iter()
        .copied()
        .filter(|label| {
            !delivered.iter().any(|r| r.label == *label)
                && !queued.iter().any(|e| e.label == *label)
        })
        .collect();
    if missing.is_empty() {
        AssertionResult::pass("Every recorded session accounted for")
    } else {
        AssertionResult::fail(
            "Every recorded session accounted for",
            &format!("missing {:?}", missing),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sync_types::{NewSession, OwnerId, RowId};

    fn row(label: &str, secs: i64) -> SessionRow {
        SessionRow {
            id: RowId::new(label),
            owner: OwnerId::new("u1").unwrap(),
            label: label.to_string(),
            protocol: "box".to_string(),
            duration_seconds: 60,
            completed: true,
            estimated_hr_reduction: 0,
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn pending(label: &str) -> PendingSession {
        PendingSession::new(
            &OwnerId::new("u1").unwrap(),
            &NewSession::new(label, "box", 60),
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    #[test]
    fn duplicates_are_reported() {
        let rows = vec![row("a", 2), row("a", 1)];
        let result = assert_no_duplicates(&rows);
        assert!(!result.passed);
        assert_eq!(result.failure_details.as_deref(), Some("a x2"));
    }

    #[test]
    fn order_reads_rows_oldest_first() {
        let rows = vec![row("b", 2), row("a", 1)];
        assert!(assert_delivered_in_order(&rows, &["a", "b"]).passed);
        assert!(!assert_delivered_in_order(&rows, &["b", "a"]).passed);
    }

    #[test]
    fn loss_checks_both_sides() {
        let delivered = vec![row("a", 1)];
        let queued = vec![pending("b")];
        assert!(assert_no_loss(&["a", "b"], &delivered, &queued).passed);
        assert!(!assert_no_loss(&["a", "b", "c"], &delivered, &queued).passed);
    }
}
