//! Aggregate statistics over the roster and the displayed view.

use roster_model::{DEFAULT_STATUS, RosterStats, StudentRecord};

/// Computes the summary counts.
///
/// `active` and `avg_attendance` are taken over the full roster, not the view.
/// An empty roster yields all zeros.
pub fn compute_stats(roster: &[StudentRecord], view: &[&StudentRecord]) -> RosterStats {
    let active = roster
        .iter()
        .filter(|record| record.status == DEFAULT_STATUS)
        .count();
    RosterStats {
        total: roster.len(),
        displayed: view.len(),
        active,
        avg_attendance: average_attendance(roster),
    }
}

fn average_attendance(roster: &[StudentRecord]) -> i32 {
    if roster.is_empty() {
        return 0;
    }
    let sum: i64 = roster.iter().map(|r| i64::from(r.attendance())).sum();
    (sum as f64 / roster.len() as f64).round() as i32
}
