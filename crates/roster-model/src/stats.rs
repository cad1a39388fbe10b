use serde::Serialize;

/// Summary counts shown above the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterStats {
    /// Records in the roster.
    pub total: usize,
    /// Records in the displayed view.
    pub displayed: usize,
    /// Roster records whose status is `active`.
    pub active: usize,
    /// Mean attendance over the roster, rounded to the nearest integer.
    pub avg_attendance: i32,
}
