//! Data model for the student roster dashboard.
//!
//! Records mirror rows of the remote `students` table. Filter and sort
//! selections, patches and summary statistics are plain values shared by the
//! core engine, the remote adapter and the CLI.

pub mod error;
pub mod patch;
pub mod query;
pub mod record;
pub mod roster;
pub mod stats;

pub use error::{ModelError, Result};
pub use patch::{AuditStamp, RecordPatch, StampedPatch};
pub use query::{FilterState, SortField, SortOrder, SortState};
pub use record::{
    DEFAULT_STATUS, EMPTY_NOTES_PLACEHOLDER, Grade, RecordId, StudentRecord, UNGRADED_RANK,
};
pub use roster::Roster;
pub use stats::RosterStats;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_applies_patch_and_stamp_only() {
        let record: StudentRecord = serde_json::from_str(
            r#"{"id": 2, "student_id": "S002", "full_name": "Bob", "status": "inactive",
                "grade": "C", "attendance_percentage": 40, "notes": "quiet"}"#,
        )
        .expect("record");
        let stamped = StampedPatch::new(
            RecordPatch::new().with_status("active"),
            AuditStamp {
                last_updated_by: "registrar".to_string(),
                updated_at: "2026-03-01T10:00:00.000Z".to_string(),
            },
        );

        let merged = record.merged(&stamped);
        assert_eq!(merged.status, "active");
        assert_eq!(merged.grade.as_deref(), Some("C"));
        assert_eq!(merged.attendance_percentage, Some(40));
        assert_eq!(merged.notes.as_deref(), Some("quiet"));
        assert_eq!(merged.last_updated_by.as_deref(), Some("registrar"));
        assert_eq!(merged.updated_at.as_deref(), Some("2026-03-01T10:00:00.000Z"));
        assert_eq!(merged.id, record.id);
    }

    #[test]
    fn merged_clears_nullable_fields() {
        let record: StudentRecord = serde_json::from_str(
            r#"{"id": 1, "student_id": "S001", "full_name": "Ann", "grade": "A", "notes": "x"}"#,
        )
        .expect("record");
        let stamped = StampedPatch::new(
            RecordPatch::new().with_grade(None).clear_notes(),
            AuditStamp::now("registrar"),
        );
        let merged = record.merged(&stamped);
        assert_eq!(merged.grade, None);
        assert_eq!(merged.notes, None);
    }
}
