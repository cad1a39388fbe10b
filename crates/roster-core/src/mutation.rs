//! Single-record updates reconciled against the roster.

use roster_model::{AuditStamp, RecordId, RecordPatch, Roster, StampedPatch};
use tracing::{info, info_span, warn};

use crate::backend::RosterBackend;
use crate::error::MutationError;

/// Operator identity stamped when none is configured.
pub const DEFAULT_OPERATOR: &str = "roster-dashboard";

/// Sends patches to the remote table and produces the reconciled roster.
///
/// No version check is made: concurrent writes to the same record are
/// last-write-wins at the remote table.
#[derive(Debug, Clone)]
pub struct MutationCoordinator {
    operator: String,
}

impl Default for MutationCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_OPERATOR)
    }
}

impl MutationCoordinator {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Applies `patch` to record `id`, stamping the current time and operator.
    ///
    /// On success returns a new roster with the merged record; `roster` itself
    /// is never modified, so on failure the caller still holds the old state.
    pub fn apply_update<B>(
        &self,
        backend: &B,
        roster: &Roster,
        id: &RecordId,
        patch: RecordPatch,
    ) -> Result<Roster, MutationError>
    where
        B: RosterBackend + ?Sized,
    {
        self.apply_stamped(
            backend,
            roster,
            id,
            StampedPatch::new(patch, AuditStamp::now(&self.operator)),
        )
    }

    /// Same as [`apply_update`](Self::apply_update) with a caller-provided stamp.
    pub fn apply_stamped<B>(
        &self,
        backend: &B,
        roster: &Roster,
        id: &RecordId,
        stamped: StampedPatch,
    ) -> Result<Roster, MutationError>
    where
        B: RosterBackend + ?Sized,
    {
        let span = info_span!("update", record_id = %id);
        let _guard = span.enter();

        let current = roster
            .get(id)
            .ok_or_else(|| MutationError::RecordNotFound(id.clone()))?;
        stamped.patch.validate()?;

        let fields = stamped.patch.field_names();
        let updated_rows = backend.update(id, &stamped).map_err(|source| {
            warn!(error = %source, "remote update failed");
            MutationError::Remote {
                id: id.clone(),
                source,
            }
        })?;
        if updated_rows.is_empty() {
            warn!("remote update matched no rows");
            return Err(MutationError::NotApplied(id.clone()));
        }

        let merged = current.merged(&stamped);
        let next = roster
            .with_replaced(merged)
            .ok_or_else(|| MutationError::RecordNotFound(id.clone()))?;
        info!(fields = ?fields, operator = %stamped.audit.last_updated_by, "record updated");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::RemoteError;
    use roster_model::{ModelError, StudentRecord};

    fn rows() -> Vec<StudentRecord> {
        serde_json::from_str(
            r#"[
                {"id": 1, "student_id": "S001", "full_name": "Ann", "status": "active",
                 "grade": "A", "attendance_percentage": 90},
                {"id": 2, "student_id": "S002", "full_name": "Bob", "status": "inactive",
                 "grade": "C", "attendance_percentage": 40}
            ]"#,
        )
        .expect("rows")
    }

    #[test]
    fn unknown_record_fails_before_any_request() {
        let backend = MemoryBackend::new(rows());
        let roster = Roster::new(rows()).unwrap();
        let err = MutationCoordinator::default()
            .apply_update(&backend, &roster, &RecordId::Int(999), RecordPatch::new().with_notes("x"))
            .unwrap_err();
        assert_eq!(err, MutationError::RecordNotFound(RecordId::Int(999)));
        assert_eq!(backend.update_calls(), 0);
    }

    #[test]
    fn invalid_patch_is_not_sent() {
        let backend = MemoryBackend::new(rows());
        let roster = Roster::new(rows()).unwrap();
        let err = MutationCoordinator::default()
            .apply_update(&backend, &roster, &RecordId::Int(1), RecordPatch::new().with_attendance(120))
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::InvalidPatch(ModelError::AttendanceOutOfRange(120))
        );
        assert_eq!(backend.update_calls(), 0);
    }

    #[test]
    fn remote_rejection_carries_message() {
        let backend = MemoryBackend::new(rows());
        backend.fail_next_update(RemoteError::http(403, "permission denied for table students"));
        let roster = Roster::new(rows()).unwrap();
        let err = MutationCoordinator::default()
            .apply_update(&backend, &roster, &RecordId::Int(2), RecordPatch::new().with_status("active"))
            .unwrap_err();
        assert!(matches!(err, MutationError::Remote { .. }));
        assert!(err.user_message().contains("permission denied"));
    }

    #[test]
    fn zero_updated_rows_is_reported() {
        // Row exists locally but not remotely, as when a policy hides it.
        let backend = MemoryBackend::new(Vec::new());
        let roster = Roster::new(rows()).unwrap();
        let err = MutationCoordinator::default()
            .apply_update(&backend, &roster, &RecordId::Int(1), RecordPatch::new().with_notes("x"))
            .unwrap_err();
        assert_eq!(err, MutationError::NotApplied(RecordId::Int(1)));
    }

    #[test]
    fn stamps_configured_operator() {
        let backend = MemoryBackend::new(rows());
        let roster = Roster::new(rows()).unwrap();
        let next = MutationCoordinator::new("registrar")
            .apply_update(&backend, &roster, &RecordId::Int(1), RecordPatch::new().with_attendance(95))
            .unwrap();
        let record = next.get(&RecordId::Int(1)).unwrap();
        assert_eq!(record.last_updated_by.as_deref(), Some("registrar"));
        assert_eq!(record.attendance(), 95);
        assert_eq!(backend.rows()[0].attendance(), 95);
    }
}
