//! Loading the roster and testing the connection.

use std::time::Instant;

use roster_model::Roster;
use tracing::{debug, info, info_span, warn};

use crate::backend::RosterBackend;
use crate::error::{ConnectionError, LoadError};

/// Fetches every record ordered by student id.
///
/// An empty table is reported as [`LoadError::NoData`] rather than an empty
/// roster, since it usually means a missing table or read policy.
pub fn load_roster<B>(backend: &B) -> Result<Roster, LoadError>
where
    B: RosterBackend + ?Sized,
{
    let span = info_span!("load");
    let _guard = span.enter();
    let started = Instant::now();

    let rows = backend.select_all().map_err(|error| {
        warn!(error = %error, "select failed");
        LoadError::classify(error)
    })?;
    if rows.is_empty() {
        warn!("select returned no rows");
        return Err(LoadError::NoData);
    }
    let roster = Roster::new(rows)?;
    info!(
        students = roster.len(),
        duration_ms = started.elapsed().as_millis(),
        "roster loaded"
    );
    Ok(roster)
}

/// Runs the count query used as a connection test, returning the row count.
pub fn verify_connection<B>(backend: &B) -> Result<usize, ConnectionError>
where
    B: RosterBackend + ?Sized,
{
    let count = backend.count().map_err(ConnectionError)?;
    debug!(count, "connection test passed");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::RemoteError;
    use roster_model::{ModelError, RecordId, StudentRecord};

    fn row(id: i64, student_id: &str) -> StudentRecord {
        serde_json::from_value(serde_json::json!({
            "id": id, "student_id": student_id, "full_name": format!("Student {id}")
        }))
        .expect("row")
    }

    #[test]
    fn loads_in_student_id_order() {
        let backend = MemoryBackend::new(vec![row(2, "S002"), row(1, "S001")]);
        let roster = load_roster(&backend).unwrap();
        let ids: Vec<&str> = roster.iter().map(|r| r.student_id.as_str()).collect();
        assert_eq!(ids, ["S001", "S002"]);
    }

    #[test]
    fn empty_table_is_no_data() {
        let backend = MemoryBackend::new(Vec::new());
        assert_eq!(load_roster(&backend).unwrap_err(), LoadError::NoData);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let backend = MemoryBackend::new(vec![row(1, "S001"), row(1, "S002")]);
        assert_eq!(
            load_roster(&backend).unwrap_err(),
            LoadError::InvalidRoster(ModelError::DuplicateId(RecordId::Int(1)))
        );
    }

    #[test]
    fn select_failure_is_classified() {
        let backend = MemoryBackend::new(vec![row(1, "S001")]);
        backend.fail_next_select(RemoteError::http(401, "JWT expired"));
        assert!(matches!(
            load_roster(&backend).unwrap_err(),
            LoadError::Authentication(_)
        ));
    }

    #[test]
    fn connection_test_reports_count() {
        let backend = MemoryBackend::new(vec![row(1, "S001")]);
        assert_eq!(verify_connection(&backend).unwrap(), 1);

        backend.fail_next_count(RemoteError::transport("connection refused"));
        let err = verify_connection(&backend).unwrap_err();
        assert_eq!(err.0.message, "connection refused");
    }
}
