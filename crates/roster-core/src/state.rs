//! Dashboard state: the roster plus the selections that derive its view.
//!
//! The display view and statistics are never stored. They are recomputed from
//! the current roster, filter and sort on every read, so a roster replacement
//! or patch can never leave a stale view behind.

use std::fmt;

use roster_model::{FilterState, RecordId, RecordPatch, Roster, RosterStats, SortState};
use tracing::{debug, info};

use crate::backend::RosterBackend;
use crate::drafts::NoteDrafts;
use crate::error::{ConnectionError, LoadError, MutationError};
use crate::load::{load_roster, verify_connection};
use crate::mutation::MutationCoordinator;
use crate::stats::compute_stats;
use crate::view::{DisplayView, compute_display_view};

/// Connection indicator shown next to the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Loading,
    Connected {
        students: usize,
    },
    Error {
        reason: String,
    },
}

impl ConnectionStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("Not connected"),
            Self::Connecting => f.write_str("Connecting..."),
            Self::Loading => f.write_str("Loading..."),
            Self::Connected { students } => write!(f, "Connected ({students} students)"),
            Self::Error { reason } => f.write_str(reason),
        }
    }
}

/// Owns everything the dashboard renders.
#[derive(Debug, Default)]
pub struct DashboardState {
    roster: Option<Roster>,
    filter: FilterState,
    sort: SortState,
    status: ConnectionStatus,
    drafts: NoteDrafts,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn drafts(&self) -> &NoteDrafts {
        &self.drafts
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    /// Records currently shown.
    pub fn view(&self) -> DisplayView<'_> {
        match &self.roster {
            Some(roster) => compute_display_view(roster.records(), &self.filter, &self.sort),
            None => Vec::new(),
        }
    }

    /// Summary counts; all zero when no roster is loaded.
    pub fn stats(&self) -> RosterStats {
        match &self.roster {
            Some(roster) => compute_stats(roster.records(), &self.view()),
            None => RosterStats::default(),
        }
    }

    /// Runs the connection test, updating the indicator.
    pub fn connect<B>(&mut self, backend: &B) -> Result<usize, ConnectionError>
    where
        B: RosterBackend + ?Sized,
    {
        self.status = ConnectionStatus::Connecting;
        match verify_connection(backend) {
            Ok(count) => {
                self.status = ConnectionStatus::Connected { students: count };
                Ok(count)
            }
            Err(error) => {
                self.status = ConnectionStatus::Error {
                    reason: "Connection failed".to_string(),
                };
                Err(error)
            }
        }
    }

    /// Loads the roster from `backend`, replacing the current one wholesale.
    pub fn refresh<B>(&mut self, backend: &B) -> Result<usize, LoadError>
    where
        B: RosterBackend + ?Sized,
    {
        self.status = ConnectionStatus::Loading;
        self.apply_load(load_roster(backend))
    }

    /// Installs the outcome of a load.
    ///
    /// A failed load drops the roster so the statistics read zero instead of
    /// pairing old records with an error state.
    pub fn apply_load(&mut self, result: Result<Roster, LoadError>) -> Result<usize, LoadError> {
        match result {
            Ok(roster) => {
                let students = roster.len();
                self.drafts = NoteDrafts::new();
                self.roster = Some(roster);
                self.status = ConnectionStatus::Connected { students };
                Ok(students)
            }
            Err(error) => {
                self.roster = None;
                self.status = ConnectionStatus::Error {
                    reason: "Failed to load data".to_string(),
                };
                Err(error)
            }
        }
    }

    /// Sends `patch` for record `id` and installs the reconciled roster.
    ///
    /// On failure nothing changes.
    pub fn update_record<B>(
        &mut self,
        coordinator: &MutationCoordinator,
        backend: &B,
        id: &RecordId,
        patch: RecordPatch,
    ) -> Result<(), MutationError>
    where
        B: RosterBackend + ?Sized,
    {
        let roster = self
            .roster
            .as_ref()
            .ok_or_else(|| MutationError::RecordNotFound(id.clone()))?;
        let next = coordinator.apply_update(backend, roster, id, patch)?;
        self.roster = Some(next);
        Ok(())
    }

    /// Opens an inline note editor for record `id`, returning the draft text.
    pub fn begin_note_edit(&mut self, id: &RecordId) -> Result<&str, MutationError> {
        let record = self
            .roster
            .as_ref()
            .and_then(|roster| roster.get(id))
            .ok_or_else(|| MutationError::RecordNotFound(id.clone()))?;
        debug!(record_id = %id, "note edit opened");
        Ok(self.drafts.begin(record))
    }

    /// Replaces the draft text of an open note editor.
    pub fn set_note_draft(&mut self, id: &RecordId, text: impl Into<String>) -> bool {
        self.drafts.set(id, text)
    }

    /// Closes the note editor, discarding the draft.
    pub fn cancel_note_edit(&mut self, id: &RecordId) -> Option<String> {
        self.drafts.cancel(id)
    }

    /// Saves the open note draft for record `id`.
    ///
    /// The draft is removed only when the save succeeds; on failure it stays
    /// open with the typed text intact.
    pub fn save_note<B>(
        &mut self,
        coordinator: &MutationCoordinator,
        backend: &B,
        id: &RecordId,
    ) -> Result<(), MutationError>
    where
        B: RosterBackend + ?Sized,
    {
        let notes = self
            .drafts
            .pending_notes(id)
            .ok_or_else(|| MutationError::RecordNotFound(id.clone()))?;
        self.update_record(coordinator, backend, id, RecordPatch::new().with_notes(notes))?;
        self.drafts.cancel(id);
        info!(record_id = %id, "notes saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::RemoteError;
    use roster_model::StudentRecord;

    fn rows() -> Vec<StudentRecord> {
        serde_json::from_str(
            r#"[
                {"id": 1, "student_id": "S001", "full_name": "Ann", "status": "active",
                 "grade": "A", "attendance_percentage": 90, "notes": "prefect"},
                {"id": 2, "student_id": "S002", "full_name": "Bob", "status": "inactive",
                 "grade": "C", "attendance_percentage": 40}
            ]"#,
        )
        .expect("rows")
    }

    #[test]
    fn status_labels() {
        assert_eq!(
            ConnectionStatus::Connected { students: 3 }.to_string(),
            "Connected (3 students)"
        );
        assert_eq!(ConnectionStatus::Connecting.to_string(), "Connecting...");
    }

    #[test]
    fn failed_refresh_zeroes_stats() {
        let backend = MemoryBackend::new(rows());
        let mut state = DashboardState::new();
        state.refresh(&backend).unwrap();
        assert_eq!(state.stats().total, 2);

        backend.fail_next_select(RemoteError::transport("network down"));
        assert!(state.refresh(&backend).is_err());
        assert_eq!(state.stats(), RosterStats::default());
        assert!(state.view().is_empty());
        assert!(state.status().is_error());
    }

    #[test]
    fn connect_sets_indicator() {
        let backend = MemoryBackend::new(rows());
        let mut state = DashboardState::new();
        assert_eq!(state.connect(&backend).unwrap(), 2);
        assert_eq!(state.status(), &ConnectionStatus::Connected { students: 2 });

        backend.fail_next_count(RemoteError::http(401, "Invalid API key"));
        assert!(state.connect(&backend).is_err());
        assert_eq!(state.status().to_string(), "Connection failed");
    }

    #[test]
    fn failed_note_save_keeps_draft() {
        let backend = MemoryBackend::new(rows());
        let coordinator = MutationCoordinator::default();
        let mut state = DashboardState::new();
        state.refresh(&backend).unwrap();

        let id = RecordId::Int(1);
        assert_eq!(state.begin_note_edit(&id).unwrap(), "prefect");
        state.set_note_draft(&id, "head prefect");
        backend.fail_next_update(RemoteError::http(500, "boom"));

        assert!(state.save_note(&coordinator, &backend, &id).is_err());
        assert_eq!(state.drafts().get(&id), Some("head prefect"));
        assert_eq!(
            state.roster().unwrap().get(&id).unwrap().notes.as_deref(),
            Some("prefect")
        );
    }

    #[test]
    fn saved_blank_note_clears_notes() {
        let backend = MemoryBackend::new(rows());
        let coordinator = MutationCoordinator::default();
        let mut state = DashboardState::new();
        state.refresh(&backend).unwrap();

        let id = RecordId::Int(1);
        state.begin_note_edit(&id).unwrap();
        state.set_note_draft(&id, "   ");
        state.save_note(&coordinator, &backend, &id).unwrap();

        let record = state.roster().unwrap().get(&id).unwrap();
        assert_eq!(record.notes, None);
        assert_eq!(record.notes_label(), "No notes yet");
        assert!(state.drafts().is_empty());
    }

    #[test]
    fn concurrent_note_drafts_are_independent() {
        let backend = MemoryBackend::new(rows());
        let coordinator = MutationCoordinator::default();
        let mut state = DashboardState::new();
        state.refresh(&backend).unwrap();

        let first = RecordId::Int(1);
        let second = RecordId::Int(2);
        state.begin_note_edit(&first).unwrap();
        state.begin_note_edit(&second).unwrap();
        state.set_note_draft(&second, "moved class");
        state.save_note(&coordinator, &backend, &second).unwrap();

        assert!(state.drafts().is_editing(&first));
        assert_eq!(
            state.roster().unwrap().get(&second).unwrap().notes.as_deref(),
            Some("moved class")
        );
    }
}
