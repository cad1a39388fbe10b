use roster_core::{
    DashboardState, LoadError, MemoryBackend, MutationCoordinator, MutationError, compute_stats,
    load_roster,
};
use roster_model::{FilterState, RecordId, RecordPatch, Roster, RosterStats, StudentRecord};

fn two_students() -> Vec<StudentRecord> {
    serde_json::from_str(
        r#"[
            {"id": 1, "student_id": "S001", "full_name": "Ann", "status": "active",
             "grade": "A", "attendance_percentage": 90},
            {"id": 2, "student_id": "S002", "full_name": "Bob", "status": "inactive",
             "grade": "C", "attendance_percentage": 40}
        ]"#,
    )
    .expect("fixture rows")
}

fn loaded_state(backend: &MemoryBackend) -> DashboardState {
    let mut state = DashboardState::new();
    state.refresh(backend).expect("load roster");
    state
}

#[test]
fn status_filter_shows_active_only() {
    let backend = MemoryBackend::new(two_students());
    let mut state = loaded_state(&backend);
    state.set_filter(FilterState::new().with_status("active"));

    let view = state.view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, RecordId::Int(1));
    assert_eq!(
        state.stats(),
        RosterStats {
            total: 2,
            displayed: 1,
            active: 1,
            avg_attendance: 65,
        }
    );
}

#[test]
fn search_matches_name_case_insensitively() {
    let backend = MemoryBackend::new(two_students());
    let mut state = loaded_state(&backend);
    state.set_search("bo");

    let ids: Vec<&RecordId> = state.view().iter().map(|r| &r.id).collect();
    assert_eq!(ids, [&RecordId::Int(2)]);
}

#[test]
fn empty_roster_stats_are_zero() {
    assert_eq!(compute_stats(&[], &[]), RosterStats::default());
    assert_eq!(DashboardState::new().stats(), RosterStats::default());
}

#[test]
fn status_update_replaces_only_the_target() {
    let backend = MemoryBackend::new(two_students());
    let roster = load_roster(&backend).expect("load");
    let coordinator = MutationCoordinator::new("registrar");

    let next = coordinator
        .apply_update(
            &backend,
            &roster,
            &RecordId::Int(2),
            RecordPatch::new().with_status("active"),
        )
        .expect("update succeeds");

    let updated = next.get(&RecordId::Int(2)).expect("record 2");
    assert_eq!(updated.status, "active");
    assert_eq!(updated.last_updated_by.as_deref(), Some("registrar"));
    assert!(updated.updated_at.is_some());
    assert_eq!(next.records()[0], roster.records()[0]);
    // The input roster is untouched.
    assert_eq!(roster.get(&RecordId::Int(2)).unwrap().status, "inactive");
}

#[test]
fn notes_round_trip_keeps_identity_fields() {
    let backend = MemoryBackend::new(two_students());
    let mut state = loaded_state(&backend);
    let id = RecordId::Int(1);

    state
        .update_record(
            &MutationCoordinator::default(),
            &backend,
            &id,
            RecordPatch::new().with_notes("x"),
        )
        .expect("update succeeds");

    let record = state.roster().and_then(|r| r.get(&id)).expect("record 1");
    assert_eq!(record.notes.as_deref(), Some("x"));
    assert_eq!(record.student_id, "S001");
    assert_eq!(record.full_name, "Ann");
    assert_eq!(record.id, id);
}

#[test]
fn update_of_unknown_id_leaves_roster_alone() {
    let backend = MemoryBackend::new(two_students());
    let mut state = loaded_state(&backend);
    let before: Roster = state.roster().cloned().expect("roster");

    let err = state
        .update_record(
            &MutationCoordinator::default(),
            &backend,
            &RecordId::Int(999),
            RecordPatch::new().with_status("active"),
        )
        .unwrap_err();

    assert_eq!(err, MutationError::RecordNotFound(RecordId::Int(999)));
    assert_eq!(state.roster(), Some(&before));
    assert_eq!(backend.update_calls(), 0);
}

#[test]
fn view_follows_updates_under_active_filter() {
    let backend = MemoryBackend::new(two_students());
    let mut state = loaded_state(&backend);
    state.set_filter(FilterState::new().with_status("inactive"));
    assert_eq!(state.view().len(), 1);

    state
        .update_record(
            &MutationCoordinator::default(),
            &backend,
            &RecordId::Int(2),
            RecordPatch::new().with_status("active"),
        )
        .expect("update succeeds");

    assert!(state.view().is_empty());
    assert_eq!(state.stats().active, 2);
}

#[test]
fn empty_table_reports_no_data_and_zero_stats() {
    let backend = MemoryBackend::new(Vec::new());
    let mut state = DashboardState::new();
    assert_eq!(state.refresh(&backend).unwrap_err(), LoadError::NoData);
    assert_eq!(state.stats(), RosterStats::default());
}
