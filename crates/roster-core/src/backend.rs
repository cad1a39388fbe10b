//! The remote table seam.

use std::sync::Mutex;

use roster_model::{RecordId, StampedPatch, StudentRecord};

use crate::error::RemoteError;

/// Operations the dashboard needs from the hosted table service.
///
/// Implementations hold one shared handle for the lifetime of a configuration.
pub trait RosterBackend {
    /// Exact row count; used as the connection test.
    fn count(&self) -> Result<usize, RemoteError>;

    /// Every row, ordered by `student_id` ascending.
    fn select_all(&self) -> Result<Vec<StudentRecord>, RemoteError>;

    /// Applies `patch` to the row keyed by `id` and returns the updated rows.
    fn update(&self, id: &RecordId, patch: &StampedPatch)
    -> Result<Vec<StudentRecord>, RemoteError>;
}

impl<B: RosterBackend + ?Sized> RosterBackend for &B {
    fn count(&self) -> Result<usize, RemoteError> {
        (**self).count()
    }

    fn select_all(&self) -> Result<Vec<StudentRecord>, RemoteError> {
        (**self).select_all()
    }

    fn update(
        &self,
        id: &RecordId,
        patch: &StampedPatch,
    ) -> Result<Vec<StudentRecord>, RemoteError> {
        (**self).update(id, patch)
    }
}

impl<B: RosterBackend + ?Sized> RosterBackend for Box<B> {
    fn count(&self) -> Result<usize, RemoteError> {
        (**self).count()
    }

    fn select_all(&self) -> Result<Vec<StudentRecord>, RemoteError> {
        (**self).select_all()
    }

    fn update(
        &self,
        id: &RecordId,
        patch: &StampedPatch,
    ) -> Result<Vec<StudentRecord>, RemoteError> {
        (**self).update(id, patch)
    }
}

/// In-memory table standing in for the remote one in tests.
///
/// Failures can be queued per operation to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: Mutex<Vec<StudentRecord>>,
    failures: Mutex<Failures>,
    updates: Mutex<usize>,
}

#[derive(Debug, Default)]
struct Failures {
    count: Option<RemoteError>,
    select: Option<RemoteError>,
    update: Option<RemoteError>,
}

impl MemoryBackend {
    pub fn new(rows: Vec<StudentRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Makes the next `count` call fail with `error`.
    pub fn fail_next_count(&self, error: RemoteError) {
        lock(&self.failures).count = Some(error);
    }

    /// Makes the next `select_all` call fail with `error`.
    pub fn fail_next_select(&self, error: RemoteError) {
        lock(&self.failures).select = Some(error);
    }

    /// Makes the next `update` call fail with `error`.
    pub fn fail_next_update(&self, error: RemoteError) {
        lock(&self.failures).update = Some(error);
    }

    /// Snapshot of the stored rows.
    pub fn rows(&self) -> Vec<StudentRecord> {
        lock(&self.rows).clone()
    }

    /// Number of update requests received, including failed ones.
    pub fn update_calls(&self) -> usize {
        *lock(&self.updates)
    }
}

impl RosterBackend for MemoryBackend {
    fn count(&self) -> Result<usize, RemoteError> {
        if let Some(error) = lock(&self.failures).count.take() {
            return Err(error);
        }
        Ok(lock(&self.rows).len())
    }

    fn select_all(&self) -> Result<Vec<StudentRecord>, RemoteError> {
        if let Some(error) = lock(&self.failures).select.take() {
            return Err(error);
        }
        let mut rows = lock(&self.rows).clone();
        rows.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(rows)
    }

    fn update(
        &self,
        id: &RecordId,
        patch: &StampedPatch,
    ) -> Result<Vec<StudentRecord>, RemoteError> {
        *lock(&self.updates) += 1;
        if let Some(error) = lock(&self.failures).update.take() {
            return Err(error);
        }
        let mut rows = lock(&self.rows);
        Ok(rows
            .iter_mut()
            .filter(|row| &row.id == id)
            .map(|row| {
                *row = row.merged(patch);
                row.clone()
            })
            .collect())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
