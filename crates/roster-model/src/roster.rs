//! The roster: every record loaded from the remote table.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::record::{RecordId, StudentRecord};

/// Ordered records with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    records: Vec<StudentRecord>,
}

impl Roster {
    /// Builds a roster, rejecting duplicate ids.
    pub fn new(records: Vec<StudentRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(&record.id) {
                return Err(ModelError::DuplicateId(record.id.clone()));
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StudentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&StudentRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// The loaded id that `id` refers to, matching across integer and text keys.
    pub fn resolve_id(&self, id: &RecordId) -> Option<&RecordId> {
        self.get(id)
            .or_else(|| self.records.iter().find(|r| r.id.same_key(id)))
            .map(|record| &record.id)
    }

    /// Returns a new roster with the record sharing `record.id` swapped in place.
    ///
    /// `None` when no record has that id.
    pub fn with_replaced(&self, record: StudentRecord) -> Option<Roster> {
        let index = self.records.iter().position(|r| r.id == record.id)?;
        let mut records = self.records.clone();
        records[index] = record;
        Some(Roster { records })
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a StudentRecord;
    type IntoIter = std::slice::Iter<'a, StudentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
