//! In-progress inline note edits, keyed by record.

use std::collections::BTreeMap;

use roster_model::{RecordId, StudentRecord};

/// Draft note text per record.
///
/// Several records can be edited at once; each draft lives until it is
/// saved successfully or cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDrafts {
    drafts: BTreeMap<RecordId, String>,
}

impl NoteDrafts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an editor for `record`, seeded with its current notes.
    ///
    /// An already open draft is kept as is.
    pub fn begin(&mut self, record: &StudentRecord) -> &str {
        self.drafts
            .entry(record.id.clone())
            .or_insert_with(|| record.notes.clone().unwrap_or_default())
    }

    /// Replaces the draft text. Returns false when no editor is open for `id`.
    pub fn set(&mut self, id: &RecordId, text: impl Into<String>) -> bool {
        match self.drafts.get_mut(id) {
            Some(draft) => {
                *draft = text.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &RecordId) -> Option<&str> {
        self.drafts.get(id).map(String::as_str)
    }

    pub fn is_editing(&self, id: &RecordId) -> bool {
        self.drafts.contains_key(id)
    }

    /// Discards the draft, returning its text.
    pub fn cancel(&mut self, id: &RecordId) -> Option<String> {
        self.drafts.remove(id)
    }

    /// The text a save would send: trimmed, empty meaning "clear".
    pub fn pending_notes(&self, id: &RecordId) -> Option<String> {
        self.drafts.get(id).map(|draft| draft.trim().to_string())
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}
