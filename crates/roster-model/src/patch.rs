//! Partial record updates and the audit stamp attached to every write.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::record::Grade;

/// A partial update to the editable fields of one record.
///
/// `None` leaves a field untouched. For the nullable fields (`grade`, `notes`)
/// `Some(None)` clears the value, which serializes as JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Option<Grade>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_percentage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets or clears the grade.
    #[must_use]
    pub fn with_grade(mut self, grade: Option<Grade>) -> Self {
        self.grade = Some(grade);
        self
    }

    #[must_use]
    pub fn with_attendance(mut self, attendance: i32) -> Self {
        self.attendance_percentage = Some(attendance);
        self
    }

    /// Sets the notes; an empty string clears them.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = Some(if notes.is_empty() { None } else { Some(notes) });
        self
    }

    #[must_use]
    pub fn clear_notes(mut self) -> Self {
        self.notes = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.grade.is_none()
            && self.attendance_percentage.is_none()
            && self.notes.is_none()
    }

    /// Checks the patch before it is sent anywhere.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ModelError::EmptyPatch);
        }
        if let Some(status) = &self.status
            && status.trim().is_empty()
        {
            return Err(ModelError::EmptyStatus);
        }
        if let Some(attendance) = self.attendance_percentage
            && !(0..=100).contains(&attendance)
        {
            return Err(ModelError::AttendanceOutOfRange(attendance));
        }
        Ok(())
    }

    /// Names of the fields this patch touches, for logging.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.status.is_some() {
            fields.push("status");
        }
        if self.grade.is_some() {
            fields.push("grade");
        }
        if self.attendance_percentage.is_some() {
            fields.push("attendance_percentage");
        }
        if self.notes.is_some() {
            fields.push("notes");
        }
        fields
    }
}

/// Who wrote a record and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditStamp {
    pub last_updated_by: String,
    /// RFC 3339 timestamp in UTC with millisecond precision.
    pub updated_at: String,
}

impl AuditStamp {
    /// Stamps the current time for the given operator.
    pub fn now(operator: impl Into<String>) -> Self {
        Self {
            last_updated_by: operator.into(),
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// The body actually sent to the remote table: patch fields plus audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StampedPatch {
    #[serde(flatten)]
    pub patch: RecordPatch,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl StampedPatch {
    pub fn new(patch: RecordPatch, audit: AuditStamp) -> Self {
        Self { patch, audit }
    }
}
