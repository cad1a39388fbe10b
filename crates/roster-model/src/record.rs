//! Student record types as stored in the remote `students` table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ModelError;
use crate::patch::StampedPatch;

/// Status assumed when a row carries no status.
pub const DEFAULT_STATUS: &str = "active";

/// Text shown in place of absent or empty notes.
pub const EMPTY_NOTES_PLACEHOLDER: &str = "No notes yet";

/// Sort rank given to records without a recognised grade.
///
/// Larger than every valid rank so ungraded records sort last in ascending order.
pub const UNGRADED_RANK: u32 = 999;

/// Primary key assigned by the remote table.
///
/// Hosted tables usually use integer identity columns, but text keys (UUIDs)
/// are equally common, so both are accepted and round-tripped untouched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl RecordId {
    /// True when both ids print the same, whatever their variant.
    ///
    /// `Int(12)` matches `Text("12")` but not `Text("0012")`.
    pub fn same_key(&self, other: &RecordId) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

/// Typed input becomes `Int` only when it prints back unchanged, so text keys
/// such as `0012` keep their leading zeros.
impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(value) if value.to_string() == trimmed => Self::Int(value),
            _ => Self::Text(trimmed.to_string()),
        })
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Letter grade, A (best) to E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }

    /// Sort rank, 1 for A through 5 for E.
    pub fn rank(&self) -> u32 {
        match self {
            Grade::A => 1,
            Grade::B => 2,
            Grade::C => 3,
            Grade::D => 4,
            Grade::E => 5,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "E" => Ok(Grade::E),
            other => Err(ModelError::InvalidGrade(other.to_string())),
        }
    }
}

/// One row of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: RecordId,
    pub student_id: String,
    pub full_name: String,
    #[serde(default = "default_status", deserialize_with = "status_or_default")]
    pub status: String,
    /// Kept as free text so unknown letters coming from the table still load.
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub attendance_percentage: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub last_updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn status_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let status = Option::<String>::deserialize(deserializer)?;
    Ok(status
        .filter(|value| !value.is_empty())
        .unwrap_or_else(default_status))
}

impl StudentRecord {
    /// Attendance percentage with a missing value read as 0.
    pub fn attendance(&self) -> i32 {
        self.attendance_percentage.unwrap_or(0)
    }

    /// Parsed grade, `None` when ungraded or not one of A-E.
    pub fn parsed_grade(&self) -> Option<Grade> {
        self.grade.as_deref().and_then(|g| g.parse().ok())
    }

    pub fn grade_rank(&self) -> u32 {
        self.parsed_grade().map_or(UNGRADED_RANK, |g| g.rank())
    }

    pub fn grade_label(&self) -> &str {
        self.grade.as_deref().unwrap_or("")
    }

    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn notes_label(&self) -> &str {
        match self.notes.as_deref() {
            Some(notes) if !notes.is_empty() => notes,
            _ => EMPTY_NOTES_PLACEHOLDER,
        }
    }

    /// Returns a copy of this record with the patch and its audit stamp applied.
    ///
    /// Fields the patch leaves out are carried over unchanged.
    #[must_use]
    pub fn merged(&self, stamped: &StampedPatch) -> StudentRecord {
        let mut record = self.clone();
        let patch = &stamped.patch;
        if let Some(status) = &patch.status {
            record.status.clone_from(status);
        }
        if let Some(grade) = patch.grade {
            record.grade = grade.map(|g| g.as_str().to_string());
        }
        if let Some(attendance) = patch.attendance_percentage {
            record.attendance_percentage = Some(attendance);
        }
        if let Some(notes) = &patch.notes {
            record.notes.clone_from(notes);
        }
        record.last_updated_by = Some(stamped.audit.last_updated_by.clone());
        record.updated_at = Some(stamped.audit.updated_at.clone());
        record
    }
}
