//! Filter and sort selections driving the displayed view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Current search text and exact-match filters.
///
/// Empty values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub status: Option<String>,
    pub grade: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Sets the status filter; an empty string removes it.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = non_empty(status.into());
        self
    }

    /// Sets the grade filter; an empty string removes it.
    #[must_use]
    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = non_empty(grade.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.status.is_none() && self.grade.is_none()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Id,
    Name,
    Grade,
    Attendance,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Id,
        SortField::Name,
        SortField::Grade,
        SortField::Attendance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Grade => "grade",
            SortField::Attendance => "attendance",
        }
    }

    /// Direction used when the field is picked without an explicit order.
    ///
    /// Attendance lists the highest first; every other field is ascending.
    pub fn default_order(&self) -> SortOrder {
        match self {
            SortField::Attendance => SortOrder::Desc,
            SortField::Id | SortField::Name | SortField::Grade => SortOrder::Asc,
        }
    }
}

impl FromStr for SortField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "grade" => Ok(SortField::Grade),
            "attendance" => Ok(SortField::Attendance),
            other => Err(ModelError::InvalidSort(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort selection, written `<field>-<order>` (for example `attendance-desc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Selection for `field` in its default direction.
    pub fn for_field(field: SortField) -> Self {
        Self::new(field, field.default_order())
    }
}

impl Default for SortState {
    /// Student id ascending, the order rows arrive in from the table.
    fn default() -> Self {
        Self::for_field(SortField::Id)
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.field.as_str(), self.order.as_str())
    }
}

impl FromStr for SortState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidSort(s.to_string());
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.split_once('-') {
            None => normalized
                .parse::<SortField>()
                .map(Self::for_field)
                .map_err(|_| invalid()),
            Some((field, order)) => {
                let field = field.parse::<SortField>().map_err(|_| invalid())?;
                let order = match order {
                    "asc" => SortOrder::Asc,
                    "desc" => SortOrder::Desc,
                    _ => return Err(invalid()),
                };
                Ok(Self::new(field, order))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selector_values() {
        assert_eq!(
            "name-desc".parse::<SortState>().unwrap(),
            SortState::new(SortField::Name, SortOrder::Desc)
        );
        assert_eq!(
            "Grade-ASC".parse::<SortState>().unwrap(),
            SortState::new(SortField::Grade, SortOrder::Asc)
        );
    }

    #[test]
    fn bare_field_uses_default_direction() {
        assert_eq!(
            "attendance".parse::<SortState>().unwrap(),
            SortState::new(SortField::Attendance, SortOrder::Desc)
        );
        assert_eq!(
            "id".parse::<SortState>().unwrap(),
            SortState::new(SortField::Id, SortOrder::Asc)
        );
    }

    #[test]
    fn rejects_unknown_selectors() {
        assert!("age-asc".parse::<SortState>().is_err());
        assert!("name-up".parse::<SortState>().is_err());
        assert!("".parse::<SortState>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for field in SortField::ALL {
            let state = SortState::for_field(field);
            assert_eq!(state.to_string().parse::<SortState>().unwrap(), state);
        }
    }

    #[test]
    fn empty_filter_values_are_dropped() {
        let filter = FilterState::new().with_status("").with_grade("");
        assert!(filter.is_empty());
        let filter = FilterState::new().with_status("active");
        assert_eq!(filter.status.as_deref(), Some("active"));
    }
}
