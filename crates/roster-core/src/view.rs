//! Filter/sort engine deriving the displayed view from the roster.

use std::cmp::Ordering;

use roster_model::{FilterState, SortField, SortOrder, SortState, StudentRecord};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Filtered and sorted records currently shown, borrowed from the roster.
pub type DisplayView<'a> = Vec<&'a StudentRecord>;

/// Computes the display view for the given roster and selections.
///
/// A record is kept when it satisfies the search, status and grade predicates
/// together. The sort is stable, so records with equal keys keep roster order.
pub fn compute_display_view<'a>(
    roster: &'a [StudentRecord],
    filter: &FilterState,
    sort: &SortState,
) -> DisplayView<'a> {
    let needle = filter.search.to_lowercase();
    let mut view: DisplayView<'a> = roster
        .iter()
        .filter(|record| matches_filter(record, &needle, filter))
        .collect();
    view.sort_by(|a, b| compare(a, b, sort));
    view
}

/// Returns true when `record` passes every active predicate of `filter`.
pub fn matches(record: &StudentRecord, filter: &FilterState) -> bool {
    matches_filter(record, &filter.search.to_lowercase(), filter)
}

fn matches_filter(record: &StudentRecord, needle: &str, filter: &FilterState) -> bool {
    let matches_search = needle.is_empty()
        || record.student_id.to_lowercase().contains(needle)
        || record.full_name.to_lowercase().contains(needle);
    let matches_status = filter
        .status
        .as_deref()
        .is_none_or(|status| record.status == status);
    let matches_grade = filter
        .grade
        .as_deref()
        .is_none_or(|grade| record.grade.as_deref() == Some(grade));
    matches_search && matches_status && matches_grade
}

/// Orders two records under the given sort selection.
pub fn compare(a: &StudentRecord, b: &StudentRecord, sort: &SortState) -> Ordering {
    let ordering = match sort.field {
        SortField::Id => collate(&a.student_id, &b.student_id),
        SortField::Name => collate(&a.full_name, &b.full_name),
        SortField::Grade => a.grade_rank().cmp(&b.grade_rank()),
        SortField::Attendance => a.attendance().cmp(&b.attendance()),
    };
    match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Locale-style text ordering for names and ids.
///
/// Letters compare by base form first, so `Émile` sorts with the `E`s. Ties
/// fall back to accents (`e` before `é`), then case (lowercase first).
fn collate(a: &str, b: &str) -> Ordering {
    base_key(a)
        .cmp(&base_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Lowercased text with diacritics stripped after canonical decomposition.
fn base_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
