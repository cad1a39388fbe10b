//! Terminal rendering for the roster, its statistics and single records.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use roster_core::ConnectionStatus;
use roster_model::{DEFAULT_STATUS, RosterStats, StudentRecord};

/// Shown instead of a table when nothing matches the filters.
pub const NO_RESULTS: &str = "No students found\nTry adjusting your search criteria";

const ROSTER_HEADERS: [&str; 7] = [
    "ID",
    "Student ID",
    "Full Name",
    "Status",
    "Grade",
    "Attendance",
    "Notes",
];

/// One row per displayed record, in view order.
pub fn roster_table(view: &[&StudentRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(ROSTER_HEADERS.iter().map(|label| header_cell(label)));
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);
    for record in view {
        table.add_row(vec![
            dim_cell(&record.id),
            Cell::new(&record.student_id).add_attribute(Attribute::Bold),
            Cell::new(&record.full_name),
            status_cell(&record.status),
            grade_cell(record),
            attendance_cell(record),
            notes_cell(record),
        ]);
    }
    table
}

/// Field/value table for a single record.
pub fn record_table(record: &StudentRecord) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    let optional = |value: Option<&str>| match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    };
    table.add_row(vec![Cell::new("id"), Cell::new(&record.id)]);
    table.add_row(vec![Cell::new("student_id"), Cell::new(&record.student_id)]);
    table.add_row(vec![Cell::new("full_name"), Cell::new(&record.full_name)]);
    table.add_row(vec![Cell::new("status"), status_cell(&record.status)]);
    table.add_row(vec![Cell::new("grade"), grade_cell(record)]);
    table.add_row(vec![Cell::new("attendance"), attendance_cell(record)]);
    table.add_row(vec![Cell::new("notes"), notes_cell(record)]);
    table.add_row(vec![
        Cell::new("last_updated_by"),
        optional(record.last_updated_by.as_deref()),
    ]);
    table.add_row(vec![
        Cell::new("updated_at"),
        optional(record.updated_at.as_deref()),
    ]);
    table
}

/// `Total: 4 | Displayed: 2 | Active: 3 | Avg attendance: 81%`
pub fn stats_line(stats: &RosterStats) -> String {
    format!(
        "Total: {} | Displayed: {} | Active: {} | Avg attendance: {}%",
        stats.total, stats.displayed, stats.active, stats.avg_attendance
    )
}

/// Connection indicator line, e.g. `● Connected (4 students)`.
pub fn status_line(status: &ConnectionStatus) -> String {
    let marker = match status {
        ConnectionStatus::Connected { .. } => "●",
        ConnectionStatus::Error { .. } => "✖",
        _ => "○",
    };
    format!("{marker} {status}")
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: &str) -> Cell {
    if status == DEFAULT_STATUS {
        Cell::new(status).fg(Color::Green)
    } else {
        Cell::new(status).fg(Color::Yellow)
    }
}

fn grade_cell(record: &StudentRecord) -> Cell {
    match record.grade.as_deref() {
        Some(grade) if !grade.is_empty() => Cell::new(grade).add_attribute(Attribute::Bold),
        _ => dim_cell("-"),
    }
}

fn attendance_cell(record: &StudentRecord) -> Cell {
    match record.attendance_percentage {
        Some(value) => {
            let color = match value {
                90.. => Color::Green,
                75..=89 => Color::Yellow,
                _ => Color::Red,
            };
            Cell::new(format!("{value}%")).fg(color)
        }
        None => dim_cell("-"),
    }
}

fn notes_cell(record: &StudentRecord) -> Cell {
    if record.has_notes() {
        Cell::new(record.notes_label())
    } else {
        dim_cell(record.notes_label()).add_attribute(Attribute::Italic)
    }
}
