//! CSV export of the displayed view.

use std::io::Write;

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use roster_model::StudentRecord;

use crate::error::ExportError;

/// Column headers, in output order.
pub const EXPORT_HEADERS: [&str; 6] = [
    "Student ID",
    "Full Name",
    "Status",
    "Grade",
    "Attendance %",
    "Notes",
];

/// File name for an export taken on `date`, e.g. `students_2026-10-19.csv`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("students_{}.csv", date.format("%Y-%m-%d"))
}

/// Renders the view as CSV text.
///
/// Every cell is quoted and rows are joined with `\n` without a trailing
/// newline. Missing grade and notes export as empty cells, missing attendance
/// as 0.
pub fn to_csv_string(view: &[&StudentRecord]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADERS)?;
    for record in view {
        let attendance = record.attendance().to_string();
        writer.write_record([
            record.student_id.as_str(),
            record.full_name.as_str(),
            record.status.as_str(),
            record.grade_label(),
            attendance.as_str(),
            record.notes.as_deref().unwrap_or(""),
        ])?;
    }

    let mut bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|e| ExportError::Io(std::io::Error::other(e)))
}

/// Writes the CSV rendering of `view` to `out`.
pub fn write_csv<W: Write>(view: &[&StudentRecord], mut out: W) -> Result<(), ExportError> {
    let csv = to_csv_string(view)?;
    out.write_all(csv.as_bytes())?;
    out.flush()?;
    Ok(())
}
