//! CLI argument definitions for the roster dashboard.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use roster_model::{FilterState, Grade, RecordId, SortState};

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Student roster dashboard backed by a hosted database table",
    long_about = "Browse, filter, sort, update and export a student roster.\n\n\
                  Run `roster configure` once with your project URL and anon key;\n\
                  every other command reads the saved connection."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include student names and notes in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Connection config file (default: platform config dir, or $ROSTER_CONFIG).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Save the project URL and anon key, then test the connection.
    Configure(ConfigureArgs),

    /// Show the filtered, sorted roster with summary statistics.
    List(ListArgs),

    /// Show summary statistics only.
    Stats(FilterArgs),

    /// Update one student's status, grade, attendance or notes.
    Update(UpdateArgs),

    /// Replace one student's notes.
    Notes(NotesArgs),

    /// Export the displayed roster as CSV.
    Export(ExportArgs),
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Project URL (https://[project-ref].supabase.co).
    #[arg(long = "url", value_name = "URL")]
    pub url: String,

    /// Anon (public) API key.
    #[arg(long = "key", value_name = "KEY")]
    pub key: String,

    /// Table holding the roster.
    #[arg(long = "table", value_name = "NAME")]
    pub table: Option<String>,

    /// Name recorded as `last_updated_by` on every change.
    #[arg(long = "operator", value_name = "NAME")]
    pub operator: Option<String>,
}

/// Selections that derive the displayed view.
#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive match against name or student id.
    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    /// Only show this status (e.g. active, inactive).
    #[arg(long = "status", value_name = "STATUS")]
    pub status: Option<String>,

    /// Only show this grade.
    #[arg(long = "grade", value_name = "GRADE")]
    pub grade: Option<Grade>,

    /// Sort order as <field>-<order>, e.g. name-asc or attendance-desc.
    #[arg(long = "sort", value_name = "SORT", default_value = "id-asc")]
    pub sort: SortState,
}

impl FilterArgs {
    pub fn filter_state(&self) -> FilterState {
        let mut filter = FilterState::new();
        if let Some(search) = &self.search {
            filter = filter.with_search(search.as_str());
        }
        if let Some(status) = &self.status {
            filter = filter.with_status(status.as_str());
        }
        if let Some(grade) = self.grade {
            filter = filter.with_grade(grade.as_str());
        }
        filter
    }
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print the view and statistics as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Record id of the student.
    #[arg(value_name = "ID")]
    pub id: RecordId,

    /// New status.
    #[arg(long = "status", value_name = "STATUS")]
    pub status: Option<String>,

    /// New grade.
    #[arg(long = "grade", value_name = "GRADE", conflicts_with = "clear_grade")]
    pub grade: Option<Grade>,

    /// Remove the grade.
    #[arg(long = "clear-grade")]
    pub clear_grade: bool,

    /// New attendance percentage.
    #[arg(
        long = "attendance",
        value_name = "PERCENT",
        value_parser = clap::value_parser!(i32).range(0..=100)
    )]
    pub attendance: Option<i32>,

    /// New notes; an empty value clears them.
    #[arg(long = "notes", value_name = "TEXT", conflicts_with = "clear_notes")]
    pub notes: Option<String>,

    /// Remove the notes.
    #[arg(long = "clear-notes")]
    pub clear_notes: bool,
}

#[derive(Args)]
pub struct NotesArgs {
    /// Record id of the student.
    #[arg(value_name = "ID")]
    pub id: RecordId,

    /// Note text; surrounding whitespace is trimmed and an empty text clears the notes.
    #[arg(value_name = "TEXT")]
    pub text: String,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Destination file (default: students_<date>.csv in the working directory).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
