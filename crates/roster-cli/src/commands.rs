use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use roster_cli::logging::redact_value;
use roster_cli::render::{NO_RESULTS, record_table, roster_table, stats_line, status_line};
use roster_core::{
    ConnectionError, ConnectionStatus, DashboardState, ExportError, LoadError,
    MutationCoordinator, MutationError, RosterBackend, export_file_name, write_csv,
};
use roster_model::{RecordId, RecordPatch};
use roster_remote::{ConfigError, ConnectionConfig, RestClient};
use serde_json::json;
use tracing::{debug, info, info_span, trace, warn};

use crate::cli::{ConfigureArgs, ExportArgs, FilterArgs, ListArgs, NotesArgs, UpdateArgs};

/// A connected client plus a freshly loaded dashboard state.
struct Session {
    client: RestClient,
    coordinator: MutationCoordinator,
    state: DashboardState,
}

impl Session {
    /// Loads the saved config, runs the connection test and loads the roster.
    fn open(config_path: &Path) -> Result<Self> {
        let config = ConnectionConfig::load_from(config_path).map_err(config_error)?;
        debug!(config = ?config, path = %config_path.display(), "loaded connection config");
        Self::connect(&config)
    }

    fn connect(config: &ConnectionConfig) -> Result<Self> {
        let client = RestClient::new(config).map_err(config_error)?;
        let mut state = DashboardState::new();
        eprintln!("{}", status_line(&ConnectionStatus::Connecting));

        state.connect(&client).map_err(connection_error)?;
        let students = state.refresh(&client).map_err(load_error)?;
        info!(students, table = %client.table_url(), "roster loaded");
        eprintln!("{}", status_line(state.status()));

        Ok(Self {
            client,
            coordinator: MutationCoordinator::new(config.operator.clone()),
            state,
        })
    }

    fn apply_filters(&mut self, args: &FilterArgs) {
        self.state.set_filter(args.filter_state());
        self.state.set_sort(args.sort);
        debug!(sort = %args.sort, "filters applied");
    }
}

/// Resolves the config file location: `--config`, then `ROSTER_CONFIG`, then
/// the platform config directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(ConnectionConfig::default_path, Path::to_path_buf)
}

pub fn run_configure(args: &ConfigureArgs, path: &Path) -> Result<()> {
    let span = info_span!("configure", path = %path.display());
    let _guard = span.enter();

    let mut config = ConnectionConfig::new(&args.url, &args.key);
    if let Some(table) = &args.table {
        config = config.with_table(table.as_str());
    }
    if let Some(operator) = &args.operator {
        config = config.with_operator(operator.as_str());
    }
    config.validate().map_err(config_error)?;
    config.save_to(path).map_err(config_error)?;
    println!("Saved configuration to {}", path.display());

    let session = Session::connect(&config)?;
    let stats = session.state.stats();
    println!("{}", stats_line(&stats));
    Ok(())
}

pub fn run_list(args: &ListArgs, path: &Path) -> Result<()> {
    let mut session = Session::open(path)?;
    session.apply_filters(&args.filter);
    let view = session.state.view();
    let stats = session.state.stats();

    if args.json {
        let output = json!({
            "students": view,
            "stats": stats,
            "filter": session.state.filter(),
            "sort": session.state.sort().to_string(),
        });
        let rendered = serde_json::to_string_pretty(&output).context("encode roster as JSON")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}", stats_line(&stats));
    if view.is_empty() {
        println!("{NO_RESULTS}");
    } else {
        println!("{}", roster_table(&view));
    }
    Ok(())
}

pub fn run_stats(args: &FilterArgs, path: &Path) -> Result<()> {
    let mut session = Session::open(path)?;
    session.apply_filters(args);
    println!("{}", stats_line(&session.state.stats()));
    Ok(())
}

pub fn run_update(args: &UpdateArgs, path: &Path) -> Result<()> {
    let patch = patch_from_args(args);
    if patch.is_empty() {
        return Err(anyhow!(
            "nothing to update: pass --status, --grade, --clear-grade, --attendance, --notes or --clear-notes"
        ));
    }

    let mut session = Session::open(path)?;
    let span = info_span!("update_command", record_id = %args.id, fields = ?patch.field_names());
    let _guard = span.enter();

    if let Some(notes) = patch.notes.as_ref().and_then(Option::as_deref) {
        trace!(notes = redact_value(notes), "new notes");
    }
    let id = apply_update(
        &mut session.state,
        &session.coordinator,
        &session.client,
        &args.id,
        patch,
    )
    .map_err(mutation_error)?;
    println!("Student updated successfully!");
    print_record(&session.state, &id)
}

pub fn run_notes(args: &NotesArgs, path: &Path) -> Result<()> {
    let mut session = Session::open(path)?;
    let span = info_span!("notes", record_id = %args.id);
    let _guard = span.enter();

    let id = resolve_id(&session.state, &args.id);
    let current = session
        .state
        .begin_note_edit(&id)
        .map_err(mutation_error)?
        .to_string();
    trace!(
        from = redact_value(&current),
        to = redact_value(&args.text),
        "editing notes"
    );
    session.state.set_note_draft(&id, args.text.as_str());

    if let Err(error) = session
        .state
        .save_note(&session.coordinator, &session.client, &id)
    {
        if let Some(draft) = session.state.cancel_note_edit(&id) {
            warn!(record_id = %id, "note draft discarded after failed save");
            debug!(draft = redact_value(&draft), "discarded draft");
        }
        return Err(mutation_error(error));
    }
    println!("Notes saved successfully!");
    print_record(&session.state, &id)
}

pub fn run_export(args: &ExportArgs, path: &Path) -> Result<()> {
    let mut session = Session::open(path)?;
    session.apply_filters(&args.filter);
    let view = session.state.view();

    let output = args.output.clone().unwrap_or_else(default_export_path);
    let span = info_span!("export", path = %output.display(), rows = view.len());
    let _guard = span.enter();

    let file = File::create(&output)
        .with_context(|| format!("create export file {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    write_csv(&view, &mut writer).map_err(export_error)?;
    writer
        .flush()
        .with_context(|| format!("write export file {}", output.display()))?;

    info!("export written");
    println!("Exported {} students to {}", view.len(), output.display());
    Ok(())
}

/// `students_<date>.csv` in the working directory, dated in UTC.
fn default_export_path() -> PathBuf {
    PathBuf::from(export_file_name(chrono::Utc::now().date_naive()))
}

/// Maps a typed id onto the id of the loaded record it names, so `12` finds a
/// text key `"12"`. Unknown ids pass through and fail as not found.
fn resolve_id(state: &DashboardState, id: &RecordId) -> RecordId {
    state
        .roster()
        .and_then(|roster| roster.resolve_id(id))
        .unwrap_or(id)
        .clone()
}

/// Sends `patch` for the record named by `requested`, returning its loaded id.
fn apply_update<B>(
    state: &mut DashboardState,
    coordinator: &MutationCoordinator,
    backend: &B,
    requested: &RecordId,
    patch: RecordPatch,
) -> Result<RecordId, MutationError>
where
    B: RosterBackend + ?Sized,
{
    let id = resolve_id(state, requested);
    state.update_record(coordinator, backend, &id, patch)?;
    Ok(id)
}

fn patch_from_args(args: &UpdateArgs) -> RecordPatch {
    let mut patch = RecordPatch::new();
    if let Some(status) = &args.status {
        patch = patch.with_status(status.as_str());
    }
    if args.clear_grade {
        patch = patch.with_grade(None);
    } else if let Some(grade) = args.grade {
        patch = patch.with_grade(Some(grade));
    }
    if let Some(attendance) = args.attendance {
        patch = patch.with_attendance(attendance);
    }
    if args.clear_notes {
        patch = patch.clear_notes();
    } else if let Some(notes) = &args.notes {
        patch = patch.with_notes(notes.trim());
    }
    patch
}

fn print_record(state: &DashboardState, id: &RecordId) -> Result<()> {
    let record = state
        .roster()
        .and_then(|roster| roster.get(id))
        .ok_or_else(|| anyhow!("student {id} is no longer loaded"))?;
    println!("{}", record_table(record));
    Ok(())
}

fn config_error(error: ConfigError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

fn connection_error(error: ConnectionError) -> anyhow::Error {
    eprintln!("{}", error.user_message());
    eprintln!("Troubleshooting:");
    for (index, step) in error.troubleshooting().iter().enumerate() {
        eprintln!("  {}. {step}", index + 1);
    }
    let message = error.user_message().to_string();
    anyhow::Error::new(error).context(message)
}

fn load_error(error: LoadError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

fn mutation_error(error: MutationError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

fn export_error(error: ExportError) -> anyhow::Error {
    anyhow::Error::new(error).context("Failed to export students")
}
