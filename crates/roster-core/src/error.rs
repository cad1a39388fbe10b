//! Error taxonomy for talking to the remote table.
//!
//! Every error carries a `user_message()` with human-readable guidance. None
//! of these are retried automatically; the user re-triggers the action.

use roster_model::{ModelError, RecordId};
use thiserror::Error;

/// Failure reported by the remote table service or the transport under it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    /// HTTP status, absent for transport failures (DNS, TLS, timeout).
    pub status: Option<u16>,
    /// Service error code, for example `42P01` or `PGRST301`.
    pub code: Option<String>,
    pub message: String,
    pub hint: Option<String>,
}

impl RemoteError {
    /// A failure before any response was received.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
            hint: None,
        }
    }

    /// A non-success response.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: message.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn is_transport(&self) -> bool {
        self.status.is_none()
    }
}

/// The connection test against the remote table failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("connection test failed: {0}")]
pub struct ConnectionError(#[source] pub RemoteError);

impl ConnectionError {
    pub fn user_message(&self) -> &str {
        if self.0.is_transport() {
            "Could not reach the database. Please check your internet connection and URL."
        } else {
            "The database rejected the connection test."
        }
    }

    /// Steps worth checking before updating the configuration.
    pub fn troubleshooting(&self) -> &'static [&'static str] {
        &[
            "Verify your project URL is correct (https://[project-ref].supabase.co)",
            "Check that your anon key is valid",
            "Ensure your table is named 'students'",
            "Check that Row Level Security (RLS) is enabled and configured properly",
            "Make sure your internet connection is stable",
        ]
    }
}

/// Loading the roster failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The query succeeded but returned no rows.
    #[error(
        "no data found: the table might be empty or you might not have permission to access it"
    )]
    NoData,

    #[error("table not found: {0}")]
    TableMissing(RemoteError),

    #[error("permission denied: {0}")]
    PermissionDenied(RemoteError),

    #[error("authentication error: {0}")]
    Authentication(RemoteError),

    #[error("failed to load students: {0}")]
    Remote(RemoteError),

    /// Rows arrived but violate the roster invariants.
    #[error("invalid roster: {0}")]
    InvalidRoster(#[from] ModelError),
}

impl LoadError {
    /// Sorts a remote failure into the known misconfiguration cases by its text.
    pub fn classify(error: RemoteError) -> Self {
        let message = &error.message;
        if message.contains("relation") && message.contains("does not exist") {
            Self::TableMissing(error)
        } else if message.contains("permission denied") {
            Self::PermissionDenied(error)
        } else if message.contains("JWT") {
            Self::Authentication(error)
        } else {
            Self::Remote(error)
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NoData => {
                "No data found. The table might be empty or you might not have permission to access it."
                    .to_string()
            }
            Self::TableMissing(_) => {
                "Table not found. Make sure you've created the 'students' table in your database."
                    .to_string()
            }
            Self::PermissionDenied(_) => {
                "Permission denied. Check your Row Level Security (RLS) policies.".to_string()
            }
            Self::Authentication(_) => {
                "Authentication error. Your anon key might be invalid.".to_string()
            }
            Self::Remote(error) => error.message.clone(),
            Self::InvalidRoster(error) => format!("The table returned inconsistent rows: {error}"),
        }
    }
}

/// A single-record update failed; the roster is unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    /// The id is not in the loaded roster. The UI should never ask for this.
    #[error("record {0} is not in the loaded roster")]
    RecordNotFound(RecordId),

    #[error("invalid update: {0}")]
    InvalidPatch(#[from] ModelError),

    #[error("error updating student {id}: {source}")]
    Remote {
        id: RecordId,
        #[source]
        source: RemoteError,
    },

    /// The service accepted the request but reported no changed row.
    #[error("update of record {0} matched no rows")]
    NotApplied(RecordId),
}

impl MutationError {
    pub fn user_message(&self) -> String {
        match self {
            Self::RecordNotFound(id) => format!("Student {id} is not loaded. Refresh and try again."),
            Self::InvalidPatch(error) => format!("Invalid value: {error}"),
            Self::Remote { source, .. } => format!("Error updating student: {}", source.message),
            Self::NotApplied(_) => {
                "The update was not saved. Check your Row Level Security (RLS) update policy."
                    .to_string()
            }
        }
    }
}

/// Writing the CSV export failed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
