//! Core logic of the roster dashboard.
//!
//! # Architecture
//!
//! - `view` - filter/sort engine deriving the displayed records
//! - `stats` - totals, active count and average attendance
//! - `mutation` - single-record updates reconciled into a new roster
//! - `load` - roster loading and the connection test
//! - `state` - the dashboard state manager and connection indicator
//! - `drafts` - inline note edits in progress
//! - `export` - CSV export of the displayed view
//! - `backend` - the remote table seam and an in-memory implementation
//!
//! Everything here is headless: rendering lives in the CLI and the network
//! client lives in `roster-remote`.

pub mod backend;
pub mod drafts;
pub mod error;
pub mod export;
pub mod load;
pub mod mutation;
pub mod state;
pub mod stats;
pub mod view;

pub use backend::{MemoryBackend, RosterBackend};
pub use drafts::NoteDrafts;
pub use error::{ConnectionError, ExportError, LoadError, MutationError, RemoteError};
pub use export::{EXPORT_HEADERS, export_file_name, to_csv_string, write_csv};
pub use load::{load_roster, verify_connection};
pub use mutation::{DEFAULT_OPERATOR, MutationCoordinator};
pub use state::{ConnectionStatus, DashboardState};
pub use stats::compute_stats;
pub use view::{DisplayView, compare, compute_display_view, matches};
