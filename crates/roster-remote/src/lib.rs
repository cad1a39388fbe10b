//! Remote collaborator adapter for the roster dashboard.
//!
//! - [`RestClient`] implements [`roster_core::RosterBackend`] against the
//!   hosted table's REST endpoint, with an explicit request timeout.
//! - [`ConnectionConfig`] holds the project URL and anon key, validates them
//!   and persists them as TOML.

mod client;
mod config;

pub use client::{RestClient, parse_content_range, remote_error, table_url};
pub use config::{
    CONFIG_ENV_VAR, ConfigError, ConnectionConfig, DEFAULT_TABLE, DEFAULT_TIMEOUT_SECS,
    MANAGED_DOMAIN_FRAGMENT,
};
