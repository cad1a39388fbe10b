//! Connection configuration and its on-disk store.
//!
//! Credentials are kept in a TOML file in the user's config directory:
//!
//! ```toml
//! url = "https://abcdefgh.supabase.co"
//! anon_key = "eyJhbGciOi..."
//! table = "students"
//! operator = "roster-dashboard"
//! timeout_secs = 30
//! ```

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use roster_core::DEFAULT_OPERATOR;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "ROSTER_CONFIG";

/// Domain fragment every managed project URL contains.
pub const MANAGED_DOMAIN_FRAGMENT: &str = ".supabase.co";

pub const DEFAULT_TABLE: &str = "students";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Missing or unusable credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("not configured: no config file at {}", path.display())]
    Missing { path: PathBuf },

    #[error("project URL and anon key are both required")]
    MissingCredentials,

    #[error("invalid project URL '{0}'")]
    InvalidUrl(String),

    #[error("anon key contains characters not allowed in a header")]
    InvalidKey,

    #[error("failed to {operation} config file: {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file: {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl ConfigError {
    /// Guidance shown with the setup prompt.
    pub fn user_message(&self) -> String {
        match self {
            Self::Missing { .. } | Self::MissingCredentials => {
                "Enter your project URL and anon key to connect.".to_string()
            }
            Self::InvalidUrl(_) => {
                "Please enter a valid project URL (https://[project-ref].supabase.co)".to_string()
            }
            Self::InvalidKey => "The anon key is not valid. Copy it again from your project's API settings.".to_string(),
            Self::Io { path, .. } => format!("Could not access {}.", path.display()),
            Self::Malformed { path, .. } => format!(
                "The config file {} is damaged. Run `roster configure` to rewrite it.",
                path.display()
            ),
            Self::Serialize(_) | Self::Client(_) => "An unexpected error occurred.".to_string(),
        }
    }
}

/// Where and how to reach the remote table.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub url: String,
    #[serde(alias = "anonKey")]
    pub anon_key: String,
    pub table: String,
    /// Identity stamped as `last_updated_by` on every write.
    pub operator: String,
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: DEFAULT_TABLE.to_string(),
            operator: DEFAULT_OPERATOR.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("table", &self.table)
            .field("operator", &self.operator)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ConnectionConfig {
    /// Creates a config from user input, trimming whitespace and any trailing `/`.
    pub fn new(url: impl AsRef<str>, anon_key: impl AsRef<str>) -> Self {
        Self {
            url: url.as_ref().trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.as_ref().trim().to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Checks the credentials before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() || self.anon_key.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if !self.url.starts_with("https://") || !self.url.contains(MANAGED_DOMAIN_FRAGMENT) {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }

    /// Reads a config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    operation: "read",
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        config.url = config.url.trim().trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Writes the config file atomically (temp file + rename).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                operation: "create directory for",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = path.with_extension("toml.tmp");
        let io_error = |operation: &'static str| {
            let temp_path = temp_path.clone();
            move |source: std::io::Error| ConfigError::Io {
                operation,
                path: temp_path,
                source,
            }
        };
        let mut file = File::create(&temp_path).map_err(io_error("create"))?;
        file.write_all(content.as_bytes())
            .map_err(io_error("write"))?;
        file.sync_all().map_err(io_error("sync"))?;
        fs::rename(&temp_path, path).map_err(|source| ConfigError::Io {
            operation: "replace",
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Saved connection config to {}", path.display());
        Ok(())
    }

    /// Default config file location.
    ///
    /// `ROSTER_CONFIG` wins; otherwise the platform config directory, falling
    /// back to `roster.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }
        directories::ProjectDirs::from("dev", "RosterDashboard", "roster")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("roster.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid() -> ConnectionConfig {
        ConnectionConfig::new("https://abcd.supabase.co/", "anon-key")
    }

    #[test]
    fn new_normalizes_input() {
        let config = ConnectionConfig::new("  https://abcd.supabase.co/ ", " key ");
        assert_eq!(config.url, "https://abcd.supabase.co");
        assert_eq!(config.anon_key, "key");
        assert_eq!(config.table, DEFAULT_TABLE);
        assert_eq!(config.operator, DEFAULT_OPERATOR);
    }

    #[test]
    fn validate_requires_https_managed_url() {
        assert!(valid().validate().is_ok());
        assert!(matches!(
            ConnectionConfig::new("http://abcd.supabase.co", "k").validate(),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            ConnectionConfig::new("https://example.com", "k").validate(),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            ConnectionConfig::new("https://abcd.supabase.co", "").validate(),
            Err(ConfigError::MissingCredentials)
        ));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = valid().with_operator("registrar").with_timeout_secs(5);

        config.save_to(&path).unwrap();
        let loaded = ConnectionConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn missing_file_is_not_configured() {
        let dir = tempdir().unwrap();
        let err = ConnectionConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
        assert!(err.user_message().contains("anon key"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "url = [unclosed").unwrap();
        assert!(matches!(
            ConnectionConfig::load_from(&path),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn partial_file_takes_defaults_and_camel_case_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "url = \"https://abcd.supabase.co\"\nanonKey = \"k\"\n").unwrap();
        let config = ConnectionConfig::load_from(&path).unwrap();
        assert_eq!(config.anon_key, "k");
        assert_eq!(config.table, DEFAULT_TABLE);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn debug_hides_key() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("anon-key"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
