//! Configuration schema types
//!
//! This module defines the configuration structure for keyfed. Values are
//! resolved once per invocation by [`crate::config::loader`].

use crate::config::SecretString;
use crate::domain::SecretName;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Highest transmission risk level the exposure notification protocol allows
pub const MAX_TRANSMISSION_RISK_LEVEL: u8 = 7;

/// Environment keys
pub mod keys {
    pub const WORKSPACE: &str = "WORKSPACE";
    pub const MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT: &str = "MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT";
    pub const INITIAL_DOWNLOAD_HISTORY_DAYS: &str = "INITIAL_DOWNLOAD_HISTORY_DAYS";
    pub const DOWNLOAD_ENABLED_WORKSPACES: &str = "DOWNLOAD_ENABLED_WORKSPACES";
    pub const DOWNLOAD_RISK_LEVEL_DEFAULT_ENABLED: &str = "DOWNLOAD_RISK_LEVEL_DEFAULT_ENABLED";
    pub const DOWNLOAD_RISK_LEVEL_DEFAULT: &str = "DOWNLOAD_RISK_LEVEL_DEFAULT";
    pub const SUBMISSION_BUCKET_NAME: &str = "SUBMISSION_BUCKET_NAME";
    pub const INTEROP_BASE_URL: &str = "INTEROP_BASE_URL";
    pub const INTEROP_AUTH_TOKEN_SECRET_NAME: &str = "INTEROP_AUTH_TOKEN_SECRET_NAME";
    pub const FEDERATED_KEY_DOWNLOAD_PREFIX: &str = "FEDERATED_KEY_DOWNLOAD_PREFIX";
    pub const PROCESSOR_STATE_TABLE: &str = "PROCESSOR_STATE_TABLE";
    pub const VALID_DOWNLOAD_ORIGINS: &str = "VALID_DOWNLOAD_ORIGINS";

    pub const INTEROP_REQUEST_TIMEOUT_SECONDS: &str = "INTEROP_REQUEST_TIMEOUT_SECONDS";
    pub const DOWNLOAD_MAX_RUNTIME_SECONDS: &str = "DOWNLOAD_MAX_RUNTIME_SECONDS";
    pub const STATE_BACKEND: &str = "STATE_BACKEND";
    pub const PROCESSOR_STATE_DATABASE_URL: &str = "PROCESSOR_STATE_DATABASE_URL";
    pub const STATE_STORE_TIMEOUT_SECONDS: &str = "STATE_STORE_TIMEOUT_SECONDS";
    pub const STATE_FILE_DIR: &str = "STATE_FILE_DIR";
    pub const SINK_ROOT_DIR: &str = "SINK_ROOT_DIR";
    pub const SECRETS_DIR: &str = "SECRETS_DIR";

    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_LOCAL_ENABLED: &str = "LOG_LOCAL_ENABLED";
    pub const LOG_LOCAL_PATH: &str = "LOG_LOCAL_PATH";
    pub const LOG_LOCAL_ROTATION: &str = "LOG_LOCAL_ROTATION";
}

/// Feature flag evaluated against the current workspace
///
/// # Examples
///
/// ```
/// use keyfed::config::WorkspaceFeatureFlag;
///
/// let flag = WorkspaceFeatureFlag::new("prod", vec!["prod".to_string()]);
/// assert!(flag.is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFeatureFlag {
    workspace: String,
    enabled_workspaces: Vec<String>,
}

impl WorkspaceFeatureFlag {
    pub fn new(workspace: impl Into<String>, enabled_workspaces: Vec<String>) -> Self {
        Self {
            workspace: workspace.into(),
            enabled_workspaces,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled_workspaces.iter().any(|w| w == &self.workspace)
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }
}

/// State store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateBackend {
    /// PostgreSQL table
    PostgreSQL,
    /// JSON document on the local filesystem
    File,
}

impl FromStr for StateBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(Self::PostgreSQL),
            "file" => Ok(Self::File),
            other => Err(format!(
                "Invalid state backend '{other}'. Must be one of: postgresql, file"
            )),
        }
    }
}

/// State store configuration
#[derive(Debug, Clone)]
pub struct StateConfig {
    pub backend: StateBackend,

    /// Table holding the single progress record
    pub table_name: String,

    /// Connection string, required for the PostgreSQL backend
    pub database_url: Option<SecretString>,

    pub timeout_seconds: u64,

    /// Directory for the file backend
    pub file_dir: PathBuf,
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if !is_sql_identifier(&self.table_name) {
            return Err(format!(
                "PROCESSOR_STATE_TABLE '{}' must be a plain identifier (letters, digits, underscores)",
                self.table_name
            ));
        }

        if self.backend == StateBackend::PostgreSQL && self.database_url.is_none() {
            return Err(
                "PROCESSOR_STATE_DATABASE_URL is required when STATE_BACKEND = postgresql"
                    .to_string(),
            );
        }

        if self.timeout_seconds == 0 {
            return Err("STATE_STORE_TIMEOUT_SECONDS must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON file logging
    pub local_enabled: bool,

    /// Directory for log files
    pub local_path: String,

    /// Rotation strategy (daily, hourly)
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            local_enabled: false,
            local_path: "./logs".to_string(),
            local_rotation: "daily".to_string(),
        }
    }
}

impl LoggingConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid LOG_LOCAL_ROTATION '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        Ok(())
    }
}

/// Federated key download configuration
///
/// Immutable once resolved; one instance per invocation.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Upper bound on batches fetched in one invocation
    pub max_subsequent_batch_download_count: u32,

    /// How far back the first ever fetch starts
    pub initial_download_history_days: u32,

    pub download_feature_flag: WorkspaceFeatureFlag,

    /// Replace incoming risk levels with `download_risk_level_default`
    pub download_risk_level_default_enabled: bool,

    pub download_risk_level_default: u8,

    pub submission_bucket_name: String,

    pub interop_base_url: String,

    pub interop_auth_token_secret_name: SecretName,

    pub federated_key_download_prefix: String,

    /// Origins whose keys are accepted
    pub valid_origins: Vec<String>,

    pub request_timeout_seconds: u64,

    /// Optional wall-clock budget for one invocation
    pub max_runtime: Option<Duration>,

    pub state: StateConfig,

    /// Root directory of the filesystem object sink
    pub sink_root_dir: PathBuf,

    /// Directory of mounted secrets; secrets come from the environment when unset
    pub secrets_dir: Option<PathBuf>,

    pub logging: LoggingConfig,
}

impl DownloadConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        if self.max_subsequent_batch_download_count == 0 {
            return Err("MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT must be at least 1".to_string());
        }

        if self.download_risk_level_default > MAX_TRANSMISSION_RISK_LEVEL {
            return Err(format!(
                "DOWNLOAD_RISK_LEVEL_DEFAULT must be between 0 and {MAX_TRANSMISSION_RISK_LEVEL}, got {}",
                self.download_risk_level_default
            ));
        }

        match url::Url::parse(&self.interop_base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(format!(
                    "INTEROP_BASE_URL must use http or https, got '{}'",
                    url.scheme()
                ))
            }
            Err(e) => return Err(format!("INTEROP_BASE_URL is not a valid URL: {e}")),
        }

        if self.valid_origins.is_empty() {
            return Err("VALID_DOWNLOAD_ORIGINS must list at least one origin".to_string());
        }

        if self.submission_bucket_name.trim().is_empty()
            || self.submission_bucket_name.contains("..")
            || self.submission_bucket_name.contains('/')
        {
            return Err(format!(
                "SUBMISSION_BUCKET_NAME '{}' is not a valid bucket name",
                self.submission_bucket_name
            ));
        }

        if self.request_timeout_seconds == 0 {
            return Err("INTEROP_REQUEST_TIMEOUT_SECONDS must be greater than 0".to_string());
        }

        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Whether this workspace is allowed to download
    pub fn download_enabled(&self) -> bool {
        self.download_feature_flag.is_enabled()
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_config;
    use super::*;

    #[test]
    fn test_sample_config_is_valid() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_feature_flag() {
        let enabled = WorkspaceFeatureFlag::new("te-prod", vec!["te-prod".to_string()]);
        assert!(enabled.is_enabled());

        let disabled = WorkspaceFeatureFlag::new("te-dev", vec!["te-prod".to_string()]);
        assert!(!disabled.is_enabled());

        let empty = WorkspaceFeatureFlag::new("te-prod", vec![]);
        assert!(!empty.is_enabled());
    }

    #[test]
    fn test_zero_batch_count_rejected() {
        let mut config = sample_config();
        config.max_subsequent_batch_download_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_risk_default_out_of_range_rejected() {
        let mut config = sample_config();
        config.download_risk_level_default = 8;
        let err = config.validate().unwrap_err();
        assert!(err.contains("DOWNLOAD_RISK_LEVEL_DEFAULT"));
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut config = sample_config();
        config.interop_base_url = "ftp://interop.example.com".to_string();
        assert!(config.validate().is_err());

        config.interop_base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_table_name_must_be_identifier() {
        let mut config = sample_config();
        config.state.table_name = "state; DROP TABLE x".to_string();
        assert!(config.validate().is_err());

        config.state.table_name = "federation_state_2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_backend_requires_url() {
        let mut config = sample_config();
        config.state.backend = StateBackend::PostgreSQL;
        assert!(config.validate().is_err());

        config.state.database_url = Some(crate::config::secret_string(
            "postgresql://keyfed@localhost/keyfed".to_string(),
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_state_backend_from_str() {
        assert_eq!(
            StateBackend::from_str("PostgreSQL").unwrap(),
            StateBackend::PostgreSQL
        );
        assert_eq!(StateBackend::from_str("file").unwrap(), StateBackend::File);
        assert!(StateBackend::from_str("dynamodb").is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = sample_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
