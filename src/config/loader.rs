//! Configuration loader reading the process environment
//!
//! Every value is resolved once per invocation. Missing or unparseable
//! required values are collected and reported together, before any state is
//! touched.

use super::schema::{
    keys, DownloadConfig, LoggingConfig, StateBackend, StateConfig, WorkspaceFeatureFlag,
};
use super::secret_string;
use crate::domain::errors::KeyFedError;
use crate::domain::result::Result;
use crate::domain::SecretName;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Loads configuration from the process environment
///
/// # Errors
///
/// Returns `KeyFedError::Configuration` listing every missing or invalid value.
///
/// # Examples
///
/// ```no_run
/// use keyfed::config::loader::load_config;
///
/// let config = load_config().expect("Failed to load config");
/// ```
pub fn load_config() -> Result<DownloadConfig> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Loads configuration from an arbitrary key lookup
///
/// `load_config` is this function applied to `std::env::var`; tests pass a
/// map lookup instead of mutating the process environment.
pub fn load_config_from<F>(lookup: F) -> Result<DownloadConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = EnvReader::new(&lookup);

    let workspace = env.required::<String>(keys::WORKSPACE);
    let enabled_workspaces = env.required_list(keys::DOWNLOAD_ENABLED_WORKSPACES);
    let max_batches = env.required::<u32>(keys::MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT);
    let history_days = env.required::<u32>(keys::INITIAL_DOWNLOAD_HISTORY_DAYS);
    let risk_default_enabled = env.required_bool(keys::DOWNLOAD_RISK_LEVEL_DEFAULT_ENABLED);
    let risk_default = env.required::<u8>(keys::DOWNLOAD_RISK_LEVEL_DEFAULT);
    let bucket = env.required::<String>(keys::SUBMISSION_BUCKET_NAME);
    let base_url = env.required::<String>(keys::INTEROP_BASE_URL);
    let secret_name = env.required::<SecretName>(keys::INTEROP_AUTH_TOKEN_SECRET_NAME);
    let prefix = env.required::<String>(keys::FEDERATED_KEY_DOWNLOAD_PREFIX);
    let table_name = env.required::<String>(keys::PROCESSOR_STATE_TABLE);
    let valid_origins = env.required_list(keys::VALID_DOWNLOAD_ORIGINS);

    let request_timeout_seconds = env.defaulted(keys::INTEROP_REQUEST_TIMEOUT_SECONDS, 30u64);
    let max_runtime = env
        .optional::<u64>(keys::DOWNLOAD_MAX_RUNTIME_SECONDS)
        .map(Duration::from_secs);
    let backend = env.defaulted(keys::STATE_BACKEND, StateBackend::PostgreSQL);
    let database_url = env
        .optional::<String>(keys::PROCESSOR_STATE_DATABASE_URL)
        .map(secret_string);
    let state_timeout_seconds = env.defaulted(keys::STATE_STORE_TIMEOUT_SECONDS, 30u64);
    let state_file_dir = env.defaulted(keys::STATE_FILE_DIR, PathBuf::from("./state"));
    let sink_root_dir = env.defaulted(keys::SINK_ROOT_DIR, PathBuf::from("./objects"));
    let secrets_dir = env.optional::<PathBuf>(keys::SECRETS_DIR);

    let logging = read_logging(&mut env);

    let errors = env.into_errors();
    if !errors.is_empty() {
        return Err(KeyFedError::Configuration(errors.join("; ")));
    }

    // Every required value is present once `errors` is empty.
    let config = match (
        workspace,
        enabled_workspaces,
        max_batches,
        history_days,
        risk_default_enabled,
        risk_default,
        bucket,
        base_url,
        secret_name,
        prefix,
        table_name,
        valid_origins,
    ) {
        (
            Some(workspace),
            Some(enabled_workspaces),
            Some(max_subsequent_batch_download_count),
            Some(initial_download_history_days),
            Some(download_risk_level_default_enabled),
            Some(download_risk_level_default),
            Some(submission_bucket_name),
            Some(interop_base_url),
            Some(interop_auth_token_secret_name),
            Some(federated_key_download_prefix),
            Some(table_name),
            Some(valid_origins),
        ) => DownloadConfig {
            max_subsequent_batch_download_count,
            initial_download_history_days,
            download_feature_flag: WorkspaceFeatureFlag::new(workspace, enabled_workspaces),
            download_risk_level_default_enabled,
            download_risk_level_default,
            submission_bucket_name,
            interop_base_url,
            interop_auth_token_secret_name,
            federated_key_download_prefix: federated_key_download_prefix
                .trim_matches('/')
                .to_string(),
            valid_origins,
            request_timeout_seconds,
            max_runtime,
            state: StateConfig {
                backend,
                table_name,
                database_url,
                timeout_seconds: state_timeout_seconds,
                file_dir: state_file_dir,
            },
            sink_root_dir,
            secrets_dir,
            logging,
        },
        _ => {
            return Err(KeyFedError::Configuration(
                "Incomplete configuration".to_string(),
            ))
        }
    };

    config.validate().map_err(|e| {
        KeyFedError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Loads only the logging section from the process environment
///
/// Never fails: unparseable values fall back to their defaults. The binary
/// calls this before the full configuration is resolved so that
/// configuration errors themselves are logged.
pub fn load_logging_config() -> LoggingConfig {
    load_logging_config_from(|key| std::env::var(key).ok())
}

pub fn load_logging_config_from<F>(lookup: F) -> LoggingConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = EnvReader::new(&lookup);
    read_logging(&mut env)
}

fn read_logging<F: Fn(&str) -> Option<String>>(env: &mut EnvReader<'_, F>) -> LoggingConfig {
    let defaults = LoggingConfig::default();
    LoggingConfig {
        level: env.defaulted(keys::LOG_LEVEL, defaults.level),
        local_enabled: env.defaulted_bool(keys::LOG_LOCAL_ENABLED, defaults.local_enabled),
        local_path: env.defaulted(keys::LOG_LOCAL_PATH, defaults.local_path),
        local_rotation: env.defaulted(keys::LOG_LOCAL_ROTATION, defaults.local_rotation),
    }
}

/// Typed access to environment values, accumulating problems as it goes
struct EnvReader<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
    errors: Vec<String>,
}

impl<'a, F: Fn(&str) -> Option<String>> EnvReader<'a, F> {
    fn new(lookup: &'a F) -> Self {
        Self {
            lookup,
            errors: Vec::new(),
        }
    }

    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&mut self, key: &str, raw: &str) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(format!("{key} has invalid value '{raw}': {e}"));
                None
            }
        }
    }

    fn required<T: FromStr>(&mut self, key: &str) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        match self.raw(key) {
            Some(raw) => self.parse(key, &raw),
            None => {
                self.errors.push(format!("{key} is required"));
                None
            }
        }
    }

    fn optional<T: FromStr>(&mut self, key: &str) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.raw(key)?;
        self.parse(key, &raw)
    }

    fn defaulted<T: FromStr>(&mut self, key: &str, default: T) -> T
    where
        T::Err: std::fmt::Display,
    {
        self.optional(key).unwrap_or(default)
    }

    fn required_bool(&mut self, key: &str) -> Option<bool> {
        match self.raw(key) {
            Some(raw) => self.parse_bool(key, &raw),
            None => {
                self.errors.push(format!("{key} is required"));
                None
            }
        }
    }

    fn defaulted_bool(&mut self, key: &str, default: bool) -> bool {
        match self.raw(key) {
            Some(raw) => self.parse_bool(key, &raw).unwrap_or(default),
            None => default,
        }
    }

    fn parse_bool(&mut self, key: &str, raw: &str) -> Option<bool> {
        match raw.to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => {
                self.errors
                    .push(format!("{key} must be 'true' or 'false', got '{raw}'"));
                None
            }
        }
    }

    /// Comma-separated list; an empty list is allowed but the key must be set
    fn required_list(&mut self, key: &str) -> Option<Vec<String>> {
        match (self.lookup)(key) {
            Some(raw) => Some(
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            None => {
                self.errors.push(format!("{key} is required"));
                None
            }
        }
    }

    fn into_errors(self) -> Vec<String> {
        self.errors
    }
}
