//! Configuration management for keyfed.
//!
//! Configuration is resolved once per invocation from the process environment
//! (the binary seeds it from a `.env` file when one is present).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use keyfed::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//!
//! println!("Interop server: {}", config.interop_base_url);
//! println!("Max batches per run: {}", config.max_subsequent_batch_download_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Required Variables
//!
//! ```bash
//! export WORKSPACE="te-prod"
//! export MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT=100
//! export INITIAL_DOWNLOAD_HISTORY_DAYS=14
//! export DOWNLOAD_ENABLED_WORKSPACES="te-prod,te-staging"
//! export DOWNLOAD_RISK_LEVEL_DEFAULT_ENABLED=true
//! export DOWNLOAD_RISK_LEVEL_DEFAULT=7
//! export SUBMISSION_BUCKET_NAME="te-prod-submissions"
//! export INTEROP_BASE_URL="https://interop.example.com"
//! export INTEROP_AUTH_TOKEN_SECRET_NAME="interop-auth-token"
//! export FEDERATED_KEY_DOWNLOAD_PREFIX="federatedKeyDownload"
//! export PROCESSOR_STATE_TABLE="federation_key_proc_history"
//! export VALID_DOWNLOAD_ORIGINS="GB-NIR,GB-SCT,JE"
//! ```
//!
//! See [`schema::keys`] for the optional, defaulted variables.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_from, load_logging_config, load_logging_config_from};
pub use schema::{
    DownloadConfig, LoggingConfig, StateBackend, StateConfig, WorkspaceFeatureFlag,
    MAX_TRANSMISSION_RISK_LEVEL,
};
pub use secret::{secret_string, SecretString, SecretValue};
