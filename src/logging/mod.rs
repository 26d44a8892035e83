//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with span timings
//! - Configurable log levels, overridable through `RUST_LOG`
//! - JSON file logging with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use keyfed::logging::init_logging;
//! use keyfed::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a record rejected by the validation policy
///
/// # Example
///
/// ```no_run
/// use keyfed::log_key_rejected;
/// use keyfed::domain::RejectionReason;
///
/// log_key_rejected!("tag-1", "FR", RejectionReason::InvalidOrigin);
/// ```
#[macro_export]
macro_rules! log_key_rejected {
    ($batch_tag:expr, $origin:expr, $reason:expr) => {
        tracing::warn!(
            batch_tag = %$batch_tag,
            origin = %$origin,
            reason = %$reason,
            "Rejected downloaded key"
        );
    };
}

/// Log a fatal error as a structured event
///
/// Carries the `error_kind` and `retryable` fields the scheduler keys on.
///
/// # Example
///
/// ```no_run
/// use keyfed::log_fatal_error;
/// use keyfed::domain::KeyFedError;
///
/// let error = KeyFedError::Configuration("WORKSPACE is not set".to_string());
/// log_fatal_error!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_fatal_error {
    ($error:expr, $message:literal) => {
        tracing::error!(
            error_kind = $error.kind(),
            retryable = $error.is_retryable(),
            error = %$error,
            $message
        );
    };
}
