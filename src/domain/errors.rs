//! Domain error types
//!
//! This module defines the error hierarchy for keyfed. All errors are
//! domain-specific and don't expose third-party types.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Main keyfed error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum KeyFedError {
    /// Configuration-related errors (missing or invalid environment values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors talking to the interop server
    #[error("Interop error: {0}")]
    Interop(#[from] InteropError),

    /// State store errors
    #[error("State store error: {0}")]
    State(String),

    /// Object sink errors
    #[error("Object sink error: {0}")]
    Sink(String),

    /// Secret resolution errors
    #[error("Secret error: {0}")]
    Secret(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl KeyFedError {
    /// Whether retrying the whole invocation can be expected to succeed
    ///
    /// Network failures, any non-2xx interop response and state store
    /// failures are retryable. Malformed responses, configuration and secret
    /// problems are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            KeyFedError::Interop(e) => e.is_retryable(),
            KeyFedError::State(_) | KeyFedError::Sink(_) | KeyFedError::Io(_) => true,
            _ => false,
        }
    }

    /// Short machine-readable kind, used as the `error_kind` log field
    pub fn kind(&self) -> &'static str {
        match self {
            KeyFedError::Configuration(_) => "configuration",
            KeyFedError::Interop(InteropError::MalformedResponse(_)) => "malformed_response",
            KeyFedError::Interop(_) => "interop",
            KeyFedError::State(_) => "state_store",
            KeyFedError::Sink(_) => "object_sink",
            KeyFedError::Secret(_) => "secret",
            KeyFedError::Validation(_) => "validation",
            KeyFedError::Serialization(_) => "serialization",
            KeyFedError::Io(_) => "io",
            KeyFedError::Other(_) => "other",
        }
    }
}

/// Interop server errors
///
/// Errors that occur when fetching batches from the federation server.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum InteropError {
    /// Failed to connect to the interop server
    #[error("Failed to connect to interop server: {0}")]
    ConnectionFailed(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Too many requests (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Credential rejected (401/403)
    #[error("Authentication failed with status {status}")]
    AuthenticationFailed { status: u16 },

    /// Client error (other 4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Body could not be parsed into a batch
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl InteropError {
    /// Whether the same request may succeed if retried later
    ///
    /// Every non-2xx status counts, including 401/403: the token is resolved
    /// once per invocation, so a rotated credential is picked up by the next
    /// attempt. Only an unparseable body is final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, InteropError::MalformedResponse(_))
    }
}

/// Why a downloaded record was not accepted
///
/// Rejections are counted and skipped; they never abort a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectionReason {
    /// Origin is not in the configured allow-list
    InvalidOrigin,
    /// Test type, report type and days since onset don't form a known combination
    InvalidTestReportCombo,
    /// Transmission risk level outside the valid range
    InvalidRiskLevel,
    /// Rolling start number or rolling period out of bounds
    InvalidRollingWindow,
    /// No regions attached to the record
    MissingRegions,
    /// Key material is not valid base64 or has the wrong length
    InvalidKeyData,
}

impl RejectionReason {
    /// Stable kebab-case label for logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::InvalidOrigin => "invalid-origin",
            RejectionReason::InvalidTestReportCombo => "invalid-test-report-combo",
            RejectionReason::InvalidRiskLevel => "invalid-risk-level",
            RejectionReason::InvalidRollingWindow => "invalid-rolling-window",
            RejectionReason::MissingRegions => "missing-regions",
            RejectionReason::InvalidKeyData => "invalid-key-data",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RejectionReason {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl From<std::io::Error> for KeyFedError {
    fn from(err: std::io::Error) -> Self {
        KeyFedError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KeyFedError {
    fn from(err: serde_json::Error) -> Self {
        KeyFedError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyfed_error_display() {
        let err = KeyFedError::Configuration("Missing WORKSPACE".to_string());
        assert_eq!(err.to_string(), "Configuration error: Missing WORKSPACE");
    }

    #[test]
    fn test_interop_error_conversion() {
        let interop_err = InteropError::ConnectionFailed("Network error".to_string());
        let err: KeyFedError = interop_err.into();
        assert!(matches!(err, KeyFedError::Interop(_)));
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(InteropError::Timeout("30s".to_string()).is_retryable());
        assert!(InteropError::ServerError {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(InteropError::RateLimited("slow down".to_string()).is_retryable());
        assert!(KeyFedError::State("conflict".to_string()).is_retryable());
        assert!(KeyFedError::Sink("disk full".to_string()).is_retryable());
    }

    #[test]
    fn test_rejected_requests_are_retryable() {
        let auth: KeyFedError = InteropError::AuthenticationFailed { status: 401 }.into();
        assert!(auth.is_retryable());
        assert!(InteropError::AuthenticationFailed { status: 403 }.is_retryable());
        assert!(InteropError::ClientError {
            status: 404,
            message: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_malformed_and_config_errors_are_not_retryable() {
        let malformed: KeyFedError = InteropError::MalformedResponse("eof".to_string()).into();
        assert!(!malformed.is_retryable());
        assert_eq!(malformed.kind(), "malformed_response");

        assert!(!KeyFedError::Configuration("x".to_string()).is_retryable());
        assert!(!KeyFedError::Secret("x".to_string()).is_retryable());
    }

    #[test]
    fn test_rejection_reason_labels() {
        assert_eq!(RejectionReason::InvalidOrigin.to_string(), "invalid-origin");
        assert_eq!(
            RejectionReason::InvalidTestReportCombo.as_str(),
            "invalid-test-report-combo"
        );
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: KeyFedError = json_err.into();
        assert!(matches!(err, KeyFedError::Serialization(_)));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = KeyFedError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
