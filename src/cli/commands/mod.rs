//! CLI command implementations
//!
//! This module contains all CLI command implementations and the mapping from
//! errors to process exit codes.

pub mod download;
pub mod status;
pub mod validate;

use crate::domain::{InteropError, KeyFedError};

/// Run completed (including a feature-flag no-op)
pub const EXIT_OK: i32 = 0;
/// Configuration or secret could not be resolved
pub const EXIT_CONFIG: i32 = 2;
/// Transient failure; the scheduler should retry the invocation
pub const EXIT_RETRYABLE: i32 = 3;
/// The interop server returned a batch that cannot be parsed
pub const EXIT_MALFORMED: i32 = 4;
/// Any other fatal error
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a failed invocation
pub fn exit_code_for(error: &KeyFedError) -> i32 {
    match error {
        KeyFedError::Configuration(_) | KeyFedError::Secret(_) => EXIT_CONFIG,
        KeyFedError::Interop(InteropError::MalformedResponse(_)) => EXIT_MALFORMED,
        e if e.is_retryable() => EXIT_RETRYABLE,
        _ => EXIT_FATAL,
    }
}
