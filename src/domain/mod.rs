//! Domain models and types for keyfed.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`BatchTag`], [`SecretName`])
//! - **Wire records** ([`ExposureDownload`], [`TestType`], [`ReportType`])
//! - **Stored keys** ([`StoredTemporaryExposureKey`], [`ExposureKeyData`])
//! - **Progress records** ([`FederationBatch`], [`UploadState`])
//! - **Error types** ([`KeyFedError`], [`InteropError`], [`RejectionReason`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, KeyFedError>`]:
//!
//! ```rust
//! use keyfed::domain::{KeyFedError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(KeyFedError::Configuration("WORKSPACE is not set".to_string()))
//! }
//! ```

pub mod batch;
pub mod errors;
pub mod exposure;
pub mod ids;
pub mod key;
pub mod result;

pub use batch::{FederationBatch, UploadState};
pub use errors::{InteropError, KeyFedError, RejectionReason};
pub use exposure::{ExposureDownload, ReportType, TestType};
pub use ids::{BatchTag, SecretName};
pub use key::{ExposureKeyData, StoredTemporaryExposureKey, StoredTemporaryExposureKeyPayload};
pub use result::Result;
