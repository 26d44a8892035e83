//! Wire records downloaded from the interop server
//!
//! These types mirror the JSON the federation server publishes. They are
//! untrusted until they pass the validation policy.

use serde::{Deserialize, Serialize};

/// Kind of test behind a diagnosis key
///
/// Unrecognised values deserialize to [`TestType::Unknown`] so that one odd
/// record is rejected on its own instead of failing the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestType {
    /// PCR test processed by a laboratory
    LabResult,
    /// Assisted lateral flow test
    RapidResult,
    /// Self-administered lateral flow test
    RapidSelfReported,
    /// Anything the server sent that we don't know
    #[serde(other)]
    Unknown,
}

/// How the diagnosis was reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    /// Report type not given by the origin
    Unknown,
    /// Confirmed by a test
    ConfirmedTest,
    /// Confirmed by a clinician without a test
    ConfirmedClinicalDiagnosis,
    /// Self reported
    SelfReport,
    /// Recursive
    Recursive,
    /// Revoked diagnosis
    Revoked,
    /// Any value not listed above
    #[serde(other)]
    Unrecognized,
}

/// A single diagnosis key as published by another national system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureDownload {
    /// Base64 encoded temporary exposure key
    pub key_data: String,

    /// First 10-minute interval the key was valid for
    pub rolling_start_number: i64,

    /// Risk level assigned by the origin
    pub transmission_risk_level: i64,

    /// Number of 10-minute intervals the key was valid for
    pub rolling_period: i64,

    /// Publishing national system
    pub origin: String,

    /// Regions the key applies to
    pub regions: Vec<String>,

    pub test_type: TestType,

    pub report_type: ReportType,

    pub days_since_onset: i32,
}
