//! Key transformation
//!
//! Converts an accepted wire record into the local storage representation.
//! Key material is decoded and length checked here, so a bad key surfaces as
//! a late rejection through the same channel as the validation policy.

use crate::core::validation::{ValidationPolicy, Verdict};
use crate::domain::{
    ExposureDownload, ExposureKeyData, RejectionReason, StoredTemporaryExposureKey,
};

/// Convert an accepted record
///
/// `transmission_risk_level` is the level decided by the policy, which may
/// differ from the incoming one.
///
/// # Errors
///
/// Returns [`RejectionReason::InvalidKeyData`] if the key is not base64 of
/// exactly 16 bytes, and [`RejectionReason::InvalidRollingWindow`] if the
/// window does not fit the stored field widths.
///
/// # Examples
///
/// ```
/// use keyfed::core::transform::to_internal;
/// use keyfed::domain::{ExposureDownload, ReportType, TestType};
///
/// let record = ExposureDownload {
///     key_data: "ogNW4Ra+Zdds1ZOOmyntDA==".to_string(),
///     rolling_start_number: 2_692_512,
///     transmission_risk_level: 2,
///     rolling_period: 144,
///     origin: "JE".to_string(),
///     regions: vec!["GB".to_string()],
///     test_type: TestType::LabResult,
///     report_type: ReportType::ConfirmedTest,
///     days_since_onset: 1,
/// };
///
/// let key = to_internal(&record, 7).unwrap();
/// assert_eq!(key.transmission_risk, 7);
/// assert_eq!(key.days_since_onset_of_symptoms, 1);
/// ```
pub fn to_internal(
    record: &ExposureDownload,
    transmission_risk_level: u8,
) -> Result<StoredTemporaryExposureKey, RejectionReason> {
    let key = ExposureKeyData::from_base64(&record.key_data)
        .map_err(|_| RejectionReason::InvalidKeyData)?;

    let rolling_start_number = u32::try_from(record.rolling_start_number)
        .map_err(|_| RejectionReason::InvalidRollingWindow)?;
    let rolling_period =
        u32::try_from(record.rolling_period).map_err(|_| RejectionReason::InvalidRollingWindow)?;

    Ok(StoredTemporaryExposureKey {
        key,
        rolling_start_number,
        rolling_period,
        transmission_risk: transmission_risk_level,
        days_since_onset_of_symptoms: record.days_since_onset,
    })
}

/// Validate and convert one record
///
/// # Errors
///
/// Returns the reason of the first failing policy rule, or of the key check.
pub fn validate_and_transform(
    policy: &ValidationPolicy,
    record: &ExposureDownload,
) -> Result<StoredTemporaryExposureKey, RejectionReason> {
    match policy.accept(record) {
        Verdict::Accepted {
            transmission_risk_level,
        } => to_internal(record, transmission_risk_level),
        Verdict::Rejected(reason) => Err(reason),
    }
}
