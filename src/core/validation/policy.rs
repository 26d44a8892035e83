//! Validation policy for downloaded records
//!
//! Rules run in a fixed order and the first failing rule decides the
//! rejection reason:
//!
//! 1. origin is in the configured allow-list
//! 2. test type, report type and days since onset form a known combination
//! 3. risk level is overridden by the configured default, or must be in range
//! 4. rolling start number and rolling period are within protocol bounds
//! 5. at least one region is present

use crate::config::{DownloadConfig, MAX_TRANSMISSION_RISK_LEVEL};
use crate::domain::{ExposureDownload, RejectionReason, ReportType, TestType};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Length of one rolling interval in seconds
pub const ROLLING_INTERVAL_SECONDS: i64 = 600;

/// Intervals in one day, the longest a key can be valid for
pub const MAX_ROLLING_PERIOD: i64 = 144;

/// Keys whose window started longer ago than this are useless to devices
pub const MAX_KEY_AGE_DAYS: i64 = 15;

/// Days since onset of symptoms must lie in this range
pub const DAYS_SINCE_ONSET_RANGE: std::ops::RangeInclusive<i32> = -14..=14;

/// Outcome of applying the policy to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Record is acceptable; keys are stored with this risk level
    Accepted { transmission_risk_level: u8 },
    Rejected(RejectionReason),
}

/// Validation policy bound to one invocation's configuration and clock
///
/// # Examples
///
/// ```
/// use keyfed::core::validation::ValidationPolicy;
/// use chrono::Utc;
///
/// let policy = ValidationPolicy::new(vec!["JE".to_string()], None, Utc::now());
/// assert!(policy.is_valid_origin("JE"));
/// assert!(!policy.is_valid_origin("FR"));
/// ```
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    valid_origins: HashSet<String>,
    risk_level_override: Option<u8>,
    current_interval: i64,
}

impl ValidationPolicy {
    pub fn new(
        valid_origins: impl IntoIterator<Item = String>,
        risk_level_override: Option<u8>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            valid_origins: valid_origins.into_iter().collect(),
            risk_level_override,
            current_interval: now.timestamp().div_euclid(ROLLING_INTERVAL_SECONDS),
        }
    }

    pub fn from_config(config: &DownloadConfig, now: DateTime<Utc>) -> Self {
        let risk_level_override = config
            .download_risk_level_default_enabled
            .then_some(config.download_risk_level_default);

        Self::new(config.valid_origins.iter().cloned(), risk_level_override, now)
    }

    pub fn is_valid_origin(&self, origin: &str) -> bool {
        self.valid_origins.contains(origin)
    }

    /// Apply every rule in order
    pub fn accept(&self, record: &ExposureDownload) -> Verdict {
        if !self.is_valid_origin(&record.origin) {
            return Verdict::Rejected(RejectionReason::InvalidOrigin);
        }

        if !is_known_combination(record.test_type, record.report_type, record.days_since_onset) {
            return Verdict::Rejected(RejectionReason::InvalidTestReportCombo);
        }

        let transmission_risk_level = match self.risk_level(record.transmission_risk_level) {
            Some(level) => level,
            None => return Verdict::Rejected(RejectionReason::InvalidRiskLevel),
        };

        if !self.is_valid_rolling_window(record.rolling_start_number, record.rolling_period) {
            return Verdict::Rejected(RejectionReason::InvalidRollingWindow);
        }

        if record.regions.iter().all(|r| r.trim().is_empty()) {
            return Verdict::Rejected(RejectionReason::MissingRegions);
        }

        Verdict::Accepted {
            transmission_risk_level,
        }
    }

    fn risk_level(&self, incoming: i64) -> Option<u8> {
        if let Some(default) = self.risk_level_override {
            return Some(default);
        }

        u8::try_from(incoming)
            .ok()
            .filter(|level| *level <= MAX_TRANSMISSION_RISK_LEVEL)
    }

    fn is_valid_rolling_window(&self, rolling_start_number: i64, rolling_period: i64) -> bool {
        let oldest = self.current_interval - MAX_KEY_AGE_DAYS * MAX_ROLLING_PERIOD;

        rolling_start_number > 0
            && rolling_start_number <= self.current_interval
            && rolling_start_number >= oldest
            && (1..=MAX_ROLLING_PERIOD).contains(&rolling_period)
    }
}

/// Recognised test and report pairings
fn is_known_combination(test_type: TestType, report_type: ReportType, days_since_onset: i32) -> bool {
    let pairing = matches!(
        (test_type, report_type),
        (TestType::LabResult, ReportType::ConfirmedTest)
            | (TestType::RapidResult, ReportType::ConfirmedTest)
            | (TestType::RapidSelfReported, ReportType::SelfReport)
    );

    pairing && DAYS_SINCE_ONSET_RANGE.contains(&days_since_onset)
}

/// Apply the policy built from `config` to a single record
pub fn accept(record: &ExposureDownload, config: &DownloadConfig, now: DateTime<Utc>) -> Verdict {
    ValidationPolicy::from_config(config, now).accept(record)
}
