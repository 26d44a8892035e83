//! Download summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of
//! one invocation. Nothing here is persisted beyond the last-run timestamp.

use crate::domain::{BatchTag, RejectionReason};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Whether the invocation did anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Feature flag off for this workspace; nothing was read or written
    Disabled,
    /// The loop ran to one of its stop conditions
    Completed,
}

/// Why the batch loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The server had no further batch
    EndOfBatches,
    /// `MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT` batches were processed
    BatchLimitReached,
    /// The wall-clock budget ran out before the next fetch
    TimeBudgetExhausted,
    /// The server returned the tag it was asked for
    NoProgress,
    FeatureDisabled,
}

/// Outcome of one committed batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_tag: BatchTag,
    pub batch_date: NaiveDate,
    pub accepted: usize,
    pub rejected: usize,

    /// Absent when no key was accepted and nothing was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,

    /// SHA-256 of the written object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Summary of a download invocation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSummary {
    pub invocation_id: Uuid,
    pub status: RunStatus,
    pub last_processed_timestamp: DateTime<Utc>,
    pub batches_processed: usize,
    pub keys_accepted: usize,
    pub keys_rejected: usize,
    pub rejections_by_reason: BTreeMap<RejectionReason, usize>,
    pub batches: Vec<BatchReport>,
    pub stop_reason: StopReason,

    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl DownloadSummary {
    /// Start a summary for a run beginning at `started_at`
    pub fn new(invocation_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            invocation_id,
            status: RunStatus::Completed,
            last_processed_timestamp: started_at,
            batches_processed: 0,
            keys_accepted: 0,
            keys_rejected: 0,
            rejections_by_reason: BTreeMap::new(),
            batches: Vec::new(),
            stop_reason: StopReason::EndOfBatches,
            duration: Duration::ZERO,
        }
    }

    /// The no-op summary of a run with the feature flag off
    pub fn disabled(invocation_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            status: RunStatus::Disabled,
            stop_reason: StopReason::FeatureDisabled,
            ..Self::new(invocation_id, at)
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add a committed batch
    pub fn record_batch(
        &mut self,
        report: BatchReport,
        rejections: &BTreeMap<RejectionReason, usize>,
    ) {
        self.batches_processed += 1;
        self.keys_accepted += report.accepted;
        self.keys_rejected += report.rejected;
        for (reason, count) in rejections {
            *self.rejections_by_reason.entry(*reason).or_default() += count;
        }
        self.batches.push(report);
    }

    pub fn is_disabled(&self) -> bool {
        self.status == RunStatus::Disabled
    }

    /// Log the summary
    pub fn log_summary(&self) {
        if self.is_disabled() {
            tracing::info!(
                invocation_id = %self.invocation_id,
                "Download disabled for this workspace, nothing done"
            );
            return;
        }

        tracing::info!(
            invocation_id = %self.invocation_id,
            batches_processed = self.batches_processed,
            keys_accepted = self.keys_accepted,
            keys_rejected = self.keys_rejected,
            stop_reason = ?self.stop_reason,
            duration_ms = self.duration.as_millis() as u64,
            "Download completed"
        );

        for (reason, count) in &self.rejections_by_reason {
            tracing::info!(reason = %reason, count, "Rejected keys");
        }
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}
