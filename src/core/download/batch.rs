//! Batch processing for downloaded keys
//!
//! This module validates and transforms the records of one downloaded batch
//! and writes the accepted keys to the object sink as a single object.

use super::checksum::calculate_checksum_bytes;
use super::summary::BatchReport;
use crate::adapters::sink::{ObjectKey, ObjectSink};
use crate::core::transform::validate_and_transform;
use crate::core::validation::ValidationPolicy;
use crate::domain::{
    BatchTag, ExposureDownload, RejectionReason, Result, StoredTemporaryExposureKeyPayload,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of processing a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Number of keys written to the sink
    pub accepted: usize,
    /// Number of records rejected
    pub rejected: usize,
    pub rejections_by_reason: BTreeMap<RejectionReason, usize>,
    /// Object written, if any key was accepted
    pub object_key: Option<ObjectKey>,
    pub checksum: Option<String>,
}

impl BatchResult {
    pub fn add_rejection(&mut self, reason: RejectionReason) {
        self.rejected += 1;
        *self.rejections_by_reason.entry(reason).or_default() += 1;
    }

    /// Report line for the invocation summary
    pub fn to_report(&self, batch_tag: &BatchTag, batch_date: NaiveDate) -> BatchReport {
        BatchReport {
            batch_tag: batch_tag.clone(),
            batch_date,
            accepted: self.accepted,
            rejected: self.rejected,
            object_key: self.object_key.as_ref().map(|k| k.as_str().to_string()),
            checksum: self.checksum.clone(),
        }
    }
}

/// Batch processor for downloaded keys
pub struct BatchProcessor {
    sink: Arc<dyn ObjectSink>,
    prefix: String,
}

impl BatchProcessor {
    pub fn new(sink: Arc<dyn ObjectSink>, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
        }
    }

    /// Validate, transform and store one batch
    ///
    /// Rejected records are counted and skipped. When at least one key is
    /// accepted they are all written as one object keyed by the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized or the sink write
    /// fails. The batch must then not be committed.
    pub async fn process_batch(
        &self,
        policy: &ValidationPolicy,
        batch_tag: &BatchTag,
        batch_date: NaiveDate,
        exposures: &[ExposureDownload],
    ) -> Result<BatchResult> {
        let mut result = BatchResult::default();
        let mut keys = Vec::with_capacity(exposures.len());

        for record in exposures {
            match validate_and_transform(policy, record) {
                Ok(key) => keys.push(key),
                Err(reason) => {
                    crate::log_key_rejected!(batch_tag, record.origin, reason);
                    result.add_rejection(reason);
                }
            }
        }

        result.accepted = keys.len();

        if keys.is_empty() {
            tracing::info!(
                batch_tag = %batch_tag,
                rejected = result.rejected,
                "No keys accepted, nothing to store"
            );
            return Ok(result);
        }

        let body = serde_json::to_vec(&StoredTemporaryExposureKeyPayload::new(keys))?;
        let checksum = calculate_checksum_bytes(&body);
        let key = ObjectKey::for_batch(&self.prefix, batch_date, batch_tag);

        self.sink.put_object(&key, body).await?;

        tracing::info!(
            batch_tag = %batch_tag,
            object_key = %key,
            accepted = result.accepted,
            rejected = result.rejected,
            checksum = %checksum,
            "Stored downloaded keys"
        );

        result.object_key = Some(key);
        result.checksum = Some(checksum);
        Ok(result)
    }
}
