//! Persisted state record

use crate::domain::{FederationBatch, UploadState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed key of the single progress record
pub const PROCESSOR_STATE_ID: &str = "federation-download";

/// The single keyed progress record
///
/// Serialized as-is by the file backend; the PostgreSQL backend maps the
/// same fields onto columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorStateRecord {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_federation_batch: Option<FederationBatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_upload_timestamp: Option<DateTime<Utc>>,
}

impl ProcessorStateRecord {
    pub fn empty() -> Self {
        Self {
            id: PROCESSOR_STATE_ID.to_string(),
            ..Default::default()
        }
    }

    pub fn upload_state(&self) -> Option<UploadState> {
        self.last_upload_timestamp
            .map(|last_upload_timestamp| UploadState {
                last_upload_timestamp,
            })
    }
}
