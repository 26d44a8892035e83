//! Interop server API models

use crate::domain::{BatchTag, ExposureDownload};
use serde::Deserialize;

/// Body of `GET /diagnosiskeys/download/{date}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisKeysDownloadResponse {
    /// Tag of the batch contained in this response; absent at end of day
    #[serde(default)]
    pub batch_tag: Option<BatchTag>,

    #[serde(default)]
    pub exposures: Vec<ExposureDownload>,
}

/// One page fetched from the interop server
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBatch {
    /// Records of the batch, unvalidated
    pub exposures: Vec<ExposureDownload>,

    /// Tag to resume from; `None` signals there is nothing more for now
    pub next_cursor: Option<BatchTag>,
}

impl FetchedBatch {
    /// The end-of-day marker: no tag, no records
    pub fn exhausted() -> Self {
        Self {
            exposures: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_cursor.is_none()
    }
}

impl From<DiagnosisKeysDownloadResponse> for FetchedBatch {
    fn from(response: DiagnosisKeysDownloadResponse) -> Self {
        Self {
            exposures: response.exposures,
            next_cursor: response.batch_tag,
        }
    }
}
