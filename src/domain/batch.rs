//! Federation batch boundary and last-run records

use super::ids::BatchTag;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The last batch boundary successfully consumed
///
/// Immutable value: an update replaces it wholesale.
///
/// # Examples
///
/// ```
/// use keyfed::domain::{BatchTag, FederationBatch};
/// use chrono::NaiveDate;
///
/// let batch = FederationBatch::new(
///     BatchTag::new("tag-1").unwrap(),
///     NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
/// );
/// assert_eq!(batch.batch_tag().as_str(), "tag-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationBatch {
    batch_tag: BatchTag,
    batch_date: NaiveDate,
}

impl FederationBatch {
    pub fn new(batch_tag: BatchTag, batch_date: NaiveDate) -> Self {
        Self {
            batch_tag,
            batch_date,
        }
    }

    pub fn batch_tag(&self) -> &BatchTag {
        &self.batch_tag
    }

    pub fn batch_date(&self) -> NaiveDate {
        self.batch_date
    }
}

/// Summary of the previous run as remembered by the state store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadState {
    pub last_upload_timestamp: DateTime<Utc>,
}
