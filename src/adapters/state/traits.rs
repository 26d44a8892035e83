//! State store trait
//!
//! This module defines the trait that state store backends must implement
//! to persist download progress.

use crate::domain::{FederationBatch, Result, UploadState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable store for the federation download cursor
///
/// Only the download coordinator writes. A read always reflects the most
/// recent successful write. Each update replaces its fields wholesale and
/// leaves the other fields of the record untouched.
#[async_trait]
pub trait BatchTagStore: Send + Sync {
    /// Load the last committed batch boundary
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if nothing has ever been committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn latest_federation_batch(&self) -> Result<Option<FederationBatch>>;

    /// Commit a new batch boundary
    ///
    /// # Errors
    ///
    /// Returns an error if the write did not durably succeed. The caller must
    /// then treat the batch as not consumed.
    async fn update_latest_federation_batch(&self, batch: &FederationBatch) -> Result<()>;

    /// Load the summary of the previous run
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn last_upload_state(&self) -> Result<Option<UploadState>>;

    /// Record when the last run finished
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn update_last_upload_state(&self, timestamp: DateTime<Utc>) -> Result<()>;

    /// Human readable location of the store, safe to log
    fn location(&self) -> String;
}
