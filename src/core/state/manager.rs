//! State manager for download progress
//!
//! This module provides the StateManager for loading and committing the
//! federation cursor through a [`BatchTagStore`] backend.

use crate::adapters::state::BatchTagStore;
use crate::domain::{FederationBatch, Result, UploadState};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// State manager for cursor persistence
///
/// The download coordinator is the only writer; everything else reads.
pub struct StateManager {
    store: Arc<dyn BatchTagStore>,
}

impl StateManager {
    pub fn new(store: Arc<dyn BatchTagStore>) -> Self {
        Self { store }
    }

    /// Load the last committed batch boundary
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn load_cursor(&self) -> Result<Option<FederationBatch>> {
        let batch = self.store.latest_federation_batch().await?;

        match &batch {
            Some(b) => tracing::info!(
                batch_tag = %b.batch_tag(),
                batch_date = %b.batch_date(),
                "Loaded federation cursor"
            ),
            None => tracing::info!(store = %self.store.location(), "No federation cursor stored"),
        }

        Ok(batch)
    }

    /// Commit a batch as consumed
    ///
    /// Called only after the batch's keys are durably in the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; the batch then counts as not
    /// consumed.
    pub async fn checkpoint_batch(&self, batch: &FederationBatch) -> Result<()> {
        tracing::info!(
            batch_tag = %batch.batch_tag(),
            batch_date = %batch.batch_date(),
            "Checkpointing batch"
        );

        self.store.update_latest_federation_batch(batch).await
    }

    /// Record the end of a run
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn record_run(&self, timestamp: DateTime<Utc>) -> Result<()> {
        self.store.update_last_upload_state(timestamp).await
    }

    /// Summary of the previous run
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn last_upload_state(&self) -> Result<Option<UploadState>> {
        self.store.last_upload_state().await
    }

    pub fn location(&self) -> String {
        self.store.location()
    }
}
