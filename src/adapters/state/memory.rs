//! In-memory state store
//!
//! Holds the progress record behind a mutex. Useful for tests and for
//! embedding the coordinator without infrastructure.

use super::models::ProcessorStateRecord;
use super::traits::BatchTagStore;
use crate::domain::{FederationBatch, KeyFedError, Result, UploadState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

/// In-memory implementation of [`BatchTagStore`]
///
/// Every committed batch is also appended to a history so callers can
/// assert on the exact sequence of commits.
#[derive(Debug)]
pub struct InMemoryBatchTagStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    record: ProcessorStateRecord,
    commits: Vec<FederationBatch>,
}

impl InMemoryBatchTagStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                record: ProcessorStateRecord::empty(),
                commits: Vec::new(),
            }),
        }
    }

    /// Start from an already committed batch
    pub fn with_batch(batch: FederationBatch) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.record.latest_federation_batch = Some(batch);
        }
        store
    }

    /// Batches committed through this store, oldest first
    pub fn commits(&self) -> Vec<FederationBatch> {
        self.lock().map(|i| i.commits.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| KeyFedError::State("In-memory state store is poisoned".to_string()))
    }
}

impl Default for InMemoryBatchTagStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchTagStore for InMemoryBatchTagStore {
    async fn latest_federation_batch(&self) -> Result<Option<FederationBatch>> {
        Ok(self.lock()?.record.latest_federation_batch.clone())
    }

    async fn update_latest_federation_batch(&self, batch: &FederationBatch) -> Result<()> {
        let mut inner = self.lock()?;
        inner.record.latest_federation_batch = Some(batch.clone());
        inner.commits.push(batch.clone());
        Ok(())
    }

    async fn last_upload_state(&self) -> Result<Option<UploadState>> {
        Ok(self.lock()?.record.upload_state())
    }

    async fn update_last_upload_state(&self, timestamp: DateTime<Utc>) -> Result<()> {
        self.lock()?.record.last_upload_timestamp = Some(timestamp);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
