//! JSON file state store
//!
//! Stores the progress record as `<STATE_FILE_DIR>/<table>.json`. Writes go
//! to a temporary file in the same directory which is then renamed over the
//! record, so a reader never sees a half-written document.

use super::models::ProcessorStateRecord;
use super::traits::BatchTagStore;
use crate::config::StateConfig;
use crate::domain::{FederationBatch, KeyFedError, Result, UploadState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed implementation of [`BatchTagStore`]
#[derive(Debug, Clone)]
pub struct FileBatchTagStore {
    path: PathBuf,
}

impl FileBatchTagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StateConfig) -> Self {
        Self::new(config.file_dir.join(format!("{}.json", config.table_name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<ProcessorStateRecord> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                KeyFedError::State(format!(
                    "State file {} is corrupt: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ProcessorStateRecord::empty()),
            Err(e) => Err(KeyFedError::State(format!(
                "Failed to read state file {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write(&self, record: &ProcessorStateRecord) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(record)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                KeyFedError::State(format!(
                    "Failed to create state directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            KeyFedError::State(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            KeyFedError::State(format!(
                "Failed to replace state file {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl BatchTagStore for FileBatchTagStore {
    async fn latest_federation_batch(&self) -> Result<Option<FederationBatch>> {
        Ok(self.read().await?.latest_federation_batch)
    }

    async fn update_latest_federation_batch(&self, batch: &FederationBatch) -> Result<()> {
        let mut record = self.read().await?;
        record.latest_federation_batch = Some(batch.clone());
        self.write(&record).await
    }

    async fn last_upload_state(&self) -> Result<Option<UploadState>> {
        Ok(self.read().await?.upload_state())
    }

    async fn update_last_upload_state(&self, timestamp: DateTime<Utc>) -> Result<()> {
        let mut record = self.read().await?;
        record.last_upload_timestamp = Some(timestamp);
        self.write(&record).await
    }

    fn location(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
