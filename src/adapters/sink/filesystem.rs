//! Filesystem object sink
//!
//! Maps the bucket to `<SINK_ROOT_DIR>/<bucket>` and each object key to a
//! file path below it.

use super::key::ObjectKey;
use super::ObjectSink;
use crate::domain::{KeyFedError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes objects as files under a bucket directory
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    bucket_dir: PathBuf,
}

impl FileSystemSink {
    pub fn new(root: impl AsRef<Path>, bucket: &str) -> Self {
        Self {
            bucket_dir: root.as_ref().join(bucket),
        }
    }

    pub fn bucket_dir(&self) -> &Path {
        &self.bucket_dir
    }

    /// File path for an object key
    ///
    /// # Errors
    ///
    /// Returns a sink error for keys with empty, `.` or `..` segments.
    pub fn path_for(&self, key: &ObjectKey) -> Result<PathBuf> {
        let mut path = self.bucket_dir.clone();
        for segment in key.segments() {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(KeyFedError::Sink(format!(
                    "Object key '{key}' cannot be mapped to a file"
                )));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl ObjectSink for FileSystemSink {
    async fn put_object(&self, key: &ObjectKey, body: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                KeyFedError::Sink(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        // Write then rename so the object is either absent or complete
        let mut tmp = path.clone().into_os_string();
        tmp.push(".partial");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| KeyFedError::Sink(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            KeyFedError::Sink(format!("Failed to commit object {}: {e}", path.display()))
        })?;

        tracing::debug!(path = %path.display(), bytes = body.len(), "Object written");
        Ok(())
    }

    fn location(&self) -> String {
        format!("file://{}", self.bucket_dir.display())
    }
}
