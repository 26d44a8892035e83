//! Object sink adapters
//!
//! Accepted keys of a batch are written as one object. The sink is the
//! durable hand-off to downstream consumers, so a failed write must stop
//! the cursor from advancing.

pub mod filesystem;
pub mod key;
pub mod memory;

pub use filesystem::FileSystemSink;
pub use key::ObjectKey;
pub use memory::InMemorySink;

use crate::config::DownloadConfig;
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Durable object storage
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// Store `body` under `key`, replacing any existing object
    ///
    /// # Errors
    ///
    /// Returns `KeyFedError::Sink` unless the object is durably written in
    /// full.
    async fn put_object(&self, key: &ObjectKey, body: Vec<u8>) -> Result<()>;

    /// Human readable location of the sink, safe to log
    fn location(&self) -> String;
}

/// Create the sink for the configured bucket
pub fn create_object_sink(config: &DownloadConfig) -> Arc<dyn ObjectSink> {
    let sink = FileSystemSink::new(&config.sink_root_dir, &config.submission_bucket_name);
    tracing::info!(location = %sink.location(), "Creating filesystem object sink");
    Arc::new(sink)
}
