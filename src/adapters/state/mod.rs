//! State store adapters
//!
//! - [`postgresql`] - single-row PostgreSQL table (production)
//! - [`file`] - JSON document on local disk
//! - [`memory`] - in-process, for tests and embedding

pub mod file;
pub mod memory;
pub mod models;
pub mod postgresql;
pub mod traits;

pub use file::FileBatchTagStore;
pub use memory::InMemoryBatchTagStore;
pub use models::{ProcessorStateRecord, PROCESSOR_STATE_ID};
pub use postgresql::PostgresBatchTagStore;
pub use traits::BatchTagStore;

use crate::config::{StateBackend, StateConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create the state store selected by the configuration
///
/// # Errors
///
/// Returns an error if the PostgreSQL store cannot be reached or its table
/// cannot be created.
pub async fn create_batch_tag_store(config: &StateConfig) -> Result<Arc<dyn BatchTagStore>> {
    match config.backend {
        StateBackend::PostgreSQL => {
            tracing::info!("Creating PostgreSQL state store");
            let store = PostgresBatchTagStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        StateBackend::File => {
            let store = FileBatchTagStore::from_config(config);
            tracing::info!(path = %store.path().display(), "Creating file state store");
            Ok(Arc::new(store))
        }
    }
}
