//! Interop server adapter
//!
//! Fetches batches of federated diagnosis keys from the interop server.

pub mod client;
pub mod models;

pub use client::{FederationSource, InteropClient};
pub use models::{DiagnosisKeysDownloadResponse, FetchedBatch};
