//! Core business logic for keyfed.
//!
//! This module contains the download pipeline and its policies.
//!
//! # Modules
//!
//! - [`download`] - Download orchestration, batch processing and summaries
//! - [`state`] - Cursor management over the state store
//! - [`transform`] - Conversion of wire records to stored keys
//! - [`validation`] - Trust policy for downloaded records
//!
//! # Download Workflow
//!
//! One invocation:
//!
//! 1. **Gate**: Skip everything if the workspace is not enabled
//! 2. **Load State**: Read the last committed batch tag and date
//! 3. **Bootstrap**: Without state, start `INITIAL_DOWNLOAD_HISTORY_DAYS` back
//! 4. **Fetch**: Download the next batch from the interop server
//! 5. **Validate + Transform**: Reject untrusted records, convert the rest
//! 6. **Store**: Write accepted keys to the sink as one object
//! 7. **Checkpoint**: Commit the batch tag, then go back to 4 while allowed
//! 8. **Report**: Record the run timestamp and return a summary
//!
//! # Example
//!
//! ```rust,no_run
//! use keyfed::config::load_config;
//! use keyfed::core::download::DownloadCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let coordinator = DownloadCoordinator::connect(config).await?;
//!
//! let summary = coordinator.execute_download().await?;
//!
//! println!("Batches: {}", summary.batches_processed);
//! println!("Accepted: {}", summary.keys_accepted);
//! println!("Rejected: {}", summary.keys_rejected);
//! # Ok(())
//! # }
//! ```

pub mod download;
pub mod state;
pub mod transform;
pub mod validation;
