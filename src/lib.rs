// keyfed - Federated diagnosis key download
// Copyright (c) 2025 Keyfed Contributors
// Licensed under the MIT License

//! # keyfed - Federated Diagnosis Key Download
//!
//! keyfed pulls diagnosis keys published by partner exposure-notification
//! systems from a federation (interop) server, filters them through a trust
//! policy and stores the accepted keys for the national key distribution
//! pipeline.
//!
//! ## Overview
//!
//! Each scheduled invocation:
//! - **Resumes** from the last committed batch tag, or bootstraps a start date
//! - **Fetches** batches one at a time with a bearer token
//! - **Validates** every record (origin, test/report type, risk level,
//!   rolling window, regions, key material)
//! - **Stores** the accepted keys of a batch as one object
//! - **Commits** the batch tag only after the object is durably written
//!
//! The loop is bounded by `MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT` and an optional
//! wall-clock budget; any backlog is left for the next invocation.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Download loop, validation policy, transformation, cursor state
//! - [`adapters`] - Interop server, state stores, object sinks, secrets
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration from the environment
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyfed::config::load_config;
//! use keyfed::core::download::DownloadCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config()?;
//!     let coordinator = DownloadCoordinator::connect(config).await?;
//!
//!     let summary = coordinator.execute_download().await?;
//!
//!     println!("Stored {} keys from {} batches", summary.keys_accepted, summary.batches_processed);
//!     Ok(())
//! }
//! ```
//!
//! ## Embedding without infrastructure
//!
//! Every collaborator sits behind a trait, and in-memory implementations are
//! public:
//!
//! ```rust,no_run
//! use keyfed::adapters::sink::InMemorySink;
//! use keyfed::adapters::state::InMemoryBatchTagStore;
//! use keyfed::adapters::interop::InteropClient;
//! use keyfed::config::{load_config, secret_string};
//! use keyfed::core::download::DownloadCoordinator;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let source = InteropClient::new(
//!     &config.interop_base_url,
//!     secret_string("token".to_string()),
//!     std::time::Duration::from_secs(30),
//! )?;
//!
//! let coordinator = DownloadCoordinator::new(
//!     config,
//!     Arc::new(source),
//!     Arc::new(InMemoryBatchTagStore::new()),
//!     Arc::new(InMemorySink::new()),
//! );
//! let summary = coordinator.execute_download().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`]. [`domain::KeyFedError::is_retryable`]
//! tells the scheduler whether rerunning the invocation can help; record-level
//! problems are never errors, only counted [`domain::RejectionReason`]s.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
