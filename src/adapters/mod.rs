//! External system integrations for keyfed.
//!
//! This module provides adapters for the pipeline's collaborators:
//!
//! - [`interop`] - interop server client (federated key batches)
//! - [`state`] - durable download cursor (PostgreSQL, JSON file, in-memory)
//! - [`sink`] - durable object storage for accepted keys
//! - [`secrets`] - resolution of the interop bearer token
//!
//! # Design Pattern
//!
//! Every collaborator sits behind an async trait so the download coordinator
//! can be driven with in-memory implementations in tests:
//!
//! ```rust
//! use keyfed::adapters::sink::{InMemorySink, ObjectSink};
//! use keyfed::adapters::state::{BatchTagStore, InMemoryBatchTagStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn BatchTagStore> = Arc::new(InMemoryBatchTagStore::new());
//! let sink: Arc<dyn ObjectSink> = Arc::new(InMemorySink::new());
//! assert_eq!(store.location(), sink.location());
//! ```

pub mod interop;
pub mod secrets;
pub mod sink;
pub mod state;
