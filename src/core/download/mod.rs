//! Download orchestration
//!
//! - [`coordinator`] - the bounded batch loop and cursor handling
//! - [`batch`] - validation, transformation and storage of one batch
//! - [`summary`] - per-invocation outcome
//! - [`clock`] - injectable time source

pub mod batch;
pub mod checksum;
pub mod clock;
pub mod coordinator;
pub mod summary;

pub use batch::{BatchProcessor, BatchResult};
pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::DownloadCoordinator;
pub use summary::{BatchReport, DownloadSummary, RunStatus, StopReason};
