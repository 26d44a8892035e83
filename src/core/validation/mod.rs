//! Record validation
//!
//! Decides which downloaded records are trusted and with which risk level.
//! Rejections are counted by the caller and never abort a batch.

pub mod policy;

pub use policy::{accept, ValidationPolicy, Verdict};
