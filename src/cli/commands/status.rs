//! Status command implementation
//!
//! This module implements the `status` command for displaying the stored
//! federation cursor and the time of the last completed run.

use super::{exit_code_for, EXIT_CONFIG, EXIT_OK};
use crate::adapters::state::create_batch_tag_store;
use crate::config::load_config;
use crate::core::state::StateManager;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!("Checking download status");

        println!("📊 Download Status");
        println!();

        let config = match load_config() {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match create_batch_tag_store(&config.state).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open state store");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let state_manager = StateManager::new(store);

        let state = async {
            let cursor = state_manager.load_cursor().await?;
            let last_run = state_manager.last_upload_state().await?;
            Ok::<_, crate::domain::KeyFedError>((cursor, last_run))
        };

        let (cursor, last_run) = match state.await {
            Ok(state) => state,
            Err(e) => {
                println!("❌ Failed to read state");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("  Workspace: {}", config.download_feature_flag.workspace());
        println!(
            "  Download enabled: {}",
            if config.download_enabled() { "yes" } else { "no" }
        );
        println!("  State store: {}", state_manager.location());
        println!();

        match cursor {
            Some(batch) => {
                println!("  Batch tag: {}", batch.batch_tag());
                println!("  Batch date: {}", batch.batch_date());
            }
            None => {
                println!("  No batch committed yet.");
                println!(
                    "  The first run starts {} day(s) back.",
                    config.initial_download_history_days
                );
            }
        }

        let last_run = last_run
            .map(|s| s.last_upload_timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Never".to_string());
        println!("  Last run: {last_run}");
        println!();

        Ok(EXIT_OK)
    }
}
