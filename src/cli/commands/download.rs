//! Download command implementation
//!
//! This module implements the `download` command: one scheduled invocation of
//! the federated key download.

use super::{exit_code_for, EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::core::download::{DownloadCoordinator, DownloadSummary};
use clap::Args;
use uuid::Uuid;

/// Arguments for the download command
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Print the summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl DownloadArgs {
    /// Execute the download command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!("Starting download command");

        let config = match load_config() {
            Ok(c) => c,
            Err(e) => {
                crate::log_fatal_error!(&e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // Disabled workspaces must not resolve secrets or touch the state store.
        if !config.download_enabled() {
            let summary = DownloadSummary::disabled(Uuid::new_v4(), chrono::Utc::now());
            summary.log_summary();
            self.print_summary(&summary)?;
            return Ok(EXIT_OK);
        }

        let coordinator = match DownloadCoordinator::connect(config).await {
            Ok(c) => c,
            Err(e) => {
                crate::log_fatal_error!(&e, "Failed to initialize download");
                eprintln!("Failed to initialize download: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        match coordinator.execute_download().await {
            Ok(summary) => {
                self.print_summary(&summary)?;
                Ok(EXIT_OK)
            }
            Err(e) => {
                eprintln!("Download failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    fn print_summary(&self, summary: &DownloadSummary) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(summary)?);
            return Ok(());
        }

        if summary.is_disabled() {
            println!("Download disabled for this workspace, nothing done.");
            return Ok(());
        }

        println!("Download Summary:");
        println!("  Invocation: {}", summary.invocation_id);
        println!("  Batches: {}", summary.batches_processed);
        println!("  Keys accepted: {}", summary.keys_accepted);
        println!("  Keys rejected: {}", summary.keys_rejected);
        for (reason, count) in &summary.rejections_by_reason {
            println!("    {reason}: {count}");
        }
        println!("  Stopped: {:?}", summary.stop_reason);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

        if !summary.batches.is_empty() {
            println!();
            println!(
                "{:<40} {:<12} {:>9} {:>9}  {}",
                "Batch Tag", "Date", "Accepted", "Rejected", "Object"
            );
            println!("{}", "-".repeat(100));
            for batch in &summary.batches {
                println!(
                    "{:<40} {:<12} {:>9} {:>9}  {}",
                    batch.batch_tag.as_str(),
                    batch.batch_date,
                    batch.accepted,
                    batch.rejected,
                    batch.object_key.as_deref().unwrap_or("-")
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_print_disabled_summary() {
        let args = DownloadArgs { json: true };
        let at = Utc.with_ymd_and_hms(2021, 3, 12, 12, 0, 0).unwrap();
        let summary = DownloadSummary::disabled(Uuid::nil(), at);

        assert!(args.print_summary(&summary).is_ok());
    }
}
