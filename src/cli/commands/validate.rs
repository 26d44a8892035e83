//! Validate config command implementation
//!
//! This module implements the `validate-config` command, which resolves the
//! configuration from the environment without touching any external system.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::{load_config, StateBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!("Validating configuration");

        println!("🔍 Validating configuration from environment");
        println!();

        let config = match load_config() {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Workspace: {}", config.download_feature_flag.workspace());
        println!("  Download enabled: {}", config.download_enabled());
        println!("  Interop Server: {}", config.interop_base_url);
        println!(
            "  Auth Token Secret: {}",
            config.interop_auth_token_secret_name
        );
        println!(
            "  Max Batches per Run: {}",
            config.max_subsequent_batch_download_count
        );
        println!(
            "  Initial History: {} day(s)",
            config.initial_download_history_days
        );
        if config.download_risk_level_default_enabled {
            println!(
                "  Risk Level: overridden to {}",
                config.download_risk_level_default
            );
        } else {
            println!("  Risk Level: as supplied");
        }
        println!("  Valid Origins: {:?}", config.valid_origins);
        println!(
            "  Sink: {}/{}/{}",
            config.sink_root_dir.display(),
            config.submission_bucket_name,
            config.federated_key_download_prefix
        );

        match config.state.backend {
            StateBackend::PostgreSQL => {
                println!("  State Backend: PostgreSQL");
                println!("  State Table: {}", config.state.table_name);
            }
            StateBackend::File => {
                println!("  State Backend: File");
                println!(
                    "  State File: {}",
                    config
                        .state
                        .file_dir
                        .join(format!("{}.json", config.state.table_name))
                        .display()
                );
            }
        }

        if let Some(budget) = config.max_runtime {
            println!("  Time Budget: {}s", budget.as_secs());
        }
        println!();

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        let _ = format!("{args:?}");
    }
}
