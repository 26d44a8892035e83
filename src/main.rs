// keyfed - Federated diagnosis key download
// Copyright (c) 2025 Keyfed Contributors
// Licensed under the MIT License

use clap::Parser;
use keyfed::cli::{Cli, Commands};
use keyfed::config::load_logging_config;
use keyfed::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The dotenv file is optional; a missing file leaves the environment as is
    if let Err(e) = dotenvy::from_filename(&cli.env_file) {
        if !e.not_found() {
            eprintln!("Failed to load {}: {e}", cli.env_file);
            process::exit(2);
        }
    }

    let logging_config = load_logging_config();
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| logging_config.level.clone());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "keyfed - federated diagnosis key download"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors, so flush the file logger first
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Download(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute().await,
        Commands::Status(args) => args.execute().await,
    }
}
