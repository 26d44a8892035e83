//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for keyfed using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// keyfed - federated diagnosis key download
#[derive(Parser, Debug)]
#[command(name = "keyfed")]
#[command(version, about, long_about = None)]
#[command(author = "Keyfed Contributors")]
pub struct Cli {
    /// Dotenv file loaded before configuration is resolved
    #[arg(short, long, default_value = ".env", env = "KEYFED_ENV_FILE")]
    pub env_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download new federated key batches and store them
    Download(commands::download::DownloadArgs),

    /// Resolve and validate configuration
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the stored federation cursor and last run
    Status(commands::status::StatusArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_download() {
        let cli = Cli::parse_from(["keyfed", "download"]);
        assert_eq!(cli.env_file, ".env");
        match cli.command {
            Commands::Download(args) => assert!(!args.json),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_download_json() {
        let cli = Cli::parse_from(["keyfed", "download", "--json"]);
        assert!(matches!(cli.command, Commands::Download(args) if args.json));
    }

    #[test]
    fn test_cli_parse_with_env_file() {
        let cli = Cli::parse_from(["keyfed", "--env-file", "prod.env", "status"]);
        assert_eq!(cli.env_file, "prod.env");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["keyfed", "--log-level", "debug", "download"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["keyfed", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["keyfed", "status"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["keyfed", "export"]).is_err());
    }
}
