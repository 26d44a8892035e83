//! Integration tests for logging functionality

use keyfed::config::LoggingConfig;
use keyfed::domain::{KeyFedError, RejectionReason};
use keyfed::logging::init_logging;
use keyfed::{log_fatal_error, log_key_rejected};
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.level, "info");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_rejected_before_install() {
    let result = init_logging("loud", &LoggingConfig::default());
    assert!(matches!(result, Err(KeyFedError::Configuration(_))));
}

// Installing a global subscriber can only happen once per process, so every
// step that needs it lives in this one test.
#[test]
fn test_file_logging_initialization() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        level: "debug".to_string(),
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "hourly".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());

    log_key_rejected!("tag-1", "FR", RejectionReason::InvalidOrigin);
    let error = KeyFedError::State("connection reset".to_string());
    log_fatal_error!(&error, "Download failed");

    // A second installation is refused rather than silently replacing the first
    let second = init_logging("info", &LoggingConfig::default());
    assert!(matches!(second, Err(KeyFedError::Configuration(_))));

    drop(guard);
}
