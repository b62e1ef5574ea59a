// ZoneLoader - tests/e2e_config.rs
//
// Config file loading against real files in temporary directories.

use std::fs;
use tempfile::TempDir;
use zoneloader::core::model::ZoneId;
use zoneloader::platform::config::{load_config, load_config_file, read_raw_config, AppConfig};
use zoneloader::util::constants;
use zoneloader::util::error::ConfigError;

#[test]
fn e2e_missing_file_yields_defaults_silently() {
    let dir = TempDir::new().unwrap();
    let (config, warnings) = load_config(dir.path());
    assert_eq!(config, AppConfig::default());
    assert!(warnings.is_empty());
}

#[test]
fn e2e_config_dir_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(constants::CONFIG_FILE_NAME),
        "[source]\nlatency_ms = 0\nfailing_zones = [2]\n\n[logging]\nlevel = \"warn\"\n",
    )
    .unwrap();

    let (config, warnings) = load_config(dir.path());
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(config.source_latency_ms, 0);
    assert_eq!(config.failing_zones, vec![ZoneId::new(2).unwrap()]);
    assert_eq!(config.log_level.as_deref(), Some("warn"));
    assert_eq!(config.poll_interval_ms, constants::DEFAULT_POLL_INTERVAL_MS);
}

#[test]
fn e2e_explicit_path_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[console]\npoll_interval_ms = 250\n").unwrap();

    let (config, warnings) = load_config_file(&path);
    assert!(warnings.is_empty());
    assert_eq!(config.poll_interval_ms, 250);
}

#[test]
fn e2e_malformed_file_warns_and_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(constants::CONFIG_FILE_NAME);
    fs::write(&path, "[source\nlatency_ms = ").unwrap();

    let (config, warnings) = load_config_file(&path);
    assert_eq!(config, AppConfig::default());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Using defaults"), "{}", warnings[0]);

    assert!(matches!(
        read_raw_config(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn e2e_wrong_value_type_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(constants::CONFIG_FILE_NAME);
    fs::write(&path, "[source]\nlatency_ms = \"fast\"\n").unwrap();

    let (config, warnings) = load_config_file(&path);
    assert_eq!(config, AppConfig::default());
    assert_eq!(warnings.len(), 1);
}
