// ZoneLoader - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::{ZoneFilter, ZoneId};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ZoneLoader configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/zoneloader/ or %APPDATA%\ZoneLoader\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Full path of config.toml inside the config directory.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[source]` section.
    pub source: SourceSection,
    /// `[console]` section.
    pub console: ConsoleSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[source]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Simulated latency of the demo source in ms.
    pub latency_ms: Option<u64>,
    /// Zone ids whose requests fail.
    pub failing_zones: Option<Vec<i64>>,
}

/// `[console]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    /// Interval between controller polls in ms.
    pub poll_interval_ms: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Source --
    /// Simulated latency of the demo source in ms.
    pub source_latency_ms: u64,
    /// Zones whose requests fail with "network error".
    pub failing_zones: Vec<ZoneId>,

    // -- Console --
    /// Interval between controller polls in ms.
    pub poll_interval_ms: u64,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_latency_ms: constants::DEFAULT_SOURCE_LATENCY_MS,
            failing_zones: Vec::new(),
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    load_config_file(&config_dir.join(constants::CONFIG_FILE_NAME))
}

/// Load and validate a config file at an explicit path.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with a warning
/// so the application still starts but the user is informed.
pub fn load_config_file(path: &Path) -> (AppConfig, Vec<String>) {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match read_raw_config(path) {
        Ok(raw) => {
            tracing::info!(path = %path.display(), "Loaded config file");
            validate(raw)
        }
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Read and parse a config file without validating values.
pub fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Source: latency_ms --
    if let Some(latency) = raw.source.latency_ms {
        if latency <= constants::MAX_SOURCE_LATENCY_MS {
            config.source_latency_ms = latency;
        } else {
            warnings.push(format!(
                "[source] latency_ms = {latency} is out of range (0-{}). Using default ({}).",
                constants::MAX_SOURCE_LATENCY_MS,
                constants::DEFAULT_SOURCE_LATENCY_MS,
            ));
        }
    }

    // -- Source: failing_zones --
    if let Some(zones) = raw.source.failing_zones {
        for raw_zone in zones {
            match ZoneFilter::from_raw(raw_zone).ok().and_then(ZoneFilter::zone) {
                Some(zone) => config.failing_zones.push(zone),
                None => warnings.push(format!(
                    "[source] failing_zones entry {raw_zone} is not a zone id (1-{}). Ignored.",
                    u32::MAX
                )),
            }
        }
    }

    // -- Console: poll_interval_ms --
    if let Some(interval) = raw.console.poll_interval_ms {
        if (constants::MIN_POLL_INTERVAL_MS..=constants::MAX_POLL_INTERVAL_MS).contains(&interval) {
            config.poll_interval_ms = interval;
        } else {
            warnings.push(format!(
                "[console] poll_interval_ms = {interval} is out of range ({}-{}). Using default ({}).",
                constants::MIN_POLL_INTERVAL_MS,
                constants::MAX_POLL_INTERVAL_MS,
                constants::DEFAULT_POLL_INTERVAL_MS,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> RawConfig {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_empty_config_yields_defaults() {
        let (config, warnings) = validate(parse(""));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = validate(parse(
            r#"
            [source]
            latency_ms = 20
            failing_zones = [3, 9]

            [console]
            poll_interval_ms = 100

            [logging]
            level = "DEBUG"
            file = "/tmp/zoneloader.log"
            "#,
        ));
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.source_latency_ms, 20);
        assert_eq!(
            config.failing_zones,
            vec![ZoneId::new(3).unwrap(), ZoneId::new(9).unwrap()]
        );
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file.as_deref(), Some("/tmp/zoneloader.log"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = validate(parse(
            r#"
            [source]
            latency_ms = 999999
            failing_zones = [0, -2, 4]

            [console]
            poll_interval_ms = 1

            [logging]
            level = "loud"
            "#,
        ));
        assert_eq!(warnings.len(), 5, "{warnings:?}");
        assert_eq!(config.source_latency_ms, constants::DEFAULT_SOURCE_LATENCY_MS);
        assert_eq!(config.failing_zones, vec![ZoneId::new(4).unwrap()]);
        assert_eq!(config.poll_interval_ms, constants::DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_, warnings) = validate(parse("[future]\nflag = true\n"));
        assert!(warnings.is_empty());
    }
}
