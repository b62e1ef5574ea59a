// ZoneLoader - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ZoneLoader";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ZoneLoader";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Filter values
// =============================================================================

/// Raw zone id that stands for "no filter".
pub const SENTINEL_ZONE_ID: i64 = 0;

// =============================================================================
// Derivation workers
// =============================================================================

/// How often a sleeping worker re-checks its cancel token (ms).
///
/// Bounds how long a superseded derivation keeps its thread alive after
/// the controller has moved on to a newer generation.
pub const CANCEL_CHECK_INTERVAL_MS: u64 = 20;

/// Prefix for derivation worker thread names.
pub const DERIVATION_THREAD_PREFIX: &str = "zoneloader-derive";

/// Prefix for cache refresh worker thread names.
pub const REFRESH_THREAD_PREFIX: &str = "zoneloader-refresh";

// =============================================================================
// Demo data source
// =============================================================================

/// Default simulated latency of the in-memory data source (ms).
pub const DEFAULT_SOURCE_LATENCY_MS: u64 = 300;

/// Upper bound on the configurable simulated latency (ms).
pub const MAX_SOURCE_LATENCY_MS: u64 = 60_000;

/// Message produced by the demo source for zones configured to fail.
pub const SIMULATED_FAILURE_MESSAGE: &str = "network error";

// =============================================================================
// Console
// =============================================================================

/// Default interval between controller polls in the console loop (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Minimum console poll interval (ms).
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Maximum console poll interval (ms).
pub const MAX_POLL_INTERVAL_MS: u64 = 5_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
