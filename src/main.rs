// ZoneLoader - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and validation
// 3. Logging initialisation (debug mode support)
// 4. Controller construction and console launch

mod console;

// Re-export modules from the library crate so that `console.rs` can use
// `crate::app::...`, `crate::core::...` etc.
pub use zoneloader::app;
pub use zoneloader::core;
pub use zoneloader::platform;
pub use zoneloader::util;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// ZoneLoader - browse devices by zone.
///
/// Reads commands from stdin (`zone N`, `clear`, `ack`, `show`, `quit`) and
/// prints loading, result and error transitions as they happen.
#[derive(Parser, Debug)]
#[command(name = "zoneloader", version, about)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Zone to select right after start-up (0 = all zones).
    #[arg(short = 'z', long = "zone")]
    zone: Option<i64>,

    /// Override the simulated data source latency (ms).
    #[arg(short = 'l', long = "latency-ms")]
    latency_ms: Option<u64>,

    /// Print state as JSON snapshots instead of text.
    #[arg(long = "json")]
    json: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging so its level and file can be honoured;
    // warnings are reported once the subscriber is installed.
    let (config, config_warnings) = match &cli.config {
        Some(path) => platform::config::load_config_file(path),
        None => platform::config::load_config(&platform::config::PlatformPaths::resolve().config_dir),
    };

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "ZoneLoader starting"
    );

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
        eprintln!("warning: {warning}");
    }

    let latency = Duration::from_millis(cli.latency_ms.unwrap_or(config.source_latency_ms));
    let source = app::memory_source::MemorySource::sample(latency)
        .with_failing_zones(config.failing_zones.iter().copied());

    let mut controller = app::controller::FilterController::new(source);

    if let Some(raw) = cli.zone {
        if let Err(e) = controller.set_zone(raw).map_err(util::error::ZoneLoaderError::from) {
            tracing::error!(error = %e, "Invalid --zone");
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    console::Console::new(controller, poll_interval, cli.json).run(console::spawn_stdin_reader());
}
