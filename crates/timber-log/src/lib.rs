//! Structured logging for the Timber engine.
//!
//! Console output via the `tracing` ecosystem with env-based filtering,
//! plus optional JSON file logging in debug builds for post-mortem
//! analysis. Honors the config system's log level override.

use std::path::Path;

use timber_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Sets up a console layer with timestamps, module paths, and severity
/// levels; filtering respects `RUST_LOG` and falls back to the config's
/// `debug.log_level`. In debug builds a JSON file layer is added under
/// `log_dir` when provided.
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => "info".to_string(),
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    // In debug builds, also log to a file for post-mortem analysis.
    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("timber.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Create an `EnvFilter` with the default filter string (`info`).
///
/// Useful for tests and for consistent default behavior.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new("info")
}
