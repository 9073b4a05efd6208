//! Structured logging for Celestial.
//!
//! Installs a `tracing` subscriber with console output (uptime timestamps and
//! module paths) and, in debug builds, a JSON log file. The filter comes from
//! `RUST_LOG` when set, otherwise from the config's `debug.log_level`.

use std::path::Path;

use celestial_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "celestial.log";

/// Initialize the global tracing subscriber.
///
/// * `config` - supplies `debug.log_level` and `debug.log_dir`
/// * `debug_build` - enables the JSON file layer when a log directory is set
///
/// ```no_run
/// use celestial_config::Config;
///
/// celestial_log::init_logging(&Config::default(), cfg!(debug_assertions));
/// ```
pub fn init_logging(config: &Config, debug_build: bool) {
    let filter_str = filter_for(config);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| parse_filter(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // gateway workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = config.debug.log_dir.as_deref()
        && let Some(log_file) = create_log_file(log_dir)
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

/// Filter directive string for the given config.
fn filter_for(config: &Config) -> String {
    let level = config.debug.log_level.trim();
    if level.is_empty() {
        DEFAULT_FILTER.to_string()
    } else if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        // Plain level: keep the GPU stack quiet unless explicitly asked.
        format!("{level},wgpu=warn,naga=warn")
    }
}

/// Parse `filter_str`, falling back to [`default_env_filter`] when any directive is invalid.
fn parse_filter(filter_str: &str) -> EnvFilter {
    EnvFilter::try_new(filter_str).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {filter_str:?} ({e}), using {DEFAULT_FILTER:?}");
        default_env_filter()
    })
}

fn create_log_file(log_dir: &Path) -> Option<std::fs::File> {
    std::fs::create_dir_all(log_dir).ok()?;
    std::fs::File::create(log_dir.join(LOG_FILE_NAME)).ok()
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
