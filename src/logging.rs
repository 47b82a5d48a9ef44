//! Tracing subscriber setup
//!
//! Sets up:
//! - File layer: JSON lines appended to the log file in the data directory
//! - Stderr layer: human-readable events, only with `--verbose`
//! - `EnvFilter`: respects `DECL_SYNC_LOG`, defaults to "info" ("debug" when verbose)

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::error::Error;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "DECL_SYNC_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Install the global subscriber writing to `log_path`
///
/// Returns a `WorkerGuard` that must be kept alive for the file logging to work.
pub fn init(log_path: &Path, verbose: bool) -> Result<WorkerGuard, Error> {
    let directory = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory).map_err(Error::storage(directory))?;
    let file_name = log_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "decl-sync.log".into());

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(LevelFilter::DEBUG)
    });

    Registry::default().with(file_layer).with(stderr_layer).init();

    Ok(guard)
}
