//! # Logging
//!
//! ## Logging Architecture
//! - **stderr**: WARN by default, raised with `-v` (INFO) / `-vv` (DEBUG).
//!   Kept off stdout so `--json` output stays machine-readable.
//! - **file** (optional, `--log-dir`): INFO for optlab crates, WARN for deps,
//!   daily rotation, non-blocking. Honors `RUST_LOG`.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Guards that must be held for the lifetime of the process.
/// Dropping this will cause buffered file logs to be lost.
pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Stderr level for a `-v` count.
pub fn stderr_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initializes tracing with a bounded stderr layer and an optional rotated file layer.
///
/// # Parameters
/// * `service_name` - Log file stem (`{log_dir}/{service_name}.log.YYYY-MM-DD`).
/// * `log_dir` - Directory for file logs; `None` disables the file layer.
/// * `verbose` - Number of `-v` flags given on the command line.
pub fn init_tracing(service_name: &str, log_dir: Option<&Path>, verbose: u8) -> Result<TracingGuards> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_filter(EnvFilter::new(stderr_level(verbose)));

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let file_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("optlab=info,warn"));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!(service = service_name, "tracing initialized");
    Ok(TracingGuards {
        _file_guard: file_guard,
    })
}
