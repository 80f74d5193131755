//! Tracing configuration and log routing.
//!
//! Logs go to stdout through a compact formatter and, when a log file can be
//! opened, to that file through a non-blocking writer. `CASESTACK_LOG_FILE`
//! overrides the default location of `logs/casestack.log`. `RUST_LOG` controls
//! filtering and defaults to `info`.

use std::fs::OpenOptions;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "casestack.log";

/// Keeps the non-blocking writer flushing for the lifetime of the process.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the stdout layer and, when possible, the file layer.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact());

    match file_writer() {
        Some(writer) => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false)
                    .compact(),
            )
            .init(),
        None => registry.init(),
    }
}

/// Open the log destination and wrap it in a non-blocking writer.
///
/// Failure to open the file is not fatal; the process keeps logging to stdout.
fn file_writer() -> Option<NonBlocking> {
    let file = match std::env::var("CASESTACK_LOG_FILE") {
        Ok(path) => OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .inspect_err(|err| eprintln!("Failed to open log file {path}: {err}"))
            .ok()?,
        Err(_) => {
            if let Err(err) = std::fs::create_dir_all(LOG_DIR) {
                eprintln!("Failed to create {LOG_DIR} directory: {err}");
                return None;
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(std::path::Path::new(LOG_DIR).join(LOG_FILE))
                .inspect_err(|err| eprintln!("Failed to open default log file: {err}"))
                .ok()?
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}
