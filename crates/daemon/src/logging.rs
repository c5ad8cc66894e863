// SPDX-License-Identifier: MIT

//! Logging setup, grounded on this workspace's `setup_logging`: a
//! non-blocking file appender plus an `EnvFilter`, with an added
//! `console_log` toggle for spec.md's `--console-log` flag.

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Must be held for the lifetime of the process; dropping it flushes and
/// stops the non-blocking writer thread.
pub struct LoggingGuard(#[allow(dead_code)] Option<tracing_appender::non_blocking::WorkerGuard>);

/// Initialize the global tracing subscriber. When `log_file_path` is
/// `Some`, logs go to that file through a non-blocking appender; when
/// `console_log` is true (or no log file is configured), logs also go to
/// stderr.
pub fn setup_logging(log_file_path: Option<&Path>, console_log: bool) -> std::io::Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer_guard = match log_file_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file_name = path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("daemon.log"));
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(parent, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            Some((non_blocking, guard))
        }
        None => None,
    };

    let use_console = console_log || file_layer_guard.is_none();

    match file_layer_guard {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer))
                .with(use_console.then(|| fmt::layer().with_writer(std::io::stderr)))
                .init();
            Ok(LoggingGuard(Some(guard)))
        }
        None => {
            tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
            Ok(LoggingGuard(None))
        }
    }
}

/// Append a crash record to `crash_log_path`, mirroring spec.md §7's
/// `ShutdownTimeout`/unexpected-termination crash log.
pub fn write_crash_log(crash_log_path: &Path, message: &str) {
    use std::io::Write;
    if let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(crash_log_path) {
        let _ = writeln!(file, "[{}] {}", chrono::Utc::now().to_rfc3339(), message);
    }
}
