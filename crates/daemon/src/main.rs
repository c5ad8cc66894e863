// SPDX-License-Identifier: MIT

//! `rbmd` — the rclone-bisync-manager daemon binary. A thin wrapper
//! around [`bisync_daemon::supervisor::run_foreground`]; the `rclone-
//! bisync-manager` CLI's `daemon start` subcommand runs the same
//! function in-process rather than exec-ing this binary, but `rbmd` is
//! kept as a standalone entry point for init-system supervision
//! (systemd, runit, …), per spec.md's explicit non-goal of in-process
//! double-fork daemonization.

use bisync_core::CliOverrides;
use bisync_daemon::supervisor::{run_foreground, SupervisorOptions};
use bisync_daemon::{logging, paths, DaemonError};

fn main() -> std::process::ExitCode {
    let console_log = std::env::args().any(|a| a == "--console-log");
    let dry_run = std::env::args().any(|a| a == "-d" || a == "--dry-run");
    let config_path = parse_config_flag();

    let options = match SupervisorOptions::from_env(config_path, CliOverrides { dry_run, ..Default::default() }, console_log) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("rbmd: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let log_file_path = paths::daemon_log_path().ok();
    let _guard = match logging::setup_logging(log_file_path.as_deref(), console_log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("rbmd: failed to set up logging: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("rbmd: failed to start tokio runtime: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_foreground(options)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(DaemonError::LockHeld(pid)) => {
            eprintln!("Daemon is already running (PID: {pid})");
            std::process::ExitCode::FAILURE
        }
        Err(e) => {
            logging::write_crash_log(&paths::crash_log_path(), &e.to_string());
            eprintln!("rbmd: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn parse_config_flag() -> Option<std::path::PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter().position(|a| a == "--config").and_then(|i| args.get(i + 1)).map(std::path::PathBuf::from)
}
