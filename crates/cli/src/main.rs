// SPDX-License-Identifier: MIT

//! `rclone-bisync-manager` — the CLI front end. `daemon start` runs the
//! daemon's main loop in-process; `sync` runs one-shot jobs directly;
//! `add-sync` and the other `daemon` subcommands speak the running
//! daemon's Unix sockets. Exit codes follow spec.md §6: `0` on success,
//! `1` for anything else (config error, lock contention, or a
//! daemon-absent client command).

mod client;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Global flags shared by every subcommand.
pub struct Globals {
    pub dry_run: bool,
    pub console_log: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "rclone-bisync-manager", version, about = "Supervises scheduled rclone bisync jobs")]
struct Cli {
    /// Run every sync in dry-run mode, regardless of per-job config.
    #[arg(short = 'd', long = "dry-run", global = true)]
    dry_run: bool,
    /// Also write logs to stderr (in addition to the log file).
    #[arg(long = "console-log", global = true)]
    console_log: bool,
    /// Path to the YAML config file (defaults to the XDG config location).
    #[arg(long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start, stop, query, or reload the daemon.
    Daemon {
        #[command(subcommand)]
        command: commands::daemon::DaemonCommand,
    },
    /// Run one or more jobs to completion outside of the daemon.
    Sync(commands::sync::SyncArgs),
    /// Enqueue jobs on a running daemon.
    AddSync(commands::add_sync::AddSyncArgs),
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let globals = Globals { dry_run: cli.dry_run, console_log: cli.console_log, config_path: cli.config };

    let log_file_path = bisync_daemon::paths::daemon_log_path().ok();
    let _guard = match bisync_daemon::logging::setup_logging(log_file_path.as_deref(), globals.console_log) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("rclone-bisync-manager: failed to set up logging: {e}");
            None
        }
    };

    let result = match cli.command {
        Commands::Daemon { command } => commands::daemon::run(command, &globals).await,
        Commands::Sync(args) => commands::sync::run(args, &globals).await,
        Commands::AddSync(args) => commands::add_sync::run(args).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("rclone-bisync-manager: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
