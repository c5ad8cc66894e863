// SPDX-License-Identifier: MIT

//! `rclone-bisync-manager daemon` — start the daemon in-process, or
//! speak the status socket for stop/status/reload.

use anyhow::{anyhow, Result};
use clap::Subcommand;

use bisync_core::CliOverrides;
use bisync_daemon::supervisor::{run_foreground, SupervisorOptions};

use crate::client;
use crate::Globals;

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Run the daemon's main loop in the foreground (no backgrounding;
    /// leave that to the host init system).
    Start,
    /// Ask a running daemon to shut down.
    Stop,
    /// Print the daemon's STATUS response as JSON.
    Status,
    /// Ask a running daemon to re-read its config file.
    Reload,
}

pub async fn run(command: DaemonCommand, globals: &Globals) -> Result<()> {
    match command {
        DaemonCommand::Start => start(globals).await,
        DaemonCommand::Stop => control(globals, "STOP").await,
        DaemonCommand::Status => control(globals, "STATUS").await,
        DaemonCommand::Reload => control(globals, "RELOAD").await,
    }
}

async fn start(globals: &Globals) -> Result<()> {
    let overrides = CliOverrides { dry_run: globals.dry_run, ..Default::default() };
    let options = SupervisorOptions::from_env(globals.config_path.clone(), overrides, globals.console_log)?;
    run_foreground(options).await.map_err(|e| anyhow!(e))
}

async fn control(globals: &Globals, command: &str) -> Result<()> {
    let socket_path = bisync_daemon::paths::status_socket_path();
    let response = client::send_status_command(&socket_path, command).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
