// SPDX-License-Identifier: MIT

//! `rclone-bisync-manager sync` — one-shot mode: run the same sync
//! engine a daemon worker would, directly, against one or more jobs,
//! without a scheduler or IPC listeners. Refuses to run while a daemon
//! holds the single-instance lock, by holding that same lock itself for
//! the duration of the run.

use anyhow::{anyhow, bail, Result};
use clap::Args;
use tracing::{error, info};

use bisync_core::{CliOverrides, Config, JobKey};
use bisync_daemon::{lock, paths, DaemonError};
use bisync_state::SyncStateStore;

use crate::Globals;

#[derive(Args)]
pub struct SyncArgs {
    /// Job keys to sync. Defaults to every active job when omitted.
    pub jobs: Vec<String>,
    /// Force a resync for these job keys regardless of stored state.
    #[arg(long = "resync", value_name = "JOB")]
    pub resync_jobs: Vec<String>,
    /// Force a bisync run (set `force_operation`) for every selected job.
    #[arg(long = "force-bisync")]
    pub force_bisync: bool,
}

pub async fn run(args: SyncArgs, globals: &Globals) -> Result<()> {
    let lock_path = paths::lock_path();
    let _lock = match lock::acquire(&lock_path) {
        Ok(guard) => guard,
        Err(DaemonError::LockHeld(pid)) => {
            bail!("daemon is already running (PID: {pid}); refusing to run a one-shot sync alongside it")
        }
        Err(e) => return Err(anyhow!(e)),
    };

    let config_path = globals.config_path.clone().map(Ok).unwrap_or_else(paths::config_path)?;
    let raw = std::fs::read_to_string(&config_path).map_err(|e| anyhow!("reading {}: {e}", config_path.display()))?;
    let overrides = CliOverrides {
        dry_run: globals.dry_run,
        resync_jobs: args.resync_jobs,
        force_bisync: args.force_bisync,
    };
    let config = Config::from_yaml_str(&raw, &overrides).map_err(|errors| anyhow!("{errors}"))?;

    let keys: Vec<JobKey> = if args.jobs.is_empty() {
        config.active_jobs().map(|(key, _)| key.clone()).collect()
    } else {
        args.jobs.iter().map(|name| JobKey::new(name.as_str())).collect()
    };
    if keys.is_empty() {
        bail!("no jobs to sync: config has no active sync_jobs and none were named on the command line");
    }

    let sync_state_path = paths::sync_state_path()?;
    let sync_errors_path = paths::sync_errors_path()?;
    let mut state = SyncStateStore::load(&sync_state_path, &sync_errors_path);

    let mut failures = 0usize;
    for key in &keys {
        let Some(job) = config.sync_jobs.get(key) else {
            error!(job = %key, "no such job configured");
            failures += 1;
            continue;
        };
        match bisync_engine::process_job(key, &config, job, &mut state).await {
            Ok(outcome) => info!(job = %key, ?outcome, "sync run finished"),
            Err(e) => {
                error!(job = %key, error = %e, "sync engine error");
                failures += 1;
            }
        }
    }

    state.persist(&sync_state_path, &sync_errors_path)?;

    if failures > 0 {
        bail!("{failures} of {} job(s) failed", keys.len());
    }
    Ok(())
}
