// SPDX-License-Identifier: MIT

//! The per-job two-phase sync state machine, grounded on
//! `original_source/rclone_bisync_manager/sync.py`'s
//! `perform_sync_operations`/`resync`/`bisync`.

use std::path::PathBuf;

use bisync_core::{Config, JobKey, SyncJobConfig, SyncStatus};
use bisync_state::{JobStatePatch, SyncErrorRecord, SyncStateStore};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::rclone::{self, Phase};

/// What happened when [`process_job`] ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Neither phase ran because a probe file was missing.
    PreconditionSkipped { side: &'static str },
    /// Neither phase ran because a previous resync is sticky-FAILED.
    StickyResyncBlocked,
    /// At least one phase ran; carries the resulting statuses.
    Ran { resync_status: SyncStatus, sync_status: SyncStatus },
}

/// Run the resync/bisync state machine for `key`, mutating `state` as
/// phases complete. The caller is responsible for persisting `state`
/// afterward (unless `config.effective_dry_run(job)` is true, in which
/// case no mutation is made at all).
pub async fn process_job(
    key: &JobKey,
    config: &Config,
    job: &SyncJobConfig,
    state: &mut SyncStateStore,
) -> Result<SyncOutcome, EngineError> {
    let local_path = config.local_base_path.join(&job.local);
    let remote_path = format!("{}:{}", job.rclone_remote, job.remote);

    ensure_local_directory(&local_path)?;

    if !rclone::probe_rclone_test(&local_path.to_string_lossy()).await {
        warn!(job = %key, path = %local_path.display(), "RCLONE_TEST probe missing locally, skipping run");
        return Ok(SyncOutcome::PreconditionSkipped { side: "local" });
    }
    if !rclone::probe_rclone_test(&remote_path).await {
        warn!(job = %key, remote = %remote_path, "RCLONE_TEST probe missing on remote, skipping run");
        return Ok(SyncOutcome::PreconditionSkipped { side: "remote" });
    }

    let dry_run = config.effective_dry_run(job);
    let local_path_str = local_path.to_string_lossy().into_owned();
    let job_state = state.get_job(key);

    let needs_resync = job.force_resync || matches!(job_state.resync_status, SyncStatus::None | SyncStatus::InProgress);

    if job_state.resync_status == SyncStatus::Failed && !job.force_resync {
        info!(job = %key, "resync is sticky-FAILED, refusing to run without force_resync");
        return Ok(SyncOutcome::StickyResyncBlocked);
    }

    let mut resync_status = job_state.resync_status;
    let mut sync_status = job_state.sync_status;

    if needs_resync {
        if !dry_run {
            state.update_job(
                key,
                JobStatePatch {
                    resync_status: Some(SyncStatus::InProgress),
                    ..Default::default()
                },
            );
        }

        let args = rclone::build_args(Phase::Resync, config, job, &remote_path, &local_path_str);
        let outcome = run_phase(key, &args, config.max_cpu_usage_percent, "resync", &local_path_str, state, dry_run).await?;
        resync_status = outcome;

        if resync_status != SyncStatus::Completed {
            finish(key, state, resync_status, sync_status, dry_run);
            return Ok(SyncOutcome::Ran { resync_status, sync_status });
        }
    }

    let log_position_before = config
        .redirect_rclone_log_output
        .then_some(())
        .and(config.log_file_path.as_ref())
        .and_then(|path| std::fs::metadata(path).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    let args = rclone::build_args(Phase::Bisync, config, job, &remote_path, &local_path_str);
    sync_status = run_phase(key, &args, config.max_cpu_usage_percent, "bisync", &local_path_str, state, dry_run).await?;

    if let Some(log_file_path) = config.redirect_rclone_log_output.then_some(()).and(config.log_file_path.clone()) {
        scan_hash_warnings(key, &log_file_path, log_position_before, state);
    }

    finish(key, state, resync_status, sync_status, dry_run);
    Ok(SyncOutcome::Ran { resync_status, sync_status })
}

async fn run_phase(
    key: &JobKey,
    args: &[String],
    max_cpu_usage_percent: u8,
    sync_type: &str,
    local_path: &str,
    state: &mut SyncStateStore,
    dry_run: bool,
) -> Result<SyncStatus, EngineError> {
    let output = rclone::run_rclone(args, max_cpu_usage_percent).await?;
    let code = output.status.code().unwrap_or(-1);
    let outcome = rclone::map_exit_code(code);
    let message = rclone::exit_code_message(code);

    if dry_run {
        return Ok(if outcome.is_completed() { SyncStatus::Completed } else { SyncStatus::Failed });
    }

    if outcome.is_completed() {
        state.clear_error(local_path);
        info!(job = %key, sync_type, code, "{}", message);
    } else {
        state.set_error(
            local_path.to_string(),
            SyncErrorRecord {
                sync_type: sync_type.to_string(),
                error_code: code,
                message: message.clone(),
                timestamp: Utc::now(),
            },
        );
        warn!(job = %key, sync_type, code, "{}", message);
    }

    Ok(if outcome.is_completed() { SyncStatus::Completed } else { SyncStatus::Failed })
}

fn finish(key: &JobKey, state: &mut SyncStateStore, resync_status: SyncStatus, sync_status: SyncStatus, dry_run: bool) {
    if dry_run {
        return;
    }
    state.update_job(
        key,
        JobStatePatch {
            resync_status: Some(resync_status),
            sync_status: Some(sync_status),
            last_sync: Some(Utc::now()),
            ..Default::default()
        },
    );
}

fn scan_hash_warnings(key: &JobKey, log_file_path: &std::path::Path, from_position: u64, state: &mut SyncStateStore) {
    match rclone::scan_for_hash_warning(log_file_path, from_position) {
        Ok((true, _)) => {
            let message = format!(
                "blank hash warnings detected for {key}; this may indicate Live Photos or other special file types, consider --ignore-size"
            );
            state.update_job(
                key,
                JobStatePatch {
                    hash_warning: Some(Some(message)),
                    ..Default::default()
                },
            );
        }
        Ok((false, _)) => {
            state.update_job(
                key,
                JobStatePatch {
                    hash_warning: Some(None),
                    ..Default::default()
                },
            );
        }
        Err(e) => warn!(job = %key, error = %e, "failed to scan rclone log for hash warnings"),
    }
}

fn ensure_local_directory(local_path: &PathBuf) -> Result<(), EngineError> {
    if !local_path.exists() {
        std::fs::create_dir_all(local_path)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "sync_engine_tests.rs"]
mod tests;
