// SPDX-License-Identifier: MIT

//! The `STATUS` response document, shaped exactly per spec.md §6 so a
//! tray/CLI client can render it without daemon-specific knowledge.

use std::collections::HashMap;
use std::path::Path;

use bisync_core::{Config, JobKey, SyncStatus};
use bisync_state::{SyncErrorRecord, SyncStateStore};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::runtime::RuntimeSnapshot;

#[derive(Debug, Clone, Serialize)]
pub struct SyncJobStatus {
    pub local: String,
    pub rclone_remote: String,
    pub remote: String,
    pub schedule: String,
    pub active: bool,
    pub dry_run: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub resync_status: SyncStatus,
    pub hash_warnings: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub pid: u32,
    pub running: bool,
    pub shutting_down: bool,
    pub in_limbo: bool,
    pub config_invalid: bool,
    pub config_error_message: Option<String>,
    pub currently_syncing: Option<String>,
    pub queued_paths: Vec<String>,
    pub config_changed_on_disk: bool,
    pub config_file_location: String,
    pub log_file_location: Option<String>,
    pub sync_errors: HashMap<String, SyncErrorRecord>,
    pub sync_jobs: HashMap<String, SyncJobStatus>,
}

pub fn build_status_report(
    pid: u32,
    config: Option<&Config>,
    config_path: &Path,
    state: &SyncStateStore,
    runtime: &RuntimeSnapshot,
) -> StatusReport {
    let mut sync_jobs = HashMap::new();
    let mut log_file_location = None;

    if let Some(config) = config {
        log_file_location = config.log_file_path.as_ref().map(|p| p.to_string_lossy().into_owned());
        for (key, job) in &config.sync_jobs {
            let job_state = state.get_job(key);
            sync_jobs.insert(
                key.to_string(),
                SyncJobStatus {
                    local: job.local.clone(),
                    rclone_remote: job.rclone_remote.clone(),
                    remote: job.remote.clone(),
                    schedule: job.schedule.to_string(),
                    active: job.active,
                    dry_run: config.effective_dry_run(job),
                    last_sync: job_state.last_sync,
                    next_run: job_state.next_run,
                    sync_status: job_state.sync_status,
                    resync_status: job_state.resync_status,
                    hash_warnings: job_state.hash_warning,
                },
            );
        }
    }

    let sync_errors = state.errors().map(|(path, record)| (path.clone(), record.clone())).collect();

    StatusReport {
        pid,
        running: true,
        shutting_down: runtime.shutting_down,
        in_limbo: runtime.in_limbo,
        config_invalid: runtime.in_limbo && config.is_none(),
        config_error_message: runtime.config_error_message.clone(),
        currently_syncing: runtime.currently_syncing.clone(),
        queued_paths: runtime.queued_paths.clone(),
        config_changed_on_disk: runtime.config_changed_on_disk,
        config_file_location: config_path.to_string_lossy().into_owned(),
        log_file_location,
        sync_errors,
        sync_jobs,
    }
}

/// Used only by tests that need a `JobKey` handy without pulling in the
/// full supervisor wiring.
#[cfg(test)]
pub(crate) fn job_key(name: &str) -> JobKey {
    JobKey::new(name)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
