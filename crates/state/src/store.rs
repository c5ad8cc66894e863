// SPDX-License-Identifier: MIT

//! The sync-state store, grounded on
//! `original_source/rclone_bisync_manager/daemon_functions.py`'s
//! `load_sync_state`/`save_sync_state` and `sync_errors` handling, and on
//! the atomic write-temp+rename pattern this workspace uses elsewhere for
//! durable single-writer state.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use bisync_core::{JobKey, SyncStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StateError;

/// A sticky error record, keyed by local path in `sync_errors.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncErrorRecord {
    pub sync_type: String,
    pub error_code: i32,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// In-memory, per-job view combining the four parallel maps that make up
/// the on-disk `sync_state.json` document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobState {
    pub sync_status: SyncStatus,
    pub resync_status: SyncStatus,
    pub last_sync: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    /// Set when the most recent rclone log scan found the blank-hash
    /// warning. Not persisted: it is a per-run diagnostic, not durable state.
    pub hash_warning: Option<String>,
}

/// Patch applied by [`SyncStateStore::update_job`]; `None` leaves the
/// existing field untouched.
#[derive(Debug, Clone, Default)]
pub struct JobStatePatch {
    pub sync_status: Option<SyncStatus>,
    pub resync_status: Option<SyncStatus>,
    pub last_sync: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub hash_warning: Option<Option<String>>,
}

/// On-disk shape of `sync_state.json`: four maps of job key to value,
/// exactly matching spec.md §6 rather than one nested-object map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SyncStateDocument {
    #[serde(default)]
    sync_status: HashMap<JobKey, SyncStatus>,
    #[serde(default)]
    resync_status: HashMap<JobKey, SyncStatus>,
    #[serde(default)]
    last_sync_times: HashMap<JobKey, DateTime<Utc>>,
    #[serde(default)]
    next_run_times: HashMap<JobKey, DateTime<Utc>>,
}

/// Holds every job's durable state plus the sticky error map, and persists
/// both JSON documents atomically.
#[derive(Debug, Clone, Default)]
pub struct SyncStateStore {
    jobs: HashMap<JobKey, JobState>,
    errors: HashMap<String, SyncErrorRecord>,
}

impl SyncStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `sync_state.json` and `sync_errors.json` from `state_path`/
    /// `errors_path`. Missing files yield empty maps. A corrupt file is
    /// logged and treated as empty rather than failing startup.
    pub fn load(state_path: &Path, errors_path: &Path) -> Self {
        let document = match read_json::<SyncStateDocument>(state_path) {
            Ok(Some(doc)) => doc,
            Ok(None) => SyncStateDocument::default(),
            Err(e) => {
                warn!(path = %state_path.display(), error = %e, "corrupt sync state, starting fresh");
                SyncStateDocument::default()
            }
        };

        let errors = match read_json::<HashMap<String, SyncErrorRecord>>(errors_path) {
            Ok(Some(errors)) => errors,
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!(path = %errors_path.display(), error = %e, "corrupt sync errors, starting fresh");
                HashMap::new()
            }
        };

        let mut jobs = HashMap::new();
        let keys: std::collections::HashSet<_> = document
            .sync_status
            .keys()
            .chain(document.resync_status.keys())
            .chain(document.last_sync_times.keys())
            .chain(document.next_run_times.keys())
            .cloned()
            .collect();
        for key in keys {
            jobs.insert(
                key.clone(),
                JobState {
                    sync_status: document.sync_status.get(&key).copied().unwrap_or_default(),
                    resync_status: document.resync_status.get(&key).copied().unwrap_or_default(),
                    last_sync: document.last_sync_times.get(&key).copied(),
                    next_run: document.next_run_times.get(&key).copied(),
                    hash_warning: None,
                },
            );
        }

        Self { jobs, errors }
    }

    pub fn get_job(&self, key: &JobKey) -> JobState {
        self.jobs.get(key).cloned().unwrap_or_default()
    }

    pub fn jobs(&self) -> impl Iterator<Item = (&JobKey, &JobState)> {
        self.jobs.iter()
    }

    pub fn update_job(&mut self, key: &JobKey, patch: JobStatePatch) {
        let entry = self.jobs.entry(key.clone()).or_default();
        if let Some(sync_status) = patch.sync_status {
            entry.sync_status = sync_status;
        }
        if let Some(resync_status) = patch.resync_status {
            entry.resync_status = resync_status;
        }
        if let Some(last_sync) = patch.last_sync {
            entry.last_sync = Some(last_sync);
        }
        if let Some(next_run) = patch.next_run {
            entry.next_run = Some(next_run);
        }
        if let Some(hash_warning) = patch.hash_warning {
            entry.hash_warning = hash_warning;
        }
    }

    pub fn get_error(&self, local_path: &str) -> Option<&SyncErrorRecord> {
        self.errors.get(local_path)
    }

    pub fn errors(&self) -> impl Iterator<Item = (&String, &SyncErrorRecord)> {
        self.errors.iter()
    }

    pub fn set_error(&mut self, local_path: impl Into<String>, record: SyncErrorRecord) {
        self.errors.insert(local_path.into(), record);
    }

    pub fn clear_error(&mut self, local_path: &str) {
        self.errors.remove(local_path);
    }

    /// Write both `sync_state.json` and `sync_errors.json` atomically
    /// (write-temp, fsync, rename).
    pub fn persist(&self, state_path: &Path, errors_path: &Path) -> Result<(), StateError> {
        let mut document = SyncStateDocument::default();
        for (key, job) in &self.jobs {
            document.sync_status.insert(key.clone(), job.sync_status);
            document.resync_status.insert(key.clone(), job.resync_status);
            if let Some(last_sync) = job.last_sync {
                document.last_sync_times.insert(key.clone(), last_sync);
            }
            if let Some(next_run) = job.next_run {
                document.next_run_times.insert(key.clone(), next_run);
            }
        }
        write_json_atomic(state_path, &document)?;
        write_json_atomic(errors_path, &self.errors)?;
        Ok(())
    }
}

fn read_json<T>(path: &Path) -> Result<Option<T>, StateError>
where
    T: for<'de> Deserialize<'de>,
{
    let contents = match fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => return Ok(None),
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let value = serde_json::from_str(&contents)?;
    Ok(Some(value))
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = tmp_path_for(path);
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().and_then(|n| n.to_str()).unwrap_or("state").to_string();
    name.push_str(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
