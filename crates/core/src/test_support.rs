// SPDX-License-Identifier: MIT

//! Test-only builders shared across crates, gated behind the
//! `test-support` feature so they never ship in a release build.

#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::{CliOverrides, Config, RawConfig, SyncJobConfig};
use crate::cron_schedule::CronSchedule;
use crate::options::OptionMap;

/// A minimal, valid `SyncJobConfig` for a job named `name`.
pub fn sample_job(name: &str) -> SyncJobConfig {
    SyncJobConfig {
        local: name.to_string(),
        rclone_remote: "testremote".to_string(),
        remote: name.to_string(),
        schedule: CronSchedule::parse("* * * * *").expect("literal cron expression is valid"),
        active: true,
        dry_run: false,
        force_resync: false,
        force_operation: false,
        rclone_options: OptionMap::new(),
        bisync_options: OptionMap::new(),
        resync_options: OptionMap::new(),
    }
}

/// A `Config` with a single job named `name`, rooted at `local_base_path`
/// (which must exist — callers typically pass a `tempfile::TempDir` path).
pub fn sample_config(local_base_path: PathBuf, name: &str) -> Config {
    let mut sync_jobs = HashMap::new();
    sync_jobs.insert(name.to_string(), sample_job(name));
    let raw = RawConfig {
        local_base_path,
        exclusion_rules_file: None,
        max_cpu_usage_percent: 100,
        redirect_rclone_log_output: false,
        run_missed_jobs: false,
        run_initial_sync_on_startup: false,
        dry_run: false,
        log_file_path: None,
        rclone_options: OptionMap::new(),
        bisync_options: OptionMap::new(),
        resync_options: OptionMap::new(),
        sync_jobs,
    };
    Config::from_raw(raw, &CliOverrides::default()).expect("sample config is valid by construction")
}
