// SPDX-License-Identifier: MIT

//! Config parsing and validation, grounded on
//! `original_source/rclone_bisync_manager/config.py`'s `Config`/`SyncJob`
//! pydantic models and its `load_config`/`validate` flow.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::cron_schedule::CronSchedule;
use crate::job_key::JobKey;
use crate::options::{check_reserved_keys, OptionMap};

/// One `{field_path, message}` validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_path, self.message)
    }
}

/// A non-empty collection of [`ValidationError`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    fn push(&mut self, field_path: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationError::new(field_path, message));
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any message contains `needle` — used by tests and by the
    /// status server to surface a hint (e.g. `"local_base_path"`).
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|e| e.message.contains(needle) || e.field_path.contains(needle))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// One entry of `sync_jobs`, as parsed straight off the YAML document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncJobConfig {
    pub local: String,
    pub rclone_remote: String,
    pub remote: String,
    pub schedule: CronSchedule,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub force_resync: bool,
    #[serde(default)]
    pub force_operation: bool,
    #[serde(default)]
    pub rclone_options: OptionMap,
    #[serde(default)]
    pub bisync_options: OptionMap,
    #[serde(default)]
    pub resync_options: OptionMap,
}

fn default_true() -> bool {
    true
}

/// The config document exactly as it appears on disk. `deny_unknown_fields`
/// makes an unrecognized top-level key a hard validation error, per
/// spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub local_base_path: PathBuf,
    #[serde(default)]
    pub exclusion_rules_file: Option<PathBuf>,
    #[serde(default = "default_max_cpu")]
    pub max_cpu_usage_percent: u8,
    #[serde(default)]
    pub redirect_rclone_log_output: bool,
    #[serde(default)]
    pub run_missed_jobs: bool,
    #[serde(default)]
    pub run_initial_sync_on_startup: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
    #[serde(default)]
    pub rclone_options: OptionMap,
    #[serde(default)]
    pub bisync_options: OptionMap,
    #[serde(default)]
    pub resync_options: OptionMap,
    pub sync_jobs: HashMap<String, SyncJobConfig>,
}

fn default_max_cpu() -> u8 {
    100
}

/// CLI-supplied overrides, applied to a parsed [`RawConfig`] as an explicit
/// second step (spec.md §4.1) rather than by ambient mutation.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dry_run: bool,
    pub resync_jobs: Vec<String>,
    pub force_bisync: bool,
}

/// A fully validated, ready-to-run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub local_base_path: PathBuf,
    pub exclusion_rules_file: Option<PathBuf>,
    pub max_cpu_usage_percent: u8,
    pub redirect_rclone_log_output: bool,
    pub run_missed_jobs: bool,
    pub run_initial_sync_on_startup: bool,
    pub dry_run: bool,
    pub log_file_path: Option<PathBuf>,
    pub rclone_options: OptionMap,
    pub bisync_options: OptionMap,
    pub resync_options: OptionMap,
    pub sync_jobs: HashMap<JobKey, SyncJobConfig>,
}

impl Config {
    /// Parse `raw` YAML text, validate it, and apply `overrides`. Mirrors
    /// `config.py`'s `load_config` + `apply_cli_args`.
    pub fn from_yaml_str(raw: &str, overrides: &CliOverrides) -> Result<Config, ValidationErrors> {
        let raw_config: RawConfig = serde_yaml::from_str(raw).map_err(|e| {
            let mut errors = ValidationErrors::default();
            errors.push("<document>", format!("failed to parse YAML: {e}"));
            errors
        })?;
        Self::from_raw(raw_config, overrides)
    }

    pub fn from_raw(raw: RawConfig, overrides: &CliOverrides) -> Result<Config, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if !raw.local_base_path.is_dir() {
            errors.push(
                "local_base_path",
                format!("{:?} does not exist or is not a directory", raw.local_base_path),
            );
        }

        if raw.max_cpu_usage_percent > 100 {
            errors.push(
                "max_cpu_usage_percent",
                format!("{} is out of bounds, expected 0..=100", raw.max_cpu_usage_percent),
            );
        }

        if raw.sync_jobs.is_empty() {
            errors.push("sync_jobs", "at least one sync job must be configured");
        }

        for (scope, options) in [
            ("rclone_options", &raw.rclone_options),
            ("bisync_options", &raw.bisync_options),
            ("resync_options", &raw.resync_options),
        ] {
            if let Err(reserved) = check_reserved_keys(options) {
                errors.push(scope, format!("reserved option key(s) not allowed: {}", reserved.join(", ")));
            }
        }

        let mut sync_jobs = HashMap::with_capacity(raw.sync_jobs.len());
        for (name, job) in raw.sync_jobs {
            for (scope, options) in [
                ("rclone_options", &job.rclone_options),
                ("bisync_options", &job.bisync_options),
                ("resync_options", &job.resync_options),
            ] {
                if let Err(reserved) = check_reserved_keys(options) {
                    errors.push(
                        format!("sync_jobs.{name}.{scope}"),
                        format!("reserved option key(s) not allowed: {}", reserved.join(", ")),
                    );
                }
            }
            sync_jobs.insert(JobKey::new(name), job);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut config = Config {
            local_base_path: raw.local_base_path,
            exclusion_rules_file: raw.exclusion_rules_file,
            max_cpu_usage_percent: raw.max_cpu_usage_percent,
            redirect_rclone_log_output: raw.redirect_rclone_log_output,
            run_missed_jobs: raw.run_missed_jobs,
            run_initial_sync_on_startup: raw.run_initial_sync_on_startup,
            dry_run: raw.dry_run,
            log_file_path: raw.log_file_path,
            rclone_options: raw.rclone_options,
            bisync_options: raw.bisync_options,
            resync_options: raw.resync_options,
            sync_jobs,
        };

        config.apply_overrides(overrides);
        Ok(config)
    }

    fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if overrides.dry_run {
            self.dry_run = true;
        }
        for name in &overrides.resync_jobs {
            if let Some(job) = self.sync_jobs.get_mut(&JobKey::new(name.as_str())) {
                job.force_resync = true;
            }
        }
        if overrides.force_bisync {
            for job in self.sync_jobs.values_mut() {
                job.force_operation = true;
            }
        }
    }

    /// True if either the global or the job's own `dry_run` is set
    /// (spec.md's Open Questions: OR semantics).
    pub fn effective_dry_run(&self, job: &SyncJobConfig) -> bool {
        self.dry_run || job.dry_run
    }

    pub fn active_jobs(&self) -> impl Iterator<Item = (&JobKey, &SyncJobConfig)> {
        self.sync_jobs.iter().filter(|(_, job)| job.active)
    }
}

/// Tracks the config file's on-disk mtime to answer `CheckChanged`/`ResetChanged`.
#[derive(Debug, Clone, Copy)]
pub struct ConfigWatch {
    baseline: Option<SystemTime>,
}

impl ConfigWatch {
    pub fn new() -> Self {
        Self { baseline: None }
    }

    /// True if `path`'s mtime differs from the stored baseline. A read
    /// failure (e.g. the file vanished) counts as changed.
    pub fn check_changed(&self, path: &Path) -> bool {
        match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => self.baseline != Some(mtime),
            Err(_) => true,
        }
    }

    pub fn reset(&mut self, path: &Path) {
        self.baseline = std::fs::metadata(path).and_then(|m| m.modified()).ok();
    }
}

impl Default for ConfigWatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
