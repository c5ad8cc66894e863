// SPDX-License-Identifier: MIT

//! rclone command assembly, invocation, and exit-code interpretation,
//! grounded on `original_source/rclone_bisync_manager/sync.py`'s
//! `get_rclone_args`/`run_rclone_command`/`handle_rclone_exit_code`.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use bisync_core::{Config, OptionMap, SyncJobConfig};
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::EngineError;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

const HASH_WARNING_NEEDLE: &str = "WARNING: hash unexpectedly blank despite Fs support";
const CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resync,
    Bisync,
}

impl Phase {
    fn options<'a>(&self, config: &'a Config) -> &'a OptionMap {
        match self {
            Phase::Resync => &config.resync_options,
            Phase::Bisync => &config.bisync_options,
        }
    }

    fn job_options<'a>(&self, job: &'a SyncJobConfig) -> &'a OptionMap {
        match self {
            Phase::Resync => &job.resync_options,
            Phase::Bisync => &job.bisync_options,
        }
    }
}

/// The four possible dispositions of an rclone bisync/resync run, per
/// spec.md §4.6's exit-code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Completed,
    FailedRetryable,
    FailedSticky,
    FailedUnknown,
}

impl ExitOutcome {
    pub fn is_completed(self) -> bool {
        matches!(self, ExitOutcome::Completed)
    }
}

pub fn map_exit_code(code: i32) -> ExitOutcome {
    match code {
        0 | 9 => ExitOutcome::Completed,
        1 | 5 => ExitOutcome::FailedRetryable,
        2 | 3 | 4 | 6 | 7 | 8 | 10 => ExitOutcome::FailedSticky,
        _ => ExitOutcome::FailedUnknown,
    }
}

pub fn exit_code_message(code: i32) -> String {
    let text = match code {
        0 => "completed successfully",
        1 => "non-critical error, a rerun may be successful",
        2 => "critically aborted, check the rclone log for more information",
        3 => "directory not found, check the rclone log for more information",
        4 => "file not found, check the rclone log for more information",
        5 => "temporary error, more retries might fix this issue",
        6 => "less serious errors, check the rclone log for more information",
        7 => "fatal error, check the rclone log for more information",
        8 => "transfer limit exceeded, check the rclone log for more information",
        9 => "successful but no files were transferred",
        10 => "duration limit exceeded, check the rclone log for more information",
        _ => "failed with an unknown error code, check the rclone log for more information",
    };
    format!("{code}: {text}")
}

/// Build the full `rclone` argument list (excluding the `rclone` binary
/// name itself) for one phase of one job, in the precedence order the
/// engine owns: engine defaults, global options, operation-specific
/// options, job-local options, then CLI-derived overrides.
pub fn build_args(
    phase: Phase,
    config: &Config,
    job: &SyncJobConfig,
    remote_path: &str,
    local_path: &str,
) -> Vec<String> {
    let mut args = vec!["bisync".to_string(), remote_path.to_string(), local_path.to_string()];
    if phase == Phase::Resync {
        args.push("--resync".to_string());
    }

    if config.redirect_rclone_log_output {
        if let Some(log_file_path) = &config.log_file_path {
            args.push("--log-file".to_string());
            args.push(log_file_path.to_string_lossy().into_owned());
        }
    }
    if let Some(exclusion_rules_file) = &config.exclusion_rules_file {
        if exclusion_rules_file.exists() {
            args.push("--exclude-from".to_string());
            args.push(exclusion_rules_file.to_string_lossy().into_owned());
        }
    }

    args.extend(bisync_core::encode_options(&config.rclone_options));
    args.extend(bisync_core::encode_options(phase.options(config)));
    args.extend(bisync_core::encode_options(&job.rclone_options));
    args.extend(bisync_core::encode_options(phase.job_options(job)));

    if config.effective_dry_run(job) {
        args.push("--dry-run".to_string());
    }
    if job.force_operation {
        args.push("--force".to_string());
    }

    args
}

/// Run `rclone <args>`, prefixed with `cpulimit --limit=<pct> --` when
/// `cpulimit` is on PATH. No wall-clock timeout is applied: a bisync run
/// can legitimately take a long time, and shutdown handles an in-flight
/// run by waiting out its own grace period rather than killing it here
/// (spec.md §5).
pub async fn run_rclone(args: &[String], max_cpu_usage_percent: u8) -> Result<Output, EngineError> {
    let mut command = match which::which("cpulimit") {
        Ok(cpulimit_path) => {
            let mut command = Command::new(cpulimit_path);
            command.arg(format!("--limit={max_cpu_usage_percent}")).arg("--").arg("rclone");
            command
        }
        Err(_) => Command::new("rclone"),
    };
    command.args(args);

    command.output().await.map_err(EngineError::Io)
}

/// Run `rclone lsf <path>` to check that `RCLONE_TEST` is listed, the
/// precondition both endpoints must satisfy before resync/bisync runs.
pub async fn probe_rclone_test(path: &str) -> bool {
    let mut command = Command::new("rclone");
    command.arg("lsf").arg(path);
    let output = match timeout(PROBE_TIMEOUT, command.output()).await {
        Ok(Ok(output)) => output,
        _ => return false,
    };
    if !output.status.success() {
        return false;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|line| line.trim() == "RCLONE_TEST")
}

/// Scan the rclone log file for the blank-hash warning, starting at byte
/// offset `from_position`. Returns whether the warning was seen and the
/// file's new length (the caller's next scan start position).
pub fn scan_for_hash_warning(log_file_path: &Path, from_position: u64) -> std::io::Result<(bool, u64)> {
    use std::io::{Read, Seek, SeekFrom};

    let metadata = match std::fs::metadata(log_file_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((false, from_position)),
        Err(e) => return Err(e),
    };
    let current_len = metadata.len();
    if current_len <= from_position {
        return Ok((false, current_len));
    }

    let mut file = std::fs::File::open(log_file_path)?;
    file.seek(SeekFrom::Start(from_position))?;

    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut tail = String::new();
    let mut found = false;
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        tail.push_str(&String::from_utf8_lossy(&buffer[..read]));
        if tail.contains(HASH_WARNING_NEEDLE) {
            found = true;
            break;
        }
        // keep only enough trailing context to catch a needle split across chunks
        if tail.len() > HASH_WARNING_NEEDLE.len() * 2 {
            let keep_from = tail.len() - HASH_WARNING_NEEDLE.len();
            tail = tail[keep_from..].to_string();
        }
    }

    Ok((found, current_len))
}

#[cfg(test)]
#[path = "rclone_tests.rs"]
mod tests;
