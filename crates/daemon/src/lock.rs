// SPDX-License-Identifier: MIT

//! Single-instance enforcement via an advisory-locked PID file, grounded
//! on this workspace's lock-file acquisition pattern and on
//! `original_source/rclone_bisync_manager/daemon_functions.py`'s
//! `LOCK_FILE`/stale-PID recovery.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::DaemonError;

/// Holds the lock file open (and advisory-locked) for the daemon's
/// lifetime. Dropping it releases the lock and removes the file.
pub struct LockGuard {
    _file: File,
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Acquire the daemon's single-instance lock at `path`. If the file
/// already exists, checks whether its recorded PID still identifies a
/// live instance of this program; a genuinely stale file is removed and
/// acquisition retried exactly once.
pub fn acquire(path: &Path) -> Result<LockGuard, DaemonError> {
    match create_and_lock(path) {
        Ok(guard) => return Ok(guard),
        Err(DaemonError::Io(e)) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e),
    }

    if let Some(pid) = read_pid(path) {
        if process_identifies_this_program(pid) {
            return Err(DaemonError::LockHeld(pid));
        }
    }

    fs::remove_file(path).ok();
    create_and_lock(path)
}

fn create_and_lock(path: &Path) -> Result<LockGuard, DaemonError> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.try_lock_exclusive().map_err(DaemonError::LockIo)?;
    write!(file, "{}", std::process::id())?;
    file.sync_all()?;
    Ok(LockGuard {
        _file: file,
        path: path.to_path_buf(),
    })
}

fn read_pid(path: &Path) -> Option<i32> {
    let mut contents = String::new();
    File::open(path).ok()?.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

/// True if `pid` is alive *and* its `/proc/<pid>/cmdline` names this
/// program, mirroring the Python implementation's liveness + identity
/// check before declaring a lock file stale.
#[cfg(target_os = "linux")]
fn process_identifies_this_program(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    if kill(Pid::from_raw(pid), None).is_err() {
        return false;
    }

    match fs::read(format!("/proc/{pid}/cmdline")) {
        Ok(bytes) => {
            let cmdline = String::from_utf8_lossy(&bytes);
            cmdline.contains("rbmd") || cmdline.contains("rclone-bisync-manager")
        }
        Err(_) => false,
    }
}

#[cfg(not(target_os = "linux"))]
fn process_identifies_this_program(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
