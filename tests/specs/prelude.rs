//! Test helpers for the end-to-end CLI/daemon specifications in this
//! directory: black-box, speaking only the `rclone-bisync-manager`
//! binary and its sockets, never the crates directly.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output};
use std::time::{Duration, Instant};

pub const POLL_INTERVAL: Duration = Duration::from_millis(20);
pub const SOCKET_WAIT: Duration = Duration::from_secs(2);
pub const EXIT_WAIT: Duration = Duration::from_secs(2);

/// A scratch directory carrying its own config/cache/runtime paths, so
/// concurrently-running tests never share a lock file or socket.
pub struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("cache")).unwrap();
        std::fs::create_dir_all(dir.path().join("runtime")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, yaml: &str) -> PathBuf {
        let path = self.dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.path().join("runtime").join("rclone_bisync_manager.lock")
    }

    pub fn status_socket_path(&self) -> PathBuf {
        self.dir.path().join("runtime").join("rclone_bisync_manager_status.sock")
    }

    /// Build a `Command` for the `rclone-bisync-manager` binary, with
    /// every `RBM_*` path pinned into this sandbox.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("rclone-bisync-manager"));
        cmd.env("RBM_CONFIG_PATH", self.dir.path().join("config.yaml"));
        cmd.env("RBM_CACHE_DIR", self.dir.path().join("cache"));
        cmd.env("RBM_RUNTIME_DIR", self.dir.path().join("runtime"));
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("command should run")
    }

    /// Start `daemon start` as a background child, owned by the caller
    /// so it can be stopped or waited on.
    pub fn spawn_daemon(&self) -> Child {
        self.cmd().args(["daemon", "start"]).spawn().expect("daemon should spawn")
    }

    /// Poll until the status socket exists (daemon has bound its
    /// listeners) or panic after `SOCKET_WAIT`.
    pub fn wait_for_socket(&self) {
        let deadline = Instant::now() + SOCKET_WAIT;
        while Instant::now() < deadline {
            if self.status_socket_path().exists() {
                return;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        panic!("status socket never appeared at {}", self.status_socket_path().display());
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Wait for `child` to exit, returning its status, or panic after
/// `EXIT_WAIT`.
pub fn wait_for_exit(child: &mut Child) -> std::process::ExitStatus {
    let deadline = Instant::now() + EXIT_WAIT;
    loop {
        if let Some(status) = child.try_wait().expect("try_wait") {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("daemon process did not exit within {EXIT_WAIT:?}");
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// A minimal valid config with one active job whose schedule never
/// fires during a test run, so the daemon starts, leaves limbo, but
/// never invokes rclone.
pub fn dormant_job_config(local_base_path: &Path, job_name: &str) -> String {
    format!(
        "local_base_path: {local_base_path:?}\n\
         run_initial_sync_on_startup: false\n\
         sync_jobs:\n\
         \x20\x20{job_name}:\n\
         \x20\x20\x20\x20local: data\n\
         \x20\x20\x20\x20rclone_remote: myremote\n\
         \x20\x20\x20\x20remote: backup\n\
         \x20\x20\x20\x20schedule: \"0 0 1 1 *\"\n"
    )
}
