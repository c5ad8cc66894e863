// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Top-level error taxonomy the supervisor uses to decide whether a
/// condition is fatal to the process or just enters limbo.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine the user's home directory")]
    NoHomeDir,
    #[error("daemon is already running (PID: {0})")]
    LockHeld(i32),
    #[error("failed to acquire lock file: {0}")]
    LockIo(std::io::Error),
    #[error("state error: {0}")]
    State(#[from] bisync_state::StateError),
}
