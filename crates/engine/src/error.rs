// SPDX-License-Identifier: MIT

use bisync_core::JobKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state error: {0}")]
    State(#[from] bisync_state::StateError),
    #[error("job {0} is not configured")]
    UnknownJob(JobKey),
    #[error("rclone probe file RCLONE_TEST missing on {side} ({path})")]
    PreconditionMissing { side: &'static str, path: String },
}
