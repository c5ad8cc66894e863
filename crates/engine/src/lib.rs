// SPDX-License-Identifier: MIT

//! The scheduler, job queue, and sync engine: everything that decides
//! when a job runs and drives the rclone subprocess through it.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod queue;
mod rclone;
mod scheduler;
mod sync_engine;

pub use error::EngineError;
pub use queue::JobQueue;
pub use rclone::{build_args, exit_code_message, map_exit_code, probe_rclone_test, run_rclone, scan_for_hash_warning, ExitOutcome, Phase};
pub use scheduler::{Scheduler, SyncTask};
pub use sync_engine::{process_job, SyncOutcome};
