// SPDX-License-Identifier: MIT

//! The supervisor binary's library half: lifecycle (lock file, state
//! directories), the IPC listeners, the control server, the supervisor
//! main loop, and logging setup. The `rbmd` binary (`src/main.rs`) is a
//! thin wrapper around [`supervisor::run_foreground`].

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod ipc;
pub mod lock;
pub mod logging;
pub mod paths;
mod runtime;
mod status;
pub mod supervisor;

pub use error::DaemonError;
pub use status::{build_status_report, StatusReport, SyncJobStatus};
pub use supervisor::{Supervisor, SupervisorOptions};
