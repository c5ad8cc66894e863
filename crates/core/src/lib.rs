// SPDX-License-Identifier: MIT

//! Domain types shared by every other `rclone-bisync-manager` crate:
//! configuration, job keys, sync status, cron schedules, and the rclone
//! option-map encoding.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod cron_schedule;
mod job_key;
pub mod options;
mod status;
#[cfg(feature = "test-support")]
pub mod test_support;

pub use config::{CliOverrides, Config, ConfigWatch, RawConfig, SyncJobConfig, ValidationError, ValidationErrors};
pub use cron_schedule::CronSchedule;
pub use job_key::JobKey;
pub use options::{encode_options, OptionMap, OptionValue, RESERVED_OPTION_KEYS};
pub use status::SyncStatus;
