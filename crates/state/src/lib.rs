// SPDX-License-Identifier: MIT

//! Durable per-job sync state: `sync_state.json`, `sync_errors.json`, and
//! the `.filter_md5` exclusion-file fingerprint. Persistence follows the
//! write-temp-then-rename pattern used throughout this workspace for
//! crash-safe writes.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod filter_fingerprint;
mod store;

pub use error::StateError;
pub use filter_fingerprint::FilterFingerprint;
pub use store::{JobState, SyncErrorRecord, SyncStateStore};
