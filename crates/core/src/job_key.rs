// SPDX-License-Identifier: MIT

use std::fmt;

use serde::{Deserialize, Serialize};

/// The name of a `SyncJobConfig` entry — the unit of scheduling, queueing,
/// and persisted state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobKey(String);

impl JobKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for JobKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "job_key_tests.rs"]
mod tests;
