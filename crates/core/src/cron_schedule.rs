// SPDX-License-Identifier: MIT

//! 5-field cron expression parsing, grounded on
//! `original_source/rclone_bisync_manager/config.py`'s `croniter(v)`
//! validation and `scheduler.py`'s `croniter(...).get_next(datetime)`.
//!
//! The `cron` crate's `Schedule` expects a leading seconds field, so a
//! 5-field expression (`minute hour day-of-month month day-of-week`, the
//! form rclone-bisync-manager's config uses) is parsed by prefixing `"0 "`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};

/// A validated 5-field cron expression, retaining the original text for
/// display and re-serialization.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    raw: String,
    schedule: Schedule,
}

impl CronSchedule {
    /// Parse a 5-field cron expression (`minute hour dom month dow`).
    pub fn parse(raw: &str) -> Result<Self, String> {
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(format!(
                "expected a 5-field cron expression, got {} field(s): {raw:?}",
                fields.len()
            ));
        }
        let with_seconds = format!("0 {raw}");
        let schedule = Schedule::from_str(&with_seconds)
            .map_err(|e| format!("invalid cron string {raw:?}: {e}"))?;
        Ok(Self {
            raw: raw.to_string(),
            schedule,
        })
    }

    /// The next fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for CronSchedule {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl Eq for CronSchedule {}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for CronSchedule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for CronSchedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        CronSchedule::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "cron_schedule_tests.rs"]
mod tests;
