// SPDX-License-Identifier: MIT

//! The cron-driven scheduler, grounded on
//! `original_source/rclone_bisync_manager/scheduler.py`'s heap-based
//! `SyncScheduler` (`heapq` of `(next_run_time, job_key)`), reworked as a
//! `BinaryHeap` with lazy deletion so `Schedule` can replace a job's entry
//! in O(log n) without a full heap rebuild.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use bisync_core::{Config, JobKey};
use bisync_state::SyncStateStore;
use chrono::{DateTime, Utc};

/// One pending scheduler entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTask {
    pub scheduled_time: DateTime<Utc>,
    pub job_key: JobKey,
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct HeapEntry {
    scheduled_time: DateTime<Utc>,
    seq: u64,
    job_key: JobKey,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so earlier times (and, on a
        // tie, earlier insertion order) sort to the top via Reverse below.
        self.scheduled_time
            .cmp(&other.scheduled_time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of `SyncTask` plus a key→canonical-entry map so `Schedule`
/// can replace an existing task for a key in O(log n): the old heap node
/// is left in place and discarded lazily when it reaches the top.
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<std::cmp::Reverse<HeapEntry>>,
    current: HashMap<JobKey, (DateTime<Utc>, u64)>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing entry for `key` with one firing at `when`.
    pub fn schedule(&mut self, key: JobKey, when: DateTime<Utc>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.current.insert(key.clone(), (when, seq));
        self.heap.push(std::cmp::Reverse(HeapEntry {
            scheduled_time: when,
            seq,
            job_key: key,
        }));
    }

    /// Drop every pending entry (used on config reload).
    pub fn clear(&mut self) {
        self.heap.clear();
        self.current.clear();
    }

    /// Recompute every active job's next run time from `now`, replacing
    /// the whole schedule. A job with no recorded `last_sync` runs
    /// immediately. When `run_missed_jobs` is set and a job's next cron
    /// slot after its `last_sync` already lies in the past, that single
    /// overdue slot is scheduled now — collapsing any longer backlog into
    /// one catch-up run rather than replaying every missed slot.
    pub fn schedule_all(&mut self, config: &Config, state: &SyncStateStore, now: DateTime<Utc>) {
        self.clear();
        for (key, job) in config.active_jobs() {
            let job_state = state.get_job(key);
            let when = match job_state.last_sync {
                None => now,
                Some(last_sync) => {
                    if config.run_missed_jobs {
                        job.schedule.next_after(last_sync).unwrap_or(now)
                    } else {
                        job.schedule.next_after(now).unwrap_or(now)
                    }
                }
            };
            self.schedule(key.clone(), when);
        }
    }

    /// Discard stale heap nodes (ones superseded by a later `schedule`
    /// call for the same key) until the top is canonical or the heap is
    /// empty.
    fn clean_top(&mut self) {
        while let Some(std::cmp::Reverse(top)) = self.heap.peek() {
            match self.current.get(&top.job_key) {
                Some((time, seq)) if *time == top.scheduled_time && *seq == top.seq => break,
                _ => {
                    self.heap.pop();
                }
            }
        }
    }

    pub fn peek(&mut self) -> Option<SyncTask> {
        self.clean_top();
        self.heap.peek().map(|std::cmp::Reverse(entry)| SyncTask {
            scheduled_time: entry.scheduled_time,
            job_key: entry.job_key.clone(),
        })
    }

    pub fn pop(&mut self) -> Option<SyncTask> {
        self.clean_top();
        let std::cmp::Reverse(entry) = self.heap.pop()?;
        self.current.remove(&entry.job_key);
        Some(SyncTask {
            scheduled_time: entry.scheduled_time,
            job_key: entry.job_key,
        })
    }

    /// Pop and return every task whose `scheduled_time` is `<= now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<SyncTask> {
        let mut due = Vec::new();
        while let Some(task) = self.peek() {
            if task.scheduled_time > now {
                break;
            }
            due.push(self.pop().expect("peek just confirmed an entry exists"));
        }
        due
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
