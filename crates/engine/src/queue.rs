// SPDX-License-Identifier: MIT

//! The single-worker job queue, grounded on
//! `original_source/rclone_bisync_manager/daemon_functions.py`'s
//! `sync_lock`-guarded queue fields (`currently_syncing`, `queued_paths`).

use std::collections::{HashSet, VecDeque};

use bisync_core::JobKey;

/// Deduplicated FIFO of pending job keys plus the currently-executing key.
/// Guarded externally by a single mutex (the supervisor's `Runtime`) so
/// enqueue, drain, and `STATUS` observe one consistent snapshot.
#[derive(Debug, Default)]
pub struct JobQueue {
    queued: VecDeque<JobKey>,
    queued_set: HashSet<JobKey>,
    currently_running: Option<JobKey>,
    shutting_down: bool,
    /// Jobs whose next run should set `force_operation`, recorded by
    /// `add-sync`/CLI `--force-bisync` independently of the queue itself
    /// (spec.md §4.5's `enqueue(key, force_bisync)`), since `Config` is an
    /// immutable snapshot the queue does not own.
    force_overrides: HashSet<JobKey>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `key`. A no-op if the queue is shutting down, if `key` is
    /// already queued, or if `key` is the job currently executing.
    /// Returns whether the key was actually enqueued.
    pub fn enqueue(&mut self, key: JobKey) -> bool {
        if self.shutting_down {
            return false;
        }
        if self.currently_running.as_ref() == Some(&key) || self.queued_set.contains(&key) {
            return false;
        }
        self.queued_set.insert(key.clone());
        self.queued.push_back(key);
        true
    }

    /// Take the next key off the front of the queue and mark it running.
    pub fn start_next(&mut self) -> Option<JobKey> {
        let key = self.queued.pop_front()?;
        self.queued_set.remove(&key);
        self.currently_running = Some(key.clone());
        Some(key)
    }

    /// Clear the currently-running marker once the worker finishes.
    pub fn finish_current(&mut self) {
        self.currently_running = None;
    }

    pub fn currently_running(&self) -> Option<&JobKey> {
        self.currently_running.as_ref()
    }

    pub fn queued_keys(&self) -> impl Iterator<Item = &JobKey> {
        self.queued.iter()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn set_shutting_down(&mut self) {
        self.shutting_down = true;
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Record that `key`'s next run should set `force_operation`.
    pub fn set_force_override(&mut self, key: &JobKey) {
        self.force_overrides.insert(key.clone());
    }

    /// Consume (and clear) the force-operation override for `key`.
    pub fn take_force_override(&mut self, key: &JobKey) -> bool {
        self.force_overrides.remove(key)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
