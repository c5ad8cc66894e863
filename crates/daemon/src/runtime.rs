// SPDX-License-Identifier: MIT

//! Long-lived mutable runtime state: the scheduler, job queue, and limbo
//! flags, all behind one mutex so `STATUS` (and anything else) observes
//! a consistent snapshot, per spec.md §5's ordering guarantees.

use bisync_engine::{JobQueue, Scheduler};
use parking_lot::Mutex;

/// Everything `STATUS` needs to read atomically alongside the queue.
#[derive(Debug, Default)]
pub struct LimboState {
    pub in_limbo: bool,
    pub config_error_message: Option<String>,
    pub config_changed_on_disk: bool,
}

/// The supervisor's mutable runtime: scheduler, queue, and limbo flags.
/// `Config` and `SyncStateStore` are owned separately (see [`crate::supervisor::Supervisor`])
/// since they are swapped wholesale on reload rather than mutated in place.
#[derive(Debug, Default)]
pub struct Runtime {
    inner: Mutex<RuntimeInner>,
}

#[derive(Debug, Default)]
struct RuntimeInner {
    scheduler: Scheduler,
    queue: JobQueue,
    limbo: LimboState,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lock<R>(&self, f: impl FnOnce(&mut Scheduler, &mut JobQueue, &mut LimboState) -> R) -> R {
        let mut inner = self.inner.lock();
        let RuntimeInner { scheduler, queue, limbo } = &mut *inner;
        f(scheduler, queue, limbo)
    }

    pub fn enter_limbo(&self, message: String) {
        self.inner.lock().limbo = LimboState {
            in_limbo: true,
            config_error_message: Some(message),
            config_changed_on_disk: false,
        };
    }

    pub fn exit_limbo(&self) {
        let mut inner = self.inner.lock();
        inner.limbo.in_limbo = false;
        inner.limbo.config_error_message = None;
    }

    pub fn is_in_limbo(&self) -> bool {
        self.inner.lock().limbo.in_limbo
    }

    pub fn set_config_changed_on_disk(&self, changed: bool) {
        self.inner.lock().limbo.config_changed_on_disk = changed;
    }

    pub fn set_shutting_down(&self) {
        self.inner.lock().queue.set_shutting_down();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.lock().queue.is_shutting_down()
    }

    /// Snapshot of `(in_limbo, config_error_message, config_changed_on_disk,
    /// currently_running, queued_paths)` for `STATUS`.
    pub fn snapshot(&self) -> RuntimeSnapshot {
        let inner = self.inner.lock();
        RuntimeSnapshot {
            in_limbo: inner.limbo.in_limbo,
            config_error_message: inner.limbo.config_error_message.clone(),
            config_changed_on_disk: inner.limbo.config_changed_on_disk,
            currently_syncing: inner.queue.currently_running().map(|k| k.to_string()),
            queued_paths: inner.queue.queued_keys().map(|k| k.to_string()).collect(),
            shutting_down: inner.queue.is_shutting_down(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeSnapshot {
    pub in_limbo: bool,
    pub config_error_message: Option<String>,
    pub config_changed_on_disk: bool,
    pub currently_syncing: Option<String>,
    pub queued_paths: Vec<String>,
    pub shutting_down: bool,
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
