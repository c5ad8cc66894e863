// SPDX-License-Identifier: MIT

//! The daemon supervisor: owns the lock, the config, the sync-state
//! store, and the `Runtime` (scheduler + queue + limbo flags), and wires
//! them into the main loop and the two IPC listeners, grounded on
//! `original_source/rclone_bisync_manager/daemon_functions.py`'s
//! `run_daemon`/`process_sync_queue`/`main_loop`, and on the teacher's
//! `lifecycle::startup` + `main.rs` select-loop shape.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bisync_core::{CliOverrides, Config, ConfigWatch, JobKey};
use bisync_engine::SyncOutcome;
use bisync_state::{FilterFingerprint, SyncStateStore};
use chrono::Utc;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::ipc;
use crate::lock::LockGuard;
use crate::paths;
use crate::runtime::Runtime;
use crate::status::{build_status_report, StatusReport};

/// Everything the supervisor needs to find on disk, gathered up front so
/// tests can point every path at a scratch directory.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub config_path: PathBuf,
    pub sync_state_path: PathBuf,
    pub sync_errors_path: PathBuf,
    pub status_socket_path: PathBuf,
    pub add_sync_socket_path: PathBuf,
    pub console_log: bool,
    pub cli_overrides: CliOverrides,
}

impl SupervisorOptions {
    /// Resolve every path from the environment (`RBM_*`/`XDG_*`), per
    /// [`paths`].
    pub fn from_env(config_path: Option<PathBuf>, cli_overrides: CliOverrides, console_log: bool) -> Result<Self, crate::DaemonError> {
        Ok(Self {
            config_path: config_path.map(Ok).unwrap_or_else(paths::config_path)?,
            sync_state_path: paths::sync_state_path()?,
            sync_errors_path: paths::sync_errors_path()?,
            status_socket_path: paths::status_socket_path(),
            add_sync_socket_path: paths::add_sync_socket_path(),
            console_log,
            cli_overrides,
        })
    }
}

/// How long the main loop waits between ticks, and how long shutdown
/// waits for an in-flight sync to finish (spec.md §5/§8).
const TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);

/// The supervisor's full, wired-up state. Cheap to share via `Arc`:
/// every field is internally synchronized.
pub struct Supervisor {
    options: SupervisorOptions,
    config: SyncMutex<Option<Arc<Config>>>,
    config_watch: SyncMutex<ConfigWatch>,
    state: AsyncMutex<SyncStateStore>,
    runtime: Runtime,
    work_notify: Notify,
    shutting_down: AtomicBool,
    pid: u32,
    _lock: LockGuard,
}

impl Supervisor {
    pub fn new(options: SupervisorOptions, lock: LockGuard) -> Self {
        let state = SyncStateStore::load(&options.sync_state_path, &options.sync_errors_path);
        Self {
            options,
            config: SyncMutex::new(None),
            config_watch: SyncMutex::new(ConfigWatch::new()),
            state: AsyncMutex::new(state),
            runtime: Runtime::new(),
            work_notify: Notify::new(),
            shutting_down: AtomicBool::new(false),
            pid: std::process::id(),
            _lock: lock,
        }
    }

    pub fn config_path(&self) -> &std::path::Path {
        &self.options.config_path
    }

    fn config_snapshot(&self) -> Option<Arc<Config>> {
        self.config.lock().clone()
    }

    /// True if `key` names a job in the currently-loaded config. Used by
    /// the add-sync socket to reject unknown job keys before enqueueing
    /// (spec.md §4.7).
    pub fn has_job(&self, key: &JobKey) -> bool {
        self.config_snapshot().is_some_and(|config| config.sync_jobs.contains_key(key))
    }

    /// Attempt to (re)load the config from disk. On success, installs it,
    /// exits limbo, and reschedules every active job. On failure, enters
    /// limbo with the validation message and leaves any prior config in
    /// place (spec.md §4.1/§4.8).
    async fn load_config(&self) -> Result<(), String> {
        let raw = std::fs::read_to_string(&self.options.config_path).map_err(|e| format!("reading {}: {e}", self.options.config_path.display()))?;
        match Config::from_yaml_str(&raw, &self.options.cli_overrides) {
            Ok(mut config) => {
                self.check_filter_fingerprint(&mut config);
                let config = Arc::new(config);
                {
                    let state = self.state.lock().await;
                    self.runtime.with_lock(|scheduler, _queue, limbo| {
                        scheduler.schedule_all(&config, &state, Utc::now());
                        limbo.in_limbo = false;
                        limbo.config_error_message = None;
                    });
                }
                let run_initial = config.run_initial_sync_on_startup;
                let active_keys: Vec<JobKey> = config.active_jobs().map(|(k, _)| k.clone()).collect();
                *self.config.lock() = Some(config);
                self.config_watch.lock().reset(&self.options.config_path);

                if run_initial {
                    for key in active_keys {
                        self.enqueue(key, false);
                    }
                }
                Ok(())
            }
            Err(errors) => {
                let message = errors.to_string();
                self.runtime.enter_limbo(message.clone());
                Err(message)
            }
        }
    }

    /// Compare the exclusion file's fingerprint against the one recorded
    /// from the last load. A changed filter invalidates every active
    /// job's bisync listings, so this forces `force_resync` across the
    /// board for the run that follows (spec.md §6's persistent-state
    /// bullet). A missing prior fingerprint just seeds one; it is not
    /// itself a mismatch.
    fn check_filter_fingerprint(&self, config: &mut Config) {
        let Some(exclusion_rules_file) = config.exclusion_rules_file.as_ref() else {
            return;
        };
        let current = match FilterFingerprint::compute(exclusion_rules_file) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                warn!(error = %e, "failed to hash exclusion rules file, skipping filter fingerprint check");
                return;
            }
        };
        let Ok(fingerprint_path) = paths::filter_fingerprint_path() else {
            return;
        };
        match FilterFingerprint::load(&fingerprint_path) {
            Ok(Some(previous)) if previous != current => {
                warn!("exclusion rules file changed since last run, forcing resync for every active job");
                for job in config.sync_jobs.values_mut() {
                    job.force_resync = true;
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "failed to load stored filter fingerprint"),
        }
        if let Err(e) = current.save(&fingerprint_path) {
            warn!(error = %e, "failed to persist filter fingerprint");
        }
    }

    /// Public entry for the `RELOAD` control command.
    pub async fn reload(&self) -> Result<(), String> {
        self.load_config().await
    }

    /// Enqueue `key`, recording `force_bisync` as a one-shot override for
    /// its next run (spec.md §4.5). Returns whether it was actually
    /// enqueued (false if shutting down, already queued, or already
    /// running).
    pub fn enqueue(&self, key: JobKey, force_bisync: bool) -> bool {
        let enqueued = self.runtime.with_lock(|_scheduler, queue, _limbo| {
            if force_bisync {
                queue.set_force_override(&key);
            }
            queue.enqueue(key)
        });
        if enqueued {
            self.work_notify.notify_one();
        }
        enqueued
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.runtime.set_shutting_down();
        self.work_notify.notify_waiters();
    }

    pub async fn status_report(&self) -> StatusReport {
        let config = self.config_snapshot();
        let state = self.state.lock().await;
        let snapshot = self.runtime.snapshot();
        build_status_report(self.pid, config.as_deref(), &self.options.config_path, &state, &snapshot)
    }

    /// Startup sequence (spec.md §4.8): attempt to load the config once
    /// before entering the run loop; a failure just leaves the daemon in
    /// limbo rather than aborting startup.
    pub async fn startup(&self) {
        if let Err(message) = self.load_config().await {
            warn!(error = %message, "starting in limbo: config is invalid");
        }
    }

    /// The single worker: pulls one job key at a time off the queue and
    /// runs the sync engine against it, persisting state afterward and
    /// rescheduling the job's next cron slot (spec.md §4.5/§4.6).
    pub async fn run_worker(self: &Arc<Self>) {
        loop {
            let key = self.runtime.with_lock(|_scheduler, queue, _limbo| queue.start_next());
            let Some(key) = key else {
                if self.is_shutting_down() {
                    return;
                }
                tokio::time::timeout(Duration::from_secs(1), self.work_notify.notified()).await.ok();
                continue;
            };

            self.run_one(&key).await;
            self.runtime.with_lock(|_scheduler, queue, _limbo| queue.finish_current());
        }
    }

    async fn run_one(&self, key: &JobKey) {
        let Some(config) = self.config_snapshot() else {
            warn!(job = %key, "no config loaded, dropping queued job");
            return;
        };
        let Some(job) = config.sync_jobs.get(key).cloned() else {
            warn!(job = %key, "job no longer configured, dropping queued run");
            return;
        };
        let mut job = job;
        if self.runtime.with_lock(|_s, queue, _l| queue.take_force_override(key)) {
            job.force_operation = true;
        }

        let mut state = self.state.lock().await;
        let outcome = bisync_engine::process_job(key, &config, &job, &mut state).await;
        match outcome {
            Ok(SyncOutcome::Ran { resync_status, sync_status }) => {
                info!(job = %key, ?resync_status, ?sync_status, "sync run finished");
            }
            Ok(SyncOutcome::StickyResyncBlocked) => {
                info!(job = %key, "skipped: resync is sticky-FAILED");
            }
            Ok(SyncOutcome::PreconditionSkipped { side }) => {
                info!(job = %key, side, "skipped: RCLONE_TEST probe missing");
            }
            Err(e) => {
                error!(job = %key, error = %e, "sync engine error");
            }
        }
        if let Err(e) = state.persist(&self.options.sync_state_path, &self.options.sync_errors_path) {
            error!(job = %key, error = %e, "failed to persist sync state");
        }
        drop(state);

        let now = Utc::now();
        let next = job.schedule.next_after(now).unwrap_or(now);
        self.runtime.with_lock(|scheduler, _q, _l| scheduler.schedule(key.clone(), next));
    }

    /// The supervisor's main loop tick, run every [`TICK_INTERVAL`]
    /// (spec.md §4.8). Checks for on-disk config changes (surfaced via
    /// `STATUS`, not acted on automatically), then promotes any due
    /// scheduler entries into the queue.
    fn tick(&self) {
        let changed = self.config_watch.lock().check_changed(&self.options.config_path);
        self.runtime.set_config_changed_on_disk(changed);

        if self.runtime.is_in_limbo() {
            return;
        }
        let now = Utc::now();
        let due = self.runtime.with_lock(|scheduler, _queue, _limbo| scheduler.pop_due(now));
        if due.is_empty() {
            return;
        }
        for task in due {
            if self.enqueue(task.job_key.clone(), false) {
                continue;
            }
            // Already running or queued: reschedule is deferred to
            // `run_one`'s post-completion reschedule, so dropping this
            // promotion here is correct (spec.md §5's ordering guarantee).
        }
    }

    /// Drives the main loop until `request_shutdown` is observed,
    /// draining the current sync with a bounded grace period.
    pub async fn run_main_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if self.is_shutting_down() {
                break;
            }
            self.tick();
        }
        self.drain_for_shutdown().await;
    }

    async fn drain_for_shutdown(&self) {
        let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
        loop {
            let still_running = self.runtime.with_lock(|_s, queue, _l| queue.currently_running().is_some() || !queue.is_empty());
            if !still_running {
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                warn!("shutdown grace period elapsed with a sync still in flight");
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }
}

/// Run the daemon in the foreground: acquire the lock, start the IPC
/// listeners, run the worker and main loop, and clean up on shutdown
/// (spec.md §4.8).
pub async fn run_foreground(options: SupervisorOptions) -> Result<(), crate::DaemonError> {
    let lock_path = paths::lock_path();
    let lock = crate::lock::acquire(&lock_path)?;

    let status_socket_path = options.status_socket_path.clone();
    let add_sync_socket_path = options.add_sync_socket_path.clone();

    let supervisor = Arc::new(Supervisor::new(options, lock));
    supervisor.startup().await;

    let status_listener = ipc::bind_status_socket(&status_socket_path)?;
    let add_sync_listener = ipc::bind_add_sync_socket(&add_sync_socket_path)?;

    let status_task = tokio::spawn(ipc::run_status_listener(Arc::clone(&supervisor), status_listener));
    let add_sync_task = tokio::spawn(ipc::run_add_sync_listener(Arc::clone(&supervisor), add_sync_listener));
    let worker_task = tokio::spawn({
        let supervisor = Arc::clone(&supervisor);
        async move { supervisor.run_worker().await }
    });

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).map_err(crate::DaemonError::Io)?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).map_err(crate::DaemonError::Io)?;

    tokio::select! {
        _ = supervisor.clone().run_main_loop() => {}
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
            supervisor.request_shutdown();
            supervisor.drain_for_shutdown().await;
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
            supervisor.request_shutdown();
            supervisor.drain_for_shutdown().await;
        }
    }

    status_task.abort();
    add_sync_task.abort();
    worker_task.abort();
    let _ = std::fs::remove_file(&status_socket_path);
    let _ = std::fs::remove_file(&add_sync_socket_path);
    Ok(())
}
