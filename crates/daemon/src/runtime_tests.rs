// SPDX-License-Identifier: MIT

use super::*;
use bisync_core::JobKey;

#[test]
fn snapshot_reflects_limbo_state() {
    let runtime = Runtime::new();
    runtime.enter_limbo("local_base_path missing".to_string());
    let snapshot = runtime.snapshot();
    assert!(snapshot.in_limbo);
    assert_eq!(snapshot.config_error_message.as_deref(), Some("local_base_path missing"));

    runtime.exit_limbo();
    assert!(!runtime.snapshot().in_limbo);
}

#[test]
fn snapshot_reflects_queue_state() {
    let runtime = Runtime::new();
    runtime.with_lock(|_scheduler, queue, _limbo| {
        queue.enqueue(JobKey::new("photos"));
    });
    let snapshot = runtime.snapshot();
    assert_eq!(snapshot.queued_paths, vec!["photos".to_string()]);
}
