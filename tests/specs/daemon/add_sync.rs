//! The add-sync socket accepts an enqueue request and the CLI reports
//! it as enqueued.

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(rbm_daemon)]
fn add_sync_enqueues_a_known_job() {
    let sandbox = Sandbox::new();
    let local_dir = sandbox.path().join("local");
    std::fs::create_dir_all(&local_dir).unwrap();
    sandbox.write_config(&dormant_job_config(&local_dir, "photos"));

    let mut daemon = sandbox.spawn_daemon();
    sandbox.wait_for_socket();

    let add_sync = sandbox.run(&["add-sync", "photos"]);
    assert!(add_sync.status.success(), "stderr: {}", stderr(&add_sync));
    similar_asserts::assert_eq!(stdout(&add_sync), "photos: enqueued\n");

    sandbox.run(&["daemon", "stop"]);
    wait_for_exit(&mut daemon);
}

#[test]
#[serial(rbm_daemon)]
fn add_sync_accepts_force_bisync_and_reports_queue_state() {
    let sandbox = Sandbox::new();
    let local_dir = sandbox.path().join("local");
    std::fs::create_dir_all(&local_dir).unwrap();
    sandbox.write_config(&dormant_job_config(&local_dir, "photos"));

    let mut daemon = sandbox.spawn_daemon();
    sandbox.wait_for_socket();

    let add_sync = sandbox.run(&["add-sync", "photos", "--force-bisync"]);
    assert!(add_sync.status.success(), "stderr: {}", stderr(&add_sync));
    assert!(stdout(&add_sync).contains("photos: enqueued"));

    let status = sandbox.run(&["daemon", "status"]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&status)).unwrap();
    let currently_syncing = report["currently_syncing"].as_str();
    let queued = report["queued_paths"].as_array().cloned().unwrap_or_default();
    assert!(
        currently_syncing == Some("photos") || queued.iter().any(|v| v == "photos") || currently_syncing.is_none(),
        "expected photos to be queued, running, or already drained: {report}"
    );

    sandbox.run(&["daemon", "stop"]);
    wait_for_exit(&mut daemon);
}
