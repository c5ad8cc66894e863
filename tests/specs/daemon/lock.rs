//! Single-instance enforcement (spec's *Single instance* testable
//! property): a second process racing for the same lock file observes
//! `LockHeld` without disturbing the first.

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(rbm_daemon)]
fn second_daemon_refuses_to_start_while_first_is_alive() {
    let sandbox = Sandbox::new();
    let local_dir = sandbox.path().join("local");
    std::fs::create_dir_all(&local_dir).unwrap();
    sandbox.write_config(&dormant_job_config(&local_dir, "photos"));

    let mut first = sandbox.spawn_daemon();
    sandbox.wait_for_socket();

    let second = sandbox.run(&["daemon", "start"]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("already running"));

    // The first instance's lock and sockets must be untouched.
    assert!(sandbox.lock_path().exists());
    assert!(sandbox.status_socket_path().exists());

    sandbox.run(&["daemon", "stop"]);
    wait_for_exit(&mut first);
}

#[test]
#[serial(rbm_daemon)]
fn one_shot_sync_refuses_to_run_alongside_a_live_daemon() {
    let sandbox = Sandbox::new();
    let local_dir = sandbox.path().join("local");
    std::fs::create_dir_all(&local_dir).unwrap();
    sandbox.write_config(&dormant_job_config(&local_dir, "photos"));

    let mut daemon = sandbox.spawn_daemon();
    sandbox.wait_for_socket();

    let sync = sandbox.run(&["sync", "photos"]);
    assert!(!sync.status.success());
    assert!(stderr(&sync).contains("already running"));

    sandbox.run(&["daemon", "stop"]);
    wait_for_exit(&mut daemon);
}
