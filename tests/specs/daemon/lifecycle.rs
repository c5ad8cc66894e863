//! End-to-end: invalid config at startup, limbo responsiveness, and
//! graceful stop (spec scenarios 4 and 6).

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(rbm_daemon)]
fn invalid_config_enters_limbo_and_status_reports_it() {
    let sandbox = Sandbox::new();
    sandbox.write_config("local_base_path: /does/not/exist\nsync_jobs:\n  photos:\n    local: data\n    rclone_remote: r\n    remote: backup\n    schedule: \"0 0 1 1 *\"\n");

    let mut daemon = sandbox.spawn_daemon();
    sandbox.wait_for_socket();

    let status = sandbox.run(&["daemon", "status"]);
    assert!(status.status.success(), "stderr: {}", stderr(&status));
    let body = stdout(&status);
    let report: serde_json::Value = serde_json::from_str(&body).expect("status is JSON");
    assert_eq!(report["in_limbo"], true);
    assert_eq!(report["config_invalid"], true);
    assert!(report["config_error_message"].as_str().unwrap_or_default().contains("local_base_path"));

    let stop = sandbox.run(&["daemon", "stop"]);
    assert!(stop.status.success(), "stderr: {}", stderr(&stop));

    let exit = wait_for_exit(&mut daemon);
    assert!(exit.success());
    assert!(!sandbox.lock_path().exists());
    assert!(!sandbox.status_socket_path().exists());
}

#[test]
#[serial(rbm_daemon)]
fn reload_clears_limbo_once_config_is_fixed() {
    let sandbox = Sandbox::new();
    let local_dir = sandbox.path().join("local");
    std::fs::create_dir_all(&local_dir).unwrap();

    sandbox.write_config("local_base_path: /does/not/exist\nsync_jobs:\n  photos:\n    local: data\n    rclone_remote: r\n    remote: backup\n    schedule: \"0 0 1 1 *\"\n");
    let mut daemon = sandbox.spawn_daemon();
    sandbox.wait_for_socket();

    let status = sandbox.run(&["daemon", "status"]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&status)).unwrap();
    assert_eq!(report["in_limbo"], true);

    sandbox.write_config(&dormant_job_config(&local_dir, "photos"));
    let reload = sandbox.run(&["daemon", "reload"]);
    assert!(reload.status.success());
    let reload_body: serde_json::Value = serde_json::from_str(&stdout(&reload)).unwrap();
    assert_eq!(reload_body["status"], "success");

    let status = sandbox.run(&["daemon", "status"]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&status)).unwrap();
    assert_eq!(report["in_limbo"], false);
    assert!(report["sync_jobs"]["photos"].is_object());

    sandbox.run(&["daemon", "stop"]);
    wait_for_exit(&mut daemon);
}
