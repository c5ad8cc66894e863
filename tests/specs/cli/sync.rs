//! `sync` one-shot mode: config validation failures surface on stderr
//! with exit code 1, and a job list with no matches is rejected before
//! anything runs.

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(rbm_daemon)]
fn sync_rejects_an_invalid_config() {
    let sandbox = Sandbox::new();
    sandbox.write_config("local_base_path: /does/not/exist\nsync_jobs:\n  photos:\n    local: data\n    rclone_remote: r\n    remote: backup\n    schedule: \"* * * * *\"\n");

    let output = sandbox.run(&["sync"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("local_base_path"));
}

#[test]
#[serial(rbm_daemon)]
fn sync_rejects_unknown_keys_in_the_config_document() {
    let sandbox = Sandbox::new();
    let local_dir = sandbox.path().join("local");
    std::fs::create_dir_all(&local_dir).unwrap();
    sandbox.write_config(&format!(
        "local_base_path: {local_dir:?}\nnot_a_real_field: true\nsync_jobs:\n  photos:\n    local: data\n    rclone_remote: r\n    remote: backup\n    schedule: \"* * * * *\"\n"
    ));

    let output = sandbox.run(&["sync"]);
    assert!(!output.status.success());
}
