// SPDX-License-Identifier: MIT

use super::*;
use crate::runtime::RuntimeSnapshot;

#[test]
fn report_without_config_marks_config_invalid_when_in_limbo() {
    let state = SyncStateStore::new();
    let snapshot = RuntimeSnapshot {
        in_limbo: true,
        config_error_message: Some("local_base_path missing".to_string()),
        config_changed_on_disk: false,
        currently_syncing: None,
        queued_paths: vec![],
        shutting_down: false,
    };
    let report = build_status_report(123, None, Path::new("/config.yaml"), &state, &snapshot);
    assert!(report.config_invalid);
    assert!(report.sync_jobs.is_empty());
}

#[test]
fn report_with_config_includes_every_job() {
    let dir = tempfile::tempdir().unwrap();
    let config = bisync_core::test_support::sample_config(dir.path().to_path_buf(), "photos");
    let state = SyncStateStore::new();
    let snapshot = RuntimeSnapshot {
        in_limbo: false,
        config_error_message: None,
        config_changed_on_disk: false,
        currently_syncing: Some("photos".to_string()),
        queued_paths: vec![],
        shutting_down: false,
    };
    let report = build_status_report(123, Some(&config), Path::new("/config.yaml"), &state, &snapshot);
    assert_eq!(report.currently_syncing.as_deref(), Some("photos"));
    assert!(report.sync_jobs.contains_key(&job_key("photos").to_string()));
}
