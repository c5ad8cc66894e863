// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn acquire_then_drop_releases_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.lock");
    {
        let _guard = acquire(&path).unwrap();
        assert!(path.exists());
    }
    assert!(!path.exists());
}

#[test]
fn acquire_fails_while_a_live_matching_process_holds_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.lock");
    let _guard = acquire(&path).unwrap();

    let err = acquire(&path).unwrap_err();
    assert!(matches!(err, DaemonError::LockHeld(_)));
}

#[test]
fn acquire_recovers_from_a_stale_file_with_a_dead_pid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.lock");
    // PID 1 as a placeholder for "some PID not owned by us" would be
    // flaky across environments; use a PID almost certainly unused.
    fs::write(&path, "2147483647").unwrap();

    let guard = acquire(&path).unwrap();
    assert!(path.exists());
    drop(guard);
    assert!(!path.exists());
}
