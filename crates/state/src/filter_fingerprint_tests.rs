// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn compute_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exclude.txt");
    std::fs::write(&path, "*.tmp\n*.log\n").unwrap();
    let a = FilterFingerprint::compute(&path).unwrap();
    let b = FilterFingerprint::compute(&path).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_contents_hash_differently() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.txt");
    let path_b = dir.path().join("b.txt");
    std::fs::write(&path_a, "*.tmp\n").unwrap();
    std::fs::write(&path_b, "*.log\n").unwrap();
    let a = FilterFingerprint::compute(&path_a).unwrap();
    let b = FilterFingerprint::compute(&path_b).unwrap();
    assert_ne!(a, b);
}

#[test]
fn load_returns_none_for_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".filter_md5");
    assert!(FilterFingerprint::load(&path).unwrap().is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let exclude_path = dir.path().join("exclude.txt");
    std::fs::write(&exclude_path, "*.tmp\n").unwrap();
    let fingerprint_path = dir.path().join(".filter_md5");

    let computed = FilterFingerprint::compute(&exclude_path).unwrap();
    computed.save(&fingerprint_path).unwrap();
    let loaded = FilterFingerprint::load(&fingerprint_path).unwrap().unwrap();
    assert_eq!(loaded, computed);
}
