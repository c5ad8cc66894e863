// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn default_is_none() {
    assert_eq!(SyncStatus::default(), SyncStatus::None);
}

#[test]
fn serializes_to_spec_strings() {
    assert_eq!(serde_json::to_string(&SyncStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
    assert_eq!(serde_json::to_string(&SyncStatus::Completed).unwrap(), "\"COMPLETED\"");
}

#[test]
fn round_trips_through_json() {
    for status in [
        SyncStatus::None,
        SyncStatus::InProgress,
        SyncStatus::Completed,
        SyncStatus::Failed,
    ] {
        let json = serde_json::to_string(&status).unwrap();
        let back: SyncStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }
}
