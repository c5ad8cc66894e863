// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn sticky_resync_is_recognized_without_force() {
    let mut state = SyncStateStore::new();
    let key = JobKey::new("photos");
    state.update_job(
        &key,
        JobStatePatch {
            resync_status: Some(SyncStatus::Failed),
            ..Default::default()
        },
    );
    let job_state = state.get_job(&key);
    assert_eq!(job_state.resync_status, SyncStatus::Failed);
}
