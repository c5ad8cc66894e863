// SPDX-License-Identifier: MIT

use super::*;
use serial_test::serial;

#[test]
#[serial(rbm_env)]
fn config_path_honors_override() {
    std::env::set_var("RBM_CONFIG_PATH", "/tmp/example-config.yaml");
    assert_eq!(config_path().unwrap(), PathBuf::from("/tmp/example-config.yaml"));
    std::env::remove_var("RBM_CONFIG_PATH");
}

#[test]
#[serial(rbm_env)]
fn runtime_paths_default_under_tmp() {
    std::env::remove_var("RBM_RUNTIME_DIR");
    assert_eq!(lock_path(), PathBuf::from("/tmp/rclone_bisync_manager.lock"));
    assert_eq!(status_socket_path(), PathBuf::from("/tmp/rclone_bisync_manager_status.sock"));
    assert_eq!(add_sync_socket_path(), PathBuf::from("/tmp/rclone_bisync_manager_add_sync.sock"));
}

#[test]
#[serial(rbm_env)]
fn cache_dir_honors_xdg_cache_home() {
    std::env::remove_var("RBM_CACHE_DIR");
    std::env::set_var("XDG_CACHE_HOME", "/tmp/xdg-cache-test");
    assert_eq!(cache_dir().unwrap(), PathBuf::from("/tmp/xdg-cache-test/rclone-bisync-manager"));
    std::env::remove_var("XDG_CACHE_HOME");
}
