// SPDX-License-Identifier: MIT

//! `.filter_md5` tracking, grounded on
//! `original_source/rclone_bisync_manager/sync.py`'s handling of the
//! exclusion file: a changed filter invalidates every job's resync state
//! because bisync's stored listings no longer reflect the active filter
//! set.

use std::fs;
use std::path::Path;

use md5::{Digest, Md5};

use crate::error::StateError;

/// The hex MD5 fingerprint of the current exclusion-rules file, persisted
/// under `.filter_md5` in the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFingerprint(String);

impl FilterFingerprint {
    /// Hash the contents of `exclusion_rules_file`.
    pub fn compute(exclusion_rules_file: &Path) -> Result<Self, StateError> {
        let bytes = fs::read(exclusion_rules_file)?;
        let mut hasher = Md5::new();
        hasher.update(&bytes);
        Ok(Self(hex_encode(&hasher.finalize())))
    }

    /// Load the fingerprint stored at `path`. Missing file means "no
    /// fingerprint recorded yet" — not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, StateError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(Self(contents.trim().to_string()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &self.0)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "filter_fingerprint_tests.rs"]
mod tests;
