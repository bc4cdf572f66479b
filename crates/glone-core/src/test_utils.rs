//! Shared test utilities for glone-core.
//!
//! This module is only compiled in test builds (`#[cfg(test)]`).

use std::path::PathBuf;

use tempfile::TempDir;

/// Write `content` to a `.netrc` file inside a fresh temporary directory.
///
/// The directory is removed when the returned guard is dropped.
pub fn write_netrc(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(".netrc");
    std::fs::write(&path, content).expect("write .netrc");
    (dir, path)
}
