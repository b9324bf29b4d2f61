//! Shared helpers for unit tests.

use std::fs;
use tempfile::TempDir;

/// Creates an empty corpus directory that lives as long as the returned guard.
pub fn create_test_corpus_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Writes `content` to `relative` inside `dir`, creating parent folders.
pub fn create_test_file(dir: &TempDir, relative: &str, content: &str) {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
