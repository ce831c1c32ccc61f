use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Fresh temporary directory for file-based tests.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Writes `content` to `filename` inside `dir` and returns the full path.
pub fn create_test_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}
