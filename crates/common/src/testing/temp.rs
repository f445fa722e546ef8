//! Temporary directory helper
//!
//! The directory and everything in it is removed when the guard drops.

#![allow(clippy::missing_errors_doc)]

use std::path::{Path, PathBuf};
use std::{fs, io};

/// Temporary directory that is automatically deleted when dropped
///
/// ```
/// use fyxed_common::testing::temp::TempDir;
///
/// let scratch = TempDir::new("ledger").unwrap();
/// let db_path = scratch.path().join("fyxed.db");
/// assert!(db_path.starts_with(scratch.path()));
/// ```
#[derive(Debug)]
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    /// Create a new temporary directory named `<prefix>-<uuid>`
    pub fn new(prefix: &str) -> io::Result<Self> {
        let path = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the directory (not created)
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Write a file into the directory and return its path
    pub fn create_file(&self, name: &str, contents: &str) -> io::Result<PathBuf> {
        let file_path = self.path.join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, contents)?;
        Ok(file_path)
    }

    /// Keep the directory on disk and return its path
    pub fn keep(mut self) -> PathBuf {
        std::mem::take(&mut self.path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        if !self.path.as_os_str().is_empty() && self.path.exists() {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_removed_on_drop() {
        let temp_dir = TempDir::new("fyxed-test").unwrap();
        let path = temp_dir.path().to_path_buf();
        assert!(path.exists());

        drop(temp_dir);
        assert!(!path.exists());
    }

    #[test]
    fn test_create_file_in_nested_dir() {
        let temp_dir = TempDir::new("fyxed-test").unwrap();
        let file = temp_dir.create_file("conf/fyxed.toml", "[logging]\nlevel = \"debug\"\n").unwrap();

        assert!(file.exists());
        assert_eq!(fs::read_to_string(file).unwrap(), "[logging]\nlevel = \"debug\"\n");
    }

    #[test]
    fn test_keep_leaves_directory() {
        let temp_dir = TempDir::new("fyxed-test").unwrap();
        let path = temp_dir.keep();
        assert!(path.exists());
        fs::remove_dir_all(&path).unwrap();
    }
}
