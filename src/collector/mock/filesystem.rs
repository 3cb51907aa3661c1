//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory filesystem for testing.
///
/// Clones share the same underlying storage, so a test can keep a handle and
/// rewrite `/proc/stat` between cycles while the engine owns another clone.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    inner: Arc<RwLock<MockFsInner>>,
}

#[derive(Debug, Default)]
struct MockFsInner {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Paths whose reads fail with the stored error message.
    failing: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                inner.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        inner.failing.remove(&path);
        inner.files.insert(path, content.into());
    }

    /// Removes a file so that subsequent reads return `NotFound`.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.files.remove(path.as_ref());
    }

    /// Makes reads of `path` fail with a `PermissionDenied` error carrying `message`.
    pub fn fail_reads(&self, path: impl AsRef<Path>, message: impl Into<String>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner
            .failing
            .insert(path.as_ref().to_path_buf(), message.into());
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        if let Some(message) = inner.failing.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                message.clone(),
            ));
        }
        inner.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.files.contains_key(path) || inner.directories.contains(path)
    }
}
