//! Reads the three `/proc` sources a sampling cycle needs.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collector::traits::FileSystem;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// A source file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The blocking read task panicked or was cancelled.
    Task(String),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            CollectError::Task(msg) => write!(f, "read task failed: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io { source, .. } => Some(source),
            CollectError::Task(_) => None,
        }
    }
}

impl From<tokio::task::JoinError> for CollectError {
    fn from(e: tokio::task::JoinError) -> Self {
        CollectError::Task(e.to_string())
    }
}

/// Raw text of one cycle's sources, read together.
#[derive(Debug, Clone, Default)]
pub struct RawSources {
    /// Content of `/proc/stat`.
    pub stat: String,
    /// Content of `/proc/meminfo`.
    pub meminfo: String,
    /// Content of `/proc/loadavg`.
    pub loadavg: String,
}

/// Reads `/proc/stat`, `/proc/meminfo` and `/proc/loadavg`.
///
/// The three reads run concurrently on Tokio's blocking pool. Either all of
/// them succeed or the first failure is returned and nothing is kept.
pub struct Collector<F: FileSystem> {
    fs: Arc<F>,
    proc_path: PathBuf,
}

impl<F: FileSystem + 'static> Collector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs: Arc::new(fs),
            proc_path: proc_path.into(),
        }
    }

    pub fn proc_path(&self) -> &Path {
        &self.proc_path
    }

    /// Checks that every source file exists under the proc path.
    ///
    /// Returns the paths that are missing; empty when all are present.
    pub fn missing_sources(&self) -> Vec<PathBuf> {
        ["stat", "meminfo", "loadavg"]
            .iter()
            .map(|name| self.proc_path.join(name))
            .filter(|path| !self.fs.exists(path))
            .collect()
    }

    /// Reads all three sources.
    pub async fn collect(&self) -> Result<RawSources, CollectError> {
        let (stat, meminfo, loadavg) = tokio::try_join!(
            self.read_source("stat"),
            self.read_source("meminfo"),
            self.read_source("loadavg"),
        )?;

        Ok(RawSources {
            stat,
            meminfo,
            loadavg,
        })
    }

    async fn read_source(&self, name: &str) -> Result<String, CollectError> {
        let path = self.proc_path.join(name);
        let fs = Arc::clone(&self.fs);
        let read_path = path.clone();

        tokio::task::spawn_blocking(move || fs.read_to_string(&read_path))
            .await?
            .map_err(|source| CollectError::Io { path, source })
    }
}
