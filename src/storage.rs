//! Data file access.
//!
//! The repository is persisted as a single snapshot file. Writes go to a
//! temp file in the same directory and are renamed into place while holding
//! the sibling lock file, so readers never see a partial snapshot.
//!
//! ```text
//! tasks.csv        # current snapshot
//! tasks.csv.lock   # advisory lock taken by writers
//! tasks.csv.tmp    # in-flight write, renamed over tasks.csv
//! ```

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::lock::{lock_path_for, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

#[derive(Debug, Clone)]
pub struct Storage {
    data_file: PathBuf,
    lock_timeout_ms: u64,
}

impl Storage {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn lock_file(&self) -> PathBuf {
        lock_path_for(&self.data_file)
    }

    /// Contents of the data file, or `None` if it does not exist yet.
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.data_file) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Replace the data file with `data` (lock, write temp, fsync, rename).
    pub fn write_atomic(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.data_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let _lock = FileLock::acquire(self.lock_file(), self.lock_timeout_ms)?;
        let temp_path = self.data_file.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.data_file)?;

        tracing::trace!(path = %self.data_file.display(), bytes = data.len(), "snapshot written");
        Ok(())
    }
}
