//! File-based locking to prevent overlapping runs.
//!
//! Uses flock-style advisory locking so two scheduled runs never write into
//! the same output directory at the same time.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::HostaggError;

/// Name of the lock file created inside the output directory.
pub const LOCK_FILE_NAME: &str = ".hostagg.lock";

/// A guard that holds an exclusive lock on the output directory.
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct LockGuard {
    _file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Attempt to acquire the lock for `dir`, creating the directory if needed.
    /// Returns [`HostaggError::Locked`] if another run holds it.
    pub fn acquire(dir: &Path) -> Result<Self, HostaggError> {
        std::fs::create_dir_all(dir).map_err(|e| HostaggError::write(dir, e))?;

        let path = dir.join(LOCK_FILE_NAME);

        // Open without truncating to avoid a race between create and lock
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| HostaggError::write(&path, e))?;

        file.try_lock_exclusive()
            .map_err(|_| HostaggError::Locked(dir.to_path_buf()))?;

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
