//! core::lock
//!
//! Exclusive lock on a data directory.
//!
//! The registries have a strict one-command-at-a-time contract: the
//! fulfillment engine's withdraw/rollback sequence is not safe under
//! interleaved mutation of the same ledger. Within one process that contract
//! holds trivially (commands run to completion); across processes it is
//! enforced here, with an OS-level exclusive lock on a file inside the data
//! directory.
//!
//! # Invariants
//!
//! - The lock is held for the lifetime of the front end (bridge or menu)
//! - The lock is released automatically on drop (RAII)
//! - Acquisition is non-blocking: a second process fails fast

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Name of the lock file inside the data directory.
pub const LOCK_FILE: &str = "lock";

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("data directory is in use by another larder process")]
    AlreadyLocked,

    /// Failed to create the lock file or its directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on a data directory.
///
/// Released when dropped, even if the holder panics.
#[derive(Debug)]
pub struct DataLock {
    path: PathBuf,
    /// When this is `Some`, we hold the lock.
    file: Option<File>,
}

impl DataLock {
    /// Attempt to acquire the lock for `data_dir`, creating the directory
    /// if needed.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] for other OS locking failures
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        fs::create_dir_all(data_dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", data_dir.display(), e))
        })?;

        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(LockError::AlreadyLocked)
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Whether this guard currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_creates_directory_and_holds_lock() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");

        let lock = DataLock::acquire(&data_dir).unwrap();
        assert!(lock.is_held());
        assert!(data_dir.join(LOCK_FILE).exists());
    }

    #[test]
    fn second_acquire_in_same_process_fails() {
        let dir = TempDir::new().unwrap();

        let _held = DataLock::acquire(dir.path()).unwrap();
        let second = DataLock::acquire(dir.path());
        assert!(matches!(second, Err(LockError::AlreadyLocked)));
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = TempDir::new().unwrap();

        let held = DataLock::acquire(dir.path()).unwrap();
        drop(held);
        let again = DataLock::acquire(dir.path()).unwrap();
        assert!(again.is_held());
    }
}
