use std::fs::{File, OpenOptions, TryLockError};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{BatchError, BatchResult};

/// Exclusive filesystem lock held for the lifetime of one batch.
///
/// The lock file records the holder's PID. Released on drop.
#[derive(Debug)]
pub struct BatchLock {
    file: File,
    path: PathBuf,
}

impl BatchLock {
    /// Blocks until the lock is free.
    pub fn acquire(path: impl AsRef<Path>) -> BatchResult<Self> {
        let path = path.as_ref();
        let file = Self::open(path)?;
        info!(path = %path.display(), "Waiting for batch lock");
        file.lock().map_err(|source| BatchError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        Self::locked(file, path)
    }

    /// Fails with [`BatchError::LockHeld`] if another holder exists.
    pub fn try_acquire(path: impl AsRef<Path>) -> BatchResult<Self> {
        let path = path.as_ref();
        let file = Self::open(path)?;
        match file.try_lock() {
            Ok(()) => Self::locked(file, path),
            Err(TryLockError::WouldBlock) => Err(BatchError::LockHeld {
                path: path.to_path_buf(),
            }),
            Err(TryLockError::Error(source)) => Err(BatchError::Lock {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path) -> BatchResult<File> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| BatchError::Lock {
                path: path.to_path_buf(),
                source,
            })?;
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| BatchError::Lock {
                path: path.to_path_buf(),
                source,
            })
    }

    fn locked(mut file: File, path: &Path) -> BatchResult<Self> {
        let pid = std::process::id();
        file.set_len(0)
            .and_then(|_| file.seek(SeekFrom::Start(0)))
            .and_then(|_| writeln!(file, "{pid}"))
            .and_then(|_| file.sync_data())
            .map_err(|source| BatchError::Lock {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), pid, "Acquired batch lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for BatchLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            debug!(path = %self.path.display(), error = %e, "Failed to release batch lock");
        } else {
            debug!(path = %self.path.display(), "Released batch lock");
        }
    }
}
