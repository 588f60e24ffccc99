//! Exclusive Lock
//!
//! Cross-process mutual exclusion through atomic create-if-absent of a
//! marker file: `{storage_area}/lockfile/{name}`. The marker existing means
//! held; absent means free.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;

use crate::error::{Result, StoreError};

/// Directory below the storage area that holds lock markers
pub const LOCK_DIR: &str = "lockfile";

/// A named lock marker
///
/// ## State machine
/// ```text
/// Unlocked ──acquire──▶ Acquiring ──created──▶ Held ──release──▶ Unlocked
///                         │    ▲
///                         └────┘ exists: sleep retry_interval
/// ```
/// Acquisition retries forever; bound it externally (e.g. `tokio::time::timeout`)
/// if needed.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
    retry_interval: Duration,
}

impl FileLock {
    /// Lock `name` inside a storage area
    pub fn new(storage_area: &Path, name: &str, retry_interval: Duration) -> Self {
        Self {
            path: storage_area.join(LOCK_DIR).join(name),
            retry_interval,
        }
    }

    /// Marker path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether some holder currently owns the marker
    pub async fn is_held(&self) -> Result<bool> {
        match fs::symlink_metadata(&self.path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Take the lock, waiting as long as it takes
    ///
    /// The marker is created synchronously so the guard exists before the
    /// next suspension point. A caller cancelled mid-wait never owns a marker.
    pub async fn acquire(&self) -> Result<LockGuard> {
        let mut attempts: u64 = 0;

        loop {
            let created = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.path);

            match created {
                Ok(_) => {
                    if attempts > 0 {
                        tracing::trace!(lock = %self.path.display(), attempts, "Lock acquired after contention");
                    }
                    return Ok(LockGuard {
                        path: self.path.clone(),
                        released: false,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    attempts += 1;
                    tracing::trace!(lock = %self.path.display(), attempts, "Lock busy, retrying");
                    tokio::time::sleep(self.retry_interval).await;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    // Lock directory missing (first use, or the store was wiped)
                    if let Some(dir) = self.path.parent() {
                        fs::create_dir_all(dir).await?;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Proof of holding a lock
///
/// Call [`LockGuard::release`]. If the guard is dropped without it (the
/// holding future was cancelled) the marker is removed synchronously.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    released: bool,
}

impl LockGuard {
    /// Remove the marker
    ///
    /// An already-missing marker counts as released. Removal is synchronous,
    /// so the guard is never left half-released.
    pub fn release(mut self) -> Result<()> {
        let removed = std::fs::remove_file(&self.path);
        self.released = true;

        match removed {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Lock(format!(
                "Failed to release {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(lock = %self.path.display(), error = %e, "Failed to remove abandoned lock");
                }
            }
        }
    }
}
