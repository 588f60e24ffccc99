//! Sequence Counter
//!
//! File-backed, strictly increasing integers per name:
//! `{storage_area}/{name}_seq` holds the last issued value as decimal text.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::storage::names;

use super::{FileLock, LOCK_DIR};

/// File name suffix of sequence counters
pub const SEQUENCE_SUFFIX: &str = "_seq";

/// Issues sequence numbers
///
/// Uniqueness across processes rests entirely on the lock marker; with
/// `lock_files` off, concurrent callers can be handed the same number.
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    /// Storage area root
    root: PathBuf,

    /// Take the lock marker around each increment
    lock_files: bool,

    /// Wait between lock attempts
    retry_interval: Duration,
}

impl SequenceCounter {
    /// Create a counter over a storage area
    pub fn new(root: impl Into<PathBuf>, lock_files: bool, retry_interval: Duration) -> Self {
        Self {
            root: root.into(),
            lock_files,
            retry_interval,
        }
    }

    /// Create a counter from the store config
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.storage_area,
            config.lock_files,
            config.lock_retry_interval,
        )
    }

    /// Next value of a sequence; the first call for a name returns 1
    ///
    /// Steps:
    /// 1. Acquire the lock marker (if enabled)
    /// 2. Read the counter; missing or unparseable counts as 0
    /// 3. Write back value + 1
    /// 4. Release the lock marker
    pub async fn next(&self, name: &str) -> Result<u64> {
        let name = names::sequence_name(name)
            .ok_or_else(|| StoreError::InvalidKey("Sequence name is invalid".to_string()))?;

        let guard = if self.lock_files {
            Some(
                FileLock::new(&self.root, &self.counter_file_name(&name), self.retry_interval)
                    .acquire()
                    .await?,
            )
        } else {
            None
        };

        // Release before surfacing any increment error
        let result = self.increment(&name).await;

        if let Some(guard) = guard {
            guard.release()?;
        }

        result
    }

    /// Counter file of a (washed) sequence name
    pub fn counter_path(&self, name: &str) -> PathBuf {
        self.root.join(self.counter_file_name(name))
    }

    /// Lock marker guarding a (washed) sequence name
    pub fn lock_path(&self, name: &str) -> PathBuf {
        self.root.join(LOCK_DIR).join(self.counter_file_name(name))
    }

    /// Storage area root
    pub fn root(&self) -> &Path {
        &self.root
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// `{name}_seq`, shared by the counter file and its lock marker
    fn counter_file_name(&self, name: &str) -> String {
        format!("{}{}", name, SEQUENCE_SUFFIX)
    }

    async fn increment(&self, name: &str) -> Result<u64> {
        let path = self.counter_path(name);

        let current = match fs::read_to_string(&path).await {
            Ok(text) => parse_counter(&text, name),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir).await?;
                }
                0
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                tracing::warn!(sequence = name, "Sequence file is not text, restarting");
                0
            }
            Err(e) => return Err(e.into()),
        };

        let next = current.checked_add(1).ok_or_else(|| {
            StoreError::Io(io::Error::new(
                ErrorKind::InvalidData,
                format!("Sequence '{}' exhausted", name),
            ))
        })?;

        fs::write(&path, next.to_string()).await?;

        tracing::trace!(sequence = name, value = next, "Sequence incremented");
        Ok(next)
    }
}

/// Parse a counter file; garbage restarts the sequence
fn parse_counter(text: &str, name: &str) -> u64 {
    match text.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(sequence = name, error = %e, "Unparseable sequence value, restarting");
            0
        }
    }
}
