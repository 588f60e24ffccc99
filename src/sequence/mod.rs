//! Sequence Module
//!
//! Monotonic counters for auto-generated keys.
//!
//! ## Responsibilities
//! - Strictly increasing values per name, never issued twice
//! - Safe across independent processes sharing a storage area
//! - Tolerate missing or corrupt counter files (restart at 1)
//!
//! ## Files
//! ```text
//! {storage_area}/
//!   ├── {name}_seq          "42"
//!   └── lockfile/{name}     exists only while a counter is being bumped
//! ```
//!
//! An in-process mutex would not cover other processes, so the marker file
//! is the only synchronization used.

mod counter;
mod lock;

pub use counter::{SequenceCounter, SEQUENCE_SUFFIX};
pub use lock::{FileLock, LockGuard, LOCK_DIR};
