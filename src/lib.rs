//! # RocketStore
//!
//! A minimal record store that uses the filesystem namespace as its index:
//! - A collection is a directory, a key is a file name, a record is JSON text
//! - Wildcard (`*`, `?`) queries over a per-collection key cache
//! - Auto-incrementing keys from file-backed sequences
//! - Cross-process safe sequences through lock marker files
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Query Engine                            │
//! │            (post / get / delete / sequence)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!     ┌─────────────────┼──────────────────┬──────────────────┐
//!     │                 │                  │                  │
//!     ▼                 ▼                  ▼                  ▼
//! ┌──────────┐   ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │Validator │   │  Key Cache  │   │ Record Store │   │  Sequence   │
//! │ (names)  │   │  (RwLock)   │   │    (JSON)    │   │   Counter   │
//! └──────────┘   └──────┬──────┘   └──────┬───────┘   └──────┬──────┘
//!                       │                 │                  │
//!                ┌──────▼──────┐          │           ┌──────▼──────┐
//!                │  Wildcard   │          │           │ Exclusive   │
//!                │  Matcher    │          │           │ Lock (file) │
//!                └─────────────┘          │           └──────┬──────┘
//!                                         ▼                  ▼
//!                              ┌─────────────────────────────────┐
//!                              │   Filesystem (storage area)     │
//!                              └─────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rocketstore::{Config, Engine, GetOptions, PostOptions};
//!
//! # async fn run() -> rocketstore::Result<()> {
//! let engine = Engine::open(Config::builder().storage_area("./data").build()).await?;
//!
//! let posted = engine.post("person", "", &serde_json::json!({"name": "Adam"}), PostOptions::new()).await?;
//! let found = engine.get("person", "*", GetOptions::new()).await?;
//! assert_eq!(found.keys(), &[posted.key]);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod cache;
pub mod query;
pub mod sequence;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, DataFormat, NameCheck};
pub use engine::Engine;
pub use query::{GetOptions, Mode, Order, PostOptions, PostResult, QueryResult};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RocketStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
