//! Storage Module
//!
//! Filesystem layer: the directory namespace is the index.
//!
//! ## Responsibilities
//! - Map (collection, key) to `{storage_area}/{collection}/{key}`
//! - Read and write records as JSON text
//! - Keep unsafe names away from the filesystem
//!
//! ## Layout
//! ```text
//! {storage_area}/
//!   ├── person/
//!   │     ├── 1                  {"name": "Adam Smith", ...}
//!   │     └── 22756-Adam Smith   {"name": "Adam Smith", ...}
//!   ├── person_seq               2
//!   └── lockfile/                (transient lock markers)
//! ```

pub mod names;
mod record;

pub use record::RecordStore;
