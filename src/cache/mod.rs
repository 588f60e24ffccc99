//! Key Cache Module
//!
//! In-memory snapshot of each collection's key listing.
//!
//! ## Responsibilities
//! - Avoid a directory scan for every wildcard query
//! - Answer "does this exact key exist" without touching disk
//! - Stay correct-enough: entries are hints, fixed up on the next miss
//!
//! ## Consistency
//! The cache is never the source of truth. A key that is cached but gone
//! from disk is evicted when a read misses it; posts append to an existing
//! entry but never create one; deletes evict eagerly.

mod key_cache;

pub use key_cache::KeyCache;
