//! Key Cache implementation
//!
//! HashMap of collection → key list, behind a parking_lot RwLock.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use parking_lot::RwLock;

use crate::error::Result;
use crate::storage::RecordStore;

/// Per-collection key listing cache
///
/// ## Concurrency:
/// - `entries`: RwLock, held only for the in-memory step of each call
/// - Directory listings happen with no lock held, so a concurrent post and
///   a refresh may interleave; the loser is corrected on the next miss
#[derive(Debug, Default)]
pub struct KeyCache {
    entries: RwLock<HashMap<String, Vec<String>>>,
}

impl KeyCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached keys of a collection, listing `dir` if there is no entry
    ///
    /// A missing directory lists as empty. Empty listings are returned but
    /// not cached.
    pub async fn refresh(&self, collection: &str, dir: &Path) -> Result<Vec<String>> {
        if let Some(keys) = self.keys(collection) {
            return Ok(keys);
        }

        let listed = RecordStore::list(dir).await?;
        tracing::trace!(collection, keys = listed.len(), "Refreshed key cache from directory");

        Ok(self.populate(collection, listed))
    }

    /// Install a listing for a collection unless an entry already exists
    ///
    /// Returns whichever listing ends up authoritative.
    pub fn populate(&self, collection: &str, keys: Vec<String>) -> Vec<String> {
        if keys.is_empty() {
            return self.keys(collection).unwrap_or_default();
        }

        let mut entries = self.entries.write();
        entries
            .entry(collection.to_string())
            .or_insert(keys)
            .clone()
    }

    /// Snapshot of a collection's keys, `None` if not cached
    pub fn keys(&self, collection: &str) -> Option<Vec<String>> {
        self.entries.read().get(collection).cloned()
    }

    /// Whether a collection has an entry
    pub fn is_cached(&self, collection: &str) -> bool {
        self.entries.read().contains_key(collection)
    }

    /// Membership test
    ///
    /// - `Some(true)` / `Some(false)`: answered from the cache
    /// - `None`: collection not cached, caller has to go to disk
    pub fn contains(&self, collection: &str, key: &str) -> Option<bool> {
        self.entries
            .read()
            .get(collection)
            .map(|keys| keys.iter().any(|k| k == key))
    }

    /// Add a key to an existing entry
    ///
    /// No-op (returns `false`) when the collection is not cached or the key
    /// is already present.
    pub fn append(&self, collection: &str, key: &str) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(collection) {
            Some(keys) if !keys.iter().any(|k| k == key) => {
                keys.push(key.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove keys from a collection's entry
    pub fn evict(&self, collection: &str, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        let evicted: HashSet<&str> = keys.iter().map(String::as_str).collect();

        let mut entries = self.entries.write();
        if let Some(cached) = entries.get_mut(collection) {
            cached.retain(|k| !evicted.contains(k.as_str()));
        }
    }

    /// Drop a whole collection entry
    pub fn evict_collection(&self, collection: &str) {
        self.entries.write().remove(collection);
    }

    /// Drop every entry
    pub fn evict_all(&self) {
        self.entries.write().clear();
    }

    /// Number of cached collections
    pub fn collection_count(&self) -> usize {
        self.entries.read().len()
    }
}
