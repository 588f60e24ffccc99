//! Engine Module
//!
//! The query engine that coordinates all components.
//!
//! ## Responsibilities
//! - Validate collection names and wash keys
//! - Resolve a key or pattern to a key set (cache, or directory scan)
//! - Read or delete the resolved records as one concurrent batch
//! - Reconcile the key cache with what the filesystem turned out to hold
//! - Hand out auto-generated keys via the sequence counter

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;

use crate::cache::KeyCache;
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::query::{
    is_wildcard, keygen, GetOptions, Mode, Order, PostOptions, PostResult, QueryResult,
    WildcardPattern,
};
use crate::sequence::{SequenceCounter, LOCK_DIR};
use crate::storage::{names, RecordStore};

/// Upper bound on filesystem operations in flight for one call
const MAX_CONCURRENT_IO: usize = 64;

/// The record store engine
///
/// ## Concurrency Model
///
/// Every method takes `&self`; share the engine through an `Arc` and issue
/// calls from as many tasks as needed. Unrelated calls are not serialized
/// against each other. The only strict ordering is sequence monotonicity,
/// which is enforced by lock markers on disk and therefore holds across
/// processes too.
///
/// ## Call flow (get/delete)
/// ```text
/// Validate → ResolveKeys (cache or scan, match) → Read | Delete → ReconcileCache → Respond
/// ```
#[derive(Debug)]
pub struct Engine {
    /// Engine configuration (data format already normalized)
    config: Config,

    /// Record file access
    records: RecordStore,

    /// Sequence counters for generated keys
    sequences: SequenceCounter,

    /// Known keys per collection
    key_cache: KeyCache,
}

impl Engine {
    /// Open or create a store with the given config
    ///
    /// Validates the config and creates the storage area.
    pub async fn open(config: Config) -> Result<Self> {
        let config = config.validate()?;

        fs::create_dir_all(&config.storage_area).await.map_err(|e| {
            StoreError::Config(format!(
                "Unable to create data storage directory '{}': {}",
                config.storage_area.display(),
                e
            ))
        })?;

        tracing::debug!(storage_area = %config.storage_area.display(), "Engine opened");

        Ok(Self {
            records: RecordStore::new(&config.storage_area),
            sequences: SequenceCounter::from_config(&config),
            key_cache: KeyCache::new(),
            config,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified storage area
    pub async fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Config::builder().storage_area(path).build()).await
    }

    /// Insert or overwrite a record
    ///
    /// Steps:
    /// 1. Validate the collection, wash the key and strip wildcards
    /// 2. Prefix a sequence number if the key is empty or auto-increment is on
    /// 3. Prefix a GUID if requested
    /// 4. Write the record file
    /// 5. Append the key to the collection's cache entry, if there is one
    pub async fn post<T>(
        &self,
        collection: &str,
        key: &str,
        record: &T,
        options: PostOptions,
    ) -> Result<PostResult>
    where
        T: Serialize + ?Sized,
    {
        self.check_collection(collection)?;

        let key = names::post_key(key);

        let sequence = if key.is_empty() || options.auto_increment {
            Some(self.sequences.next(collection).await?)
        } else {
            None
        };
        let guid = options.guid.then(keygen::guid);
        let key = keygen::compose_key(&key, sequence, guid.as_deref());

        self.records.write(collection, &key, record).await?;
        self.key_cache.append(collection, &key);

        tracing::debug!(collection, key = %key, "Posted record");
        Ok(PostResult { key, count: 1 })
    }

    /// Look up records by exact key or pattern
    ///
    /// An empty collection addresses the storage area itself (collections
    /// and sequence files). An empty key or one containing `*`/`?` is a
    /// pattern; anything else is an exact key. With `Mode::Delete` the
    /// resolved entries are removed instead of read.
    pub async fn get(
        &self,
        collection: &str,
        key: &str,
        options: GetOptions,
    ) -> Result<QueryResult> {
        if !collection.is_empty() {
            self.check_collection(collection)?;
        }
        let key = names::query_key(key);

        // Step 1: Resolve the key set
        let mut keys = self.resolve_keys(collection, &key, options).await?;
        let mut count = keys.len();
        let mut evictions = Vec::new();
        let mut records = Vec::new();

        // Step 2: Read or delete
        match options.mode {
            Mode::Read if !collection.is_empty() && !keys.is_empty() => {
                let bodies = self.read_all(collection, &keys).await?;

                let mut found = Vec::with_capacity(keys.len());
                for (key, body) in keys.into_iter().zip(bodies) {
                    match body {
                        Some(value) => {
                            found.push(key);
                            records.push(value);
                        }
                        // Cached but gone from disk
                        None => evictions.push(key),
                    }
                }
                keys = found;
                count = keys.len();
            }
            Mode::Delete => {
                count = self.delete_resolved(collection, &key, &keys).await?;
                if !key.is_empty() {
                    evictions = std::mem::take(&mut keys);
                }
            }
            _ => {}
        }

        // Step 3: Reconcile cache after the batch has completed
        self.apply_evictions(collection, &evictions);

        tracing::debug!(collection, key = %key, mode = ?options.mode, count, "Query complete");

        let returns_keys =
            matches!(options.mode, Mode::Read | Mode::Keys) && count > 0 && !keys.is_empty();

        Ok(QueryResult {
            count,
            key: returns_keys.then_some(keys),
            result: (!records.is_empty()).then_some(records),
        })
    }

    /// Delete records, collections or the whole store
    ///
    /// - `("", "")`: the entire storage area
    /// - `(collection, "")`: the collection directory and its sequence file
    /// - otherwise: every entry the key or pattern resolves to
    pub async fn delete(&self, collection: &str, key: &str) -> Result<QueryResult> {
        self.get(collection, key, GetOptions::delete()).await
    }

    /// Next value of a named sequence (first call returns 1)
    pub async fn sequence(&self, name: &str) -> Result<u64> {
        self.sequences.next(name).await
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the storage area path
    pub fn storage_area(&self) -> &Path {
        &self.config.storage_area
    }

    /// Get the key cache
    pub fn key_cache(&self) -> &KeyCache {
        &self.key_cache
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_collection(&self, collection: &str) -> Result<()> {
        if collection.is_empty() {
            return Err(StoreError::InvalidCollection(
                "No valid collection name given".to_string(),
            ));
        }
        if !names::is_valid_collection(collection, self.config.name_check) {
            return Err(StoreError::InvalidCollection(format!(
                "Collection name '{}' contains illegal characters",
                collection.escape_debug()
            )));
        }
        Ok(())
    }

    /// Turn a washed key into the set of keys the call operates on
    async fn resolve_keys(
        &self,
        collection: &str,
        key: &str,
        options: GetOptions,
    ) -> Result<Vec<String>> {
        let delete_everything = options.mode == Mode::Delete && key.is_empty();

        if is_wildcard(key) {
            if delete_everything {
                return Ok(Vec::new());
            }

            let listing = self.list(collection).await?;
            let mut keys = WildcardPattern::compile(key).filter(&listing);

            if options.sorts() {
                keys.sort_unstable();
                if options.order == Order::Desc {
                    keys.reverse();
                }
            }
            return Ok(keys);
        }

        if collection.is_empty() {
            // Root entries are never cached, so confirm existence here
            if key == LOCK_DIR || !RecordStore::exists(&self.config.storage_area.join(key)).await? {
                return Ok(Vec::new());
            }
            return Ok(vec![key.to_string()]);
        }

        match self.key_cache.contains(collection, key) {
            Some(false) => Ok(Vec::new()),
            // Cached hit, or unknown: existence is confirmed lazily on read
            _ => Ok(vec![key.to_string()]),
        }
    }

    /// Keys of a collection, or entries of the storage area when `collection` is empty
    async fn list(&self, collection: &str) -> Result<Vec<String>> {
        if collection.is_empty() {
            let mut entries = RecordStore::list(&self.config.storage_area).await?;
            entries.retain(|name| name != LOCK_DIR);
            return Ok(entries);
        }

        self.key_cache
            .refresh(collection, &self.records.collection_dir(collection))
            .await
    }

    /// Read records concurrently, preserving key order
    async fn read_all(&self, collection: &str, keys: &[String]) -> Result<Vec<Option<Value>>> {
        stream::iter(keys)
            .map(|key| self.records.read(collection, key))
            .buffered(MAX_CONCURRENT_IO)
            .try_collect()
            .await
    }

    /// Remove paths concurrently; returns how many existed
    async fn remove_all(&self, paths: Vec<PathBuf>) -> Result<usize> {
        let removed: Vec<bool> = stream::iter(paths)
            .map(|path| async move { RecordStore::remove(&path).await })
            .buffer_unordered(MAX_CONCURRENT_IO)
            .try_collect()
            .await?;

        Ok(removed.into_iter().filter(|existed| *existed).count())
    }

    /// Execute a delete over resolved keys; returns the number of entries removed
    async fn delete_resolved(&self, collection: &str, key: &str, keys: &[String]) -> Result<usize> {
        let root = &self.config.storage_area;

        match (collection.is_empty(), key.is_empty()) {
            // Entire store
            (true, true) => {
                let removed = RecordStore::remove(root).await?;
                self.key_cache.evict_all();
                tracing::debug!(storage_area = %root.display(), removed, "Deleted storage area");
                Ok(usize::from(removed))
            }

            // Collection plus its sequence file
            (false, true) => {
                let paths = vec![
                    self.records.collection_dir(collection),
                    self.sequences.counter_path(collection),
                ];
                let removed = self.remove_all(paths).await?;
                self.key_cache.evict_collection(collection);
                Ok(removed)
            }

            // Matched records, or matched root entries
            _ => {
                let paths = keys
                    .iter()
                    .map(|k| {
                        if collection.is_empty() {
                            root.join(k)
                        } else {
                            self.records.record_path(collection, k)
                        }
                    })
                    .collect();
                self.remove_all(paths).await
            }
        }
    }

    fn apply_evictions(&self, collection: &str, keys: &[String]) {
        if keys.is_empty() {
            return;
        }

        if collection.is_empty() {
            // Root entries are collections (or sequence files, which are never cached)
            for name in keys {
                self.key_cache.evict_collection(name);
            }
        } else {
            self.key_cache.evict(collection, keys);
        }
    }
}
