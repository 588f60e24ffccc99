//! Tests for Engine deletes
//!
//! These tests verify:
//! - Deleting single records, patterns and whole collections
//! - Sequence files going with their collection
//! - Root-level deletes of collections and sequences by pattern
//! - Deleting the entire storage area
//! - Key cache eviction after deletes

use rocketstore::config::Config;
use rocketstore::engine::Engine;
use rocketstore::{GetOptions, PostOptions, StoreError};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

async fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .storage_area(temp_dir.path().join("rsdb"))
        .lock_retry_interval_ms(1)
        .build();
    let engine = Engine::open(config).await.unwrap();
    (temp_dir, engine)
}

/// Three sequenced records in fodders1, one each in fodders2 and fodders3
async fn setup_fodder(engine: &Engine) {
    let record = json!({"name": "Adam Smith"});
    for collection in ["delete_fodders1", "delete_fodders1", "delete_fodders1", "delete_fodders2", "delete_fodders3"] {
        engine.post(collection, "", &record, PostOptions::new()).await.unwrap();
    }
}

// =============================================================================
// Record Deletes
// =============================================================================

#[tokio::test]
async fn test_delete_exact_key() {
    let (_temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;

    let deleted = engine.delete("delete_fodders1", "1").await.unwrap();
    assert_eq!(deleted.count, 1);
    assert_eq!(deleted.key, None);

    let found = engine.get("delete_fodders1", "*", GetOptions::count()).await.unwrap();
    assert_eq!(found.count, 2);
}

#[tokio::test]
async fn test_delete_missing_key_counts_nothing() {
    let (_temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;

    let deleted = engine.delete("delete_fodders1", "42").await.unwrap();
    assert_eq!(deleted.count, 0);
}

#[tokio::test]
async fn test_delete_pattern_keeps_collection() {
    let (temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;

    let deleted = engine.delete("delete_fodders1", "*").await.unwrap();
    assert_eq!(deleted.count, 3);

    let area = temp.path().join("rsdb");
    assert!(area.join("delete_fodders1").is_dir());
    assert!(area.join("delete_fodders1_seq").is_file());
    assert_eq!(engine.key_cache().keys("delete_fodders1"), Some(Vec::new()));
}

#[tokio::test]
async fn test_delete_evicts_cached_keys() {
    let (_temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;
    engine.get("delete_fodders1", "*", GetOptions::count()).await.unwrap();

    engine.delete("delete_fodders1", "2").await.unwrap();

    assert_eq!(engine.key_cache().contains("delete_fodders1", "2"), Some(false));
    assert_eq!(engine.key_cache().contains("delete_fodders1", "3"), Some(true));
}

// =============================================================================
// Collection Deletes
// =============================================================================

#[tokio::test]
async fn test_delete_collection_and_sequence() {
    let (temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;
    engine.get("delete_fodders1", "*", GetOptions::count()).await.unwrap();

    let deleted = engine.delete("delete_fodders1", "").await.unwrap();
    assert_eq!(deleted.count, 2);

    let area = temp.path().join("rsdb");
    assert!(!area.join("delete_fodders1").exists());
    assert!(!area.join("delete_fodders1_seq").exists());
    assert!(!engine.key_cache().is_cached("delete_fodders1"));

    let found = engine.get("delete_fodders1", "*", GetOptions::new()).await.unwrap();
    assert_eq!(found.count, 0);
}

#[tokio::test]
async fn test_delete_nonexistent_collection() {
    let (_temp, engine) = setup_temp_engine().await;

    let deleted = engine.delete("delete_fodders1", "").await.unwrap();
    assert_eq!(deleted.count, 0);
}

#[tokio::test]
async fn test_sequence_restarts_after_collection_delete() {
    let (_temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;

    engine.delete("delete_fodders1", "").await.unwrap();

    let posted = engine
        .post("delete_fodders1", "", &json!(1), PostOptions::new())
        .await
        .unwrap();
    assert_eq!(posted.key, "1");
}

#[tokio::test]
async fn test_delete_rejects_illegal_collection() {
    let (_temp, engine) = setup_temp_engine().await;

    for name in ["1", "delete_fodders2/../*", "~/*"] {
        let result = engine.delete(name, "").await;
        assert!(matches!(result, Err(StoreError::InvalidCollection(_))));
    }
}

// =============================================================================
// Root Deletes
// =============================================================================

#[tokio::test]
async fn test_delete_collections_by_pattern() {
    let (temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;
    engine.get("delete_fodders2", "*", GetOptions::count()).await.unwrap();

    let deleted = engine.delete("", "*fodders?").await.unwrap();
    assert_eq!(deleted.count, 3);

    let area = temp.path().join("rsdb");
    assert!(!area.join("delete_fodders2").exists());
    assert!(area.join("delete_fodders2_seq").exists());
    assert!(!engine.key_cache().is_cached("delete_fodders2"));
}

#[tokio::test]
async fn test_delete_sequence_files() {
    let (_temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;

    let deleted = engine.delete("", "delete_fodders2_seq").await.unwrap();
    assert_eq!(deleted.count, 1);

    let deleted = engine.delete("", "delete_fodders*_seq").await.unwrap();
    assert_eq!(deleted.count, 2);

    let found = engine.get("", "*_seq", GetOptions::count()).await.unwrap();
    assert_eq!(found.count, 0);
}

#[tokio::test]
async fn test_root_pattern_never_touches_lock_directory() {
    let (temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;
    let lock_dir = temp.path().join("rsdb").join("lockfile");
    assert!(lock_dir.is_dir());

    engine.delete("", "*").await.unwrap();
    engine.delete("", "lockfile").await.unwrap();

    assert!(lock_dir.is_dir());
    let found = engine.get("", "*", GetOptions::count()).await.unwrap();
    assert_eq!(found.count, 0);
}

// =============================================================================
// Whole Store Deletes
// =============================================================================

#[tokio::test]
async fn test_delete_entire_store() {
    let (temp, engine) = setup_temp_engine().await;
    setup_fodder(&engine).await;
    engine.get("delete_fodders1", "*", GetOptions::count()).await.unwrap();

    let deleted = engine.delete("", "").await.unwrap();
    assert_eq!(deleted.count, 1);
    assert!(!temp.path().join("rsdb").exists());
    assert_eq!(engine.key_cache().collection_count(), 0);

    // Already gone
    let deleted = engine.delete("", "").await.unwrap();
    assert_eq!(deleted.count, 0);

    // Store is usable again
    let posted = engine
        .post("delete_fodders1", "", &json!(1), PostOptions::new())
        .await
        .unwrap();
    assert_eq!(posted.key, "1");
}
