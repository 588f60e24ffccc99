//! Tests for SequenceCounter
//!
//! These tests verify:
//! - Sequences start at 1 and increase by 1
//! - Corrupt counter files restart the sequence
//! - Name validation
//! - Callers cancelled by a deadline never leave the sequence locked
//! - Uniqueness under concurrent callers, including separate engine
//!   instances sharing one storage area

use std::sync::Arc;
use std::time::Duration;

use rocketstore::config::Config;
use rocketstore::engine::Engine;
use rocketstore::sequence::SequenceCounter;
use rocketstore::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_counter() -> (TempDir, SequenceCounter) {
    let temp_dir = TempDir::new().unwrap();
    let counter = SequenceCounter::new(temp_dir.path(), true, Duration::from_millis(1));
    (temp_dir, counter)
}

async fn open_engine(area: &std::path::Path) -> Engine {
    let config = Config::builder()
        .storage_area(area)
        .lock_retry_interval_ms(1)
        .build();
    Engine::open(config).await.unwrap()
}

// =============================================================================
// Basic Tests
// =============================================================================

#[tokio::test]
async fn test_sequence_starts_at_one() {
    let (temp, counter) = setup_counter();

    assert_eq!(counter.next("first").await.unwrap(), 1);
    assert_eq!(counter.next("first").await.unwrap(), 2);

    let text = std::fs::read_to_string(temp.path().join("first_seq")).unwrap();
    assert_eq!(text, "2");
}

#[tokio::test]
async fn test_sequences_are_independent() {
    let (_temp, counter) = setup_counter();

    assert_eq!(counter.next("a").await.unwrap(), 1);
    assert_eq!(counter.next("a").await.unwrap(), 2);
    assert_eq!(counter.next("b").await.unwrap(), 1);
}

#[tokio::test]
async fn test_sequence_continues_existing_file() {
    let (temp, counter) = setup_counter();
    std::fs::write(temp.path().join("orders_seq"), "41").unwrap();

    assert_eq!(counter.next("orders").await.unwrap(), 42);
}

#[tokio::test]
async fn test_corrupt_counter_restarts() {
    let (temp, counter) = setup_counter();
    std::fs::write(temp.path().join("orders_seq"), "garbage").unwrap();

    assert_eq!(counter.next("orders").await.unwrap(), 1);
    assert_eq!(counter.next("orders").await.unwrap(), 2);
}

#[tokio::test]
async fn test_missing_storage_area_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let area = temp_dir.path().join("not").join("yet");
    let counter = SequenceCounter::new(&area, true, Duration::from_millis(1));

    assert_eq!(counter.next("first").await.unwrap(), 1);
    assert!(area.join("first_seq").is_file());
}

#[tokio::test]
async fn test_lock_marker_removed_after_next() {
    let (temp, counter) = setup_counter();

    counter.next("first").await.unwrap();

    assert_eq!(counter.lock_path("first"), temp.path().join("lockfile").join("first_seq"));
    assert!(!counter.lock_path("first").exists());
}

#[tokio::test]
async fn test_without_lock_files() {
    let temp_dir = TempDir::new().unwrap();
    let counter = SequenceCounter::new(temp_dir.path(), false, Duration::from_millis(1));

    assert_eq!(counter.next("first").await.unwrap(), 1);
    assert_eq!(counter.next("first").await.unwrap(), 2);
    assert!(!temp_dir.path().join("lockfile").exists());
}

#[tokio::test]
async fn test_invalid_sequence_name() {
    let (_temp, counter) = setup_counter();

    for name in ["", "*", "/", ".."] {
        let result = counter.next(name).await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))), "accepted {:?}", name);
    }
}

#[tokio::test]
async fn test_sequence_name_is_washed() {
    let (temp, counter) = setup_counter();

    assert_eq!(counter.next("../first").await.unwrap(), 1);
    assert!(temp.path().join("first_seq").is_file());
}

#[tokio::test]
async fn test_engine_sequence() {
    let temp_dir = TempDir::new().unwrap();
    let engine = open_engine(temp_dir.path()).await;

    assert_eq!(engine.sequence("first").await.unwrap(), 1);
    assert_eq!(engine.sequence("first").await.unwrap(), 2);
}

#[tokio::test]
async fn test_cancelled_next_leaves_no_marker() {
    let (_temp, counter) = setup_counter();

    for _ in 0..200 {
        let _ = tokio::time::timeout(Duration::from_nanos(1), counter.next("cancelled")).await;
        assert!(!counter.lock_path("cancelled").exists());
    }

    let value = tokio::time::timeout(Duration::from_secs(5), counter.next("cancelled"))
        .await
        .expect("sequence should not stay locked")
        .unwrap();
    assert!(value >= 1);
}

#[tokio::test]
async fn test_cancelled_engine_sequence_stays_usable() {
    let temp_dir = TempDir::new().unwrap();
    let engine = open_engine(temp_dir.path()).await;

    for _ in 0..200 {
        let _ = tokio::time::timeout(Duration::from_nanos(1), engine.sequence("cancelled")).await;
    }

    assert!(!temp_dir.path().join("lockfile").join("cancelled_seq").exists());
    let value = tokio::time::timeout(Duration::from_secs(5), engine.sequence("cancelled"))
        .await
        .expect("sequence should not stay locked")
        .unwrap();
    assert!(value >= 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_next_is_gapless() {
    let (_temp, counter) = setup_counter();
    let counter = Arc::new(counter);
    let n: u64 = 32;

    let handles: Vec<_> = (0..n)
        .map(|_| {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move { counter.next("shared").await.unwrap() })
        })
        .collect();

    let mut values = Vec::new();
    for handle in handles {
        values.push(handle.await.unwrap());
    }
    values.sort_unstable();

    assert_eq!(values, (1..=n).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_engines_share_sequence() {
    // Two engines with no shared memory stand in for two processes
    let temp_dir = TempDir::new().unwrap();
    let first = Arc::new(open_engine(temp_dir.path()).await);
    let second = Arc::new(open_engine(temp_dir.path()).await);
    let per_engine: u64 = 16;

    let mut handles = Vec::new();
    for engine in [&first, &second] {
        for _ in 0..per_engine {
            let engine = Arc::clone(engine);
            handles.push(tokio::spawn(async move { engine.sequence("shared").await.unwrap() }));
        }
    }

    let mut values = Vec::new();
    for handle in handles {
        values.push(handle.await.unwrap());
    }
    values.sort_unstable();

    assert_eq!(values, (1..=2 * per_engine).collect::<Vec<_>>());
}
