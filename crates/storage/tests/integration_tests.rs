//! Integration tests for the storage layer
//!
//! These tests drive the catalog, container store and query engine together:
//! - Writers and scans on the same container
//! - Deletion racing with writers
//! - Bucket distribution

use std::sync::{Arc, Barrier};
use std::thread;

use docstore_core::{Error, JsonPath, JsonValue, PartitionKey, PartitionKeyPath};
use docstore_storage::{query, ContainerOptions, ContainerStore, DatabaseCatalog};
use serde_json::json;

// ============================================================================
// Helper Functions
// ============================================================================

fn last_name_path() -> PartitionKeyPath {
    "/lastName".parse().unwrap()
}

fn body(id: &str, last_name: &str) -> JsonValue {
    JsonValue::from(json!({"id": id, "lastName": last_name, "city": "Seattle"}))
}

fn store(partition_count: u32) -> Arc<ContainerStore> {
    let options = ContainerOptions {
        partition_count,
        ..ContainerOptions::default()
    };
    Arc::new(ContainerStore::new("families", last_name_path(), options).unwrap())
}

// ============================================================================
// Concurrent access
// ============================================================================

#[test]
fn scans_see_only_committed_documents() {
    let store = store(8);
    let barrier = Arc::new(Barrier::new(5));

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..200 {
                    store
                        .create(body(&format!("{}-{}", t, i), &format!("family-{}", i % 10)))
                        .unwrap();
                }
            })
        })
        .collect();

    let city: JsonPath = "city".parse().unwrap();
    barrier.wait();
    for _ in 0..20 {
        for document in query(&store, "city", "Seattle").unwrap() {
            assert!(document.etag() >= 1);
            assert_eq!(document.attribute(&city), Some(&json!("Seattle")));
        }
    }
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(query(&store, "city", "Seattle").unwrap().count(), 800);
    assert_eq!(store.document_count(), 800);
}

#[test]
fn replaces_on_one_document_serialize() {
    let store = store(4);
    store.create(body("hot", "Smith")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..100 {
                    store.replace(body("hot", "Smith")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stored = store.read("hot", &PartitionKey::new("Smith")).unwrap();
    assert_eq!(stored.etag(), 801);
}

#[test]
fn deletion_racing_with_writers_leaves_nothing_behind() {
    let catalog = Arc::new(DatabaseCatalog::new("db", ContainerOptions::default()).unwrap());
    let (store, _) = catalog
        .create_container_if_absent("families", last_name_path())
        .unwrap();
    let barrier = Arc::new(Barrier::new(5));

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut failures = 0;
                for i in 0..500 {
                    match store.create(body(&format!("{}-{}", t, i), "Smith")) {
                        Ok(_) => {}
                        Err(Error::NotFound { .. }) => failures += 1,
                        Err(other) => panic!("unexpected error: {:?}", other),
                    }
                }
                failures
            })
        })
        .collect();

    barrier.wait();
    catalog.delete_container("families").unwrap();
    for writer in writers {
        writer.join().unwrap();
    }

    assert!(store.is_deleted());
    assert_eq!(store.document_count(), 0);
    assert!(query(&store, "lastName", "Smith").is_err());
}

// ============================================================================
// Distribution
// ============================================================================

#[test]
fn distinct_keys_spread_over_buckets() {
    let store = store(16);
    for i in 0..1_000 {
        store.create(body("x", &format!("family-{}", i))).unwrap();
    }
    let used = store
        .router()
        .partition_ids()
        .filter(|id| store.partition_len(*id) > 0)
        .count();
    assert_eq!(used, 16);
}

#[test]
fn one_key_stays_in_one_bucket() {
    let store = store(16);
    for i in 0..100 {
        store.create(body(&format!("doc-{}", i), "Smith")).unwrap();
    }
    let sizes: Vec<usize> = store
        .router()
        .partition_ids()
        .map(|id| store.partition_len(id))
        .filter(|len| *len > 0)
        .collect();
    assert_eq!(sizes, vec![100]);
}
