//! Many threads against one container.

use crate::common::*;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

#[test]
fn concurrent_create_if_absent_creates_once() {
    let client = client();
    let (_, container) = family_container(&client);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                container.create_item_if_absent(&andersen()).unwrap().is_created()
            })
        })
        .collect();

    let created = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|created| *created)
        .count();
    assert_eq!(created, 1);
    assert_eq!(container.document_count().unwrap(), 1);
}

#[test]
fn concurrent_writers_on_distinct_partitions() {
    let client = client();
    let (_, container) = family_container(&client);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..50 {
                    let item = family(&format!("item-{}", i), &format!("family-{}", t), "Seattle");
                    container.create_item(&item).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(container.document_count().unwrap(), THREADS * 50);
    for t in 0..THREADS {
        let key = format!("family-{}", t);
        let mut feed = container
            .query_items_where::<Family>("lastName", key.as_str())
            .unwrap()
            .with_max_item_count(1000);
        assert_eq!(feed.read_next().unwrap().count(), 50);
    }
}

#[test]
fn conditional_replace_admits_one_winner_per_etag() {
    let client = client();
    let (_, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut item = andersen();
                item.address.city = format!("city-{}", t);
                barrier.wait();
                container.replace_item_if_match(&item, 1).is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
    assert_eq!(
        container.read_item("Andersen.1", "Andersen").unwrap().etag(),
        Some(2)
    );
}

#[test]
fn concurrent_database_creation_converges() {
    let client = Arc::new(client());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let client = Arc::clone(&client);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let (_, container) = family_container(&client);
                container.create_item_if_absent(&wakefield()).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(client.list_databases().unwrap(), vec!["FamilyDatabase"]);
    let (_, container) = family_container(&client);
    assert_eq!(container.document_count().unwrap(), 1);
}
