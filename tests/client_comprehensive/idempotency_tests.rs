//! Create-if-absent is idempotent at every level; strict create is not.

use crate::common::*;

#[test]
fn database_create_if_absent_twice() {
    let client = client();
    let first = client.create_database_if_absent("FamilyDatabase").unwrap();
    let second = client.create_database_if_absent("FamilyDatabase").unwrap();
    assert_eq!(first.status(), ResponseStatus::Created);
    assert_eq!(second.status(), ResponseStatus::Ok);
    assert_eq!(client.list_databases().unwrap(), vec!["FamilyDatabase"]);
}

#[test]
fn container_create_if_absent_twice() {
    let client = client();
    let (database, _) = family_container(&client);
    let again = database
        .create_container_if_absent("FamilyContainer", "/lastName")
        .unwrap();
    assert!(!again.is_created());
    assert_eq!(again.resource().partition_key_path(), "/lastName");
    assert_eq!(database.list_containers().unwrap(), vec!["FamilyContainer"]);
}

#[test]
fn container_with_other_partition_key_path_conflicts() {
    let client = client();
    let (database, _) = family_container(&client);
    let err = database
        .create_container_if_absent("FamilyContainer", "/address/city")
        .unwrap_err();
    match err {
        Error::ContainerConfigConflict {
            container,
            existing,
            requested,
        } => {
            assert_eq!(container, "FamilyContainer");
            assert_eq!(existing, "/lastName");
            assert_eq!(requested, "/address/city");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn item_create_if_absent_returns_stored_version() {
    let client = client();
    let (_, container) = family_container(&client);
    container.create_item_if_absent(&andersen()).unwrap();

    let mut changed = andersen();
    changed.address.city = "Chicago".to_string();
    let response = container.create_item_if_absent(&changed).unwrap();
    assert_eq!(response.status(), ResponseStatus::Ok);

    let stored: Family = response.deserialize().unwrap();
    assert_eq!(stored.address.city, "Seattle");
    assert_eq!(response.etag(), Some(1));
}

#[test]
fn strict_creates_fail_on_existing() {
    let client = client();
    let (database, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();

    assert!(matches!(
        client.create_database("FamilyDatabase"),
        Err(Error::AlreadyExists { resource: ResourceKind::Database, .. })
    ));
    assert!(matches!(
        database.create_container("FamilyContainer", "/lastName"),
        Err(Error::AlreadyExists { resource: ResourceKind::Container, .. })
    ));
    assert!(matches!(
        container.create_item(&andersen()),
        Err(Error::AlreadyExists { resource: ResourceKind::Document, .. })
    ));
}

#[test]
fn upsert_creates_then_replaces() {
    let client = client();
    let (_, container) = family_container(&client);
    let first = container.upsert_item(&wakefield()).unwrap();
    let second = container.upsert_item(&wakefield()).unwrap();
    assert_eq!(first.status(), ResponseStatus::Created);
    assert_eq!(second.status(), ResponseStatus::Ok);
    assert_eq!(second.etag(), Some(2));
    assert_eq!(container.document_count().unwrap(), 1);
}
