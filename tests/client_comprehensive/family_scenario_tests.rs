//! The family walkthrough end to end: create, query, read-modify-write,
//! delete.

use crate::common::*;

#[test]
fn walkthrough_create_query_replace_delete() {
    let client = metered_client();
    let (database, container) = family_container(&client);

    let created = container.create_item_if_absent(&andersen()).unwrap();
    assert_eq!(created.status(), ResponseStatus::Created);
    assert!(created.request_charge().value() >= 1.0);
    container.create_item_if_absent(&wakefield()).unwrap();

    let ids = query_ids(&container, "SELECT * FROM c WHERE c.lastName = 'Andersen'");
    assert_eq!(ids, vec!["Andersen.1"]);

    let read = container.read_item("Andersen.1", "Andersen").unwrap();
    let mut family: Family = read.deserialize().unwrap();
    family.is_registered = true;
    family.children[0].age = 18;
    let replaced = container
        .replace_item_if_match(&family, read.etag().unwrap())
        .unwrap();
    assert_eq!(replaced.status(), ResponseStatus::Ok);
    assert_eq!(replaced.etag(), Some(2));

    let stored: Family = container
        .read_item("Andersen.1", "Andersen")
        .unwrap()
        .deserialize()
        .unwrap();
    assert_eq!(stored, family);

    let deleted = container.delete_item("Andersen.1", "Andersen").unwrap();
    assert_eq!(deleted.status(), ResponseStatus::NoContent);
    assert!(matches!(
        container.read_item("Andersen.1", "Andersen"),
        Err(Error::NotFound { resource: ResourceKind::Document, .. })
    ));

    database.delete().unwrap();
    assert!(client.list_databases().unwrap().is_empty());
}

#[test]
fn rerunning_the_walkthrough_keeps_existing_items() {
    let client = client();
    for _ in 0..2 {
        let (_, container) = family_container(&client);
        container.create_item_if_absent(&andersen()).unwrap();
        container.create_item_if_absent(&wakefield()).unwrap();
    }
    let (_, container) = family_container(&client);
    assert_eq!(container.document_count().unwrap(), 2);
    assert_eq!(
        container.read_item("Wakefield.7", "Wakefield").unwrap().etag(),
        Some(1)
    );
}

#[test]
fn stale_etag_is_rejected_after_concurrent_update() {
    let client = client();
    let (_, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();

    let first = container.read_item("Andersen.1", "Andersen").unwrap();
    let second = container.read_item("Andersen.1", "Andersen").unwrap();

    let mut update: Family = first.deserialize().unwrap();
    update.is_registered = true;
    container
        .replace_item_if_match(&update, first.etag().unwrap())
        .unwrap();

    let mut late: Family = second.deserialize().unwrap();
    late.address.city = "Portland".to_string();
    let err = container
        .replace_item_if_match(&late, second.etag().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::PreconditionFailed {
            expected: 1,
            actual: 2
        }
    ));
}

#[test]
fn system_properties_are_returned_with_the_body() {
    let client = client();
    let (_, container) = family_container(&client);
    let created = container.create_item(&andersen()).unwrap();
    let document = created.resource();
    assert_eq!(document.id(), "Andersen.1");
    assert_eq!(document.partition_key().as_str(), "Andersen");
    assert_eq!(document.etag(), 1);
    assert!(document.updated_at() >= document.created_at());
}
