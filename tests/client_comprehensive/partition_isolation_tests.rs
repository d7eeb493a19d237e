//! Documents are addressed by `(partition key, id)`: the same id under two
//! partition keys names two documents.

use crate::common::*;
use proptest::prelude::*;

#[test]
fn same_id_in_two_partitions_is_two_documents() {
    let client = client();
    let (_, container) = family_container(&client);
    container.create_item(&family("shared", "Smith", "Seattle")).unwrap();
    container.create_item(&family("shared", "Jones", "Boston")).unwrap();

    let smith: Family = container.read_item("shared", "Smith").unwrap().deserialize().unwrap();
    let jones: Family = container.read_item("shared", "Jones").unwrap().deserialize().unwrap();
    assert_eq!(smith.address.city, "Seattle");
    assert_eq!(jones.address.city, "Boston");

    container.delete_item("shared", "Smith").unwrap();
    assert!(container.read_item("shared", "Smith").is_err());
    assert!(container.read_item("shared", "Jones").is_ok());
}

#[test]
fn number_and_string_partition_values_do_not_collide() {
    let client = client();
    let database = client.create_database_if_absent("Typed").unwrap().into_resource();
    let container = database
        .create_container_if_absent("Items", "/pk")
        .unwrap()
        .into_resource();

    container.create_item(&json!({"id": "x", "pk": 17, "n": 1})).unwrap();
    container.create_item(&json!({"id": "x", "pk": "17", "n": 2})).unwrap();
    assert_eq!(container.document_count().unwrap(), 2);

    let number = container.read_item("x", 17i64).unwrap();
    let string = container.read_item("x", "17").unwrap();
    assert_eq!(number.resource().body().get("n"), Some(&json!(1)));
    assert_eq!(string.resource().body().get("n"), Some(&json!(2)));

    container.delete_item("x", 17i64).unwrap();
    assert!(container.read_item("x", 17i64).is_err());
    assert!(container.read_item("x", "17").is_ok());
}

#[test]
fn read_with_wrong_partition_key_is_not_found() {
    let client = client();
    let (_, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();
    assert!(matches!(
        container.read_item("Andersen.1", "Wakefield"),
        Err(Error::NotFound { resource: ResourceKind::Document, .. })
    ));
}

#[test]
fn item_without_partition_key_is_rejected() {
    let client = client();
    let (_, container) = family_container(&client);
    let err = container
        .create_item(&json!({"id": "orphan", "firstName": "Ann"}))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPartitionKey(_)));
    assert_eq!(container.document_count().unwrap(), 0);
}

#[test]
fn nested_partition_key_path() {
    let client = client();
    let database = client.create_database_if_absent("Geo").unwrap().into_resource();
    let container = database
        .create_container_if_absent("ByCity", "/address/city")
        .unwrap()
        .into_resource();
    container.create_item(&andersen()).unwrap();
    assert!(container.read_item("Andersen.1", "Seattle").is_ok());
    assert!(container.read_item("Andersen.1", "Andersen").is_err());
}

#[test]
fn replace_cannot_move_a_document_between_partitions() {
    let client = client();
    let (_, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();

    let mut moved = andersen();
    moved.last_name = "Wakefield".to_string();
    assert!(matches!(
        container.replace_item(&moved),
        Err(Error::NotFound { .. })
    ));
    assert!(container.read_item("Andersen.1", "Andersen").is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_partition_key_reads_back_its_own_body(
        keys in prop::collection::btree_set("[a-zA-Z]{1,12}", 1..20)
    ) {
        let client = client();
        let (_, container) = family_container(&client);
        for key in &keys {
            container.create_item(&family("same-id", key, key)).unwrap();
        }
        for key in &keys {
            let stored: Family = container
                .read_item("same-id", key.as_str())
                .unwrap()
                .deserialize()
                .unwrap();
            prop_assert_eq!(&stored.last_name, key);
            prop_assert_eq!(&stored.address.city, key);
        }
        prop_assert_eq!(container.document_count().unwrap(), keys.len());
    }
}
