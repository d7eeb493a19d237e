//! Deleting a database or container invalidates everything beneath it.

use crate::common::*;

#[test]
fn deleting_database_invalidates_container_handles() {
    let client = client();
    let (database, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();

    client.delete_database("FamilyDatabase").unwrap();

    assert!(matches!(
        container.read_item("Andersen.1", "Andersen"),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        container.create_item(&wakefield()),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        database.container("FamilyContainer"),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        client.database("FamilyDatabase"),
        Err(Error::NotFound { resource: ResourceKind::Database, .. })
    ));
}

#[test]
fn recreated_database_starts_empty() {
    let client = client();
    let (database, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();
    database.delete().unwrap();

    let (_, fresh) = family_container(&client);
    assert_eq!(fresh.document_count().unwrap(), 0);
    assert!(fresh.read_item("Andersen.1", "Andersen").is_err());

    // The old handle stays dead even though the name is live again
    assert!(database.delete().is_err());
    assert!(container.read_item("Andersen.1", "Andersen").is_err());
    assert_eq!(client.list_databases().unwrap(), vec!["FamilyDatabase"]);
}

#[test]
fn deleting_container_leaves_siblings() {
    let client = client();
    let (database, families) = family_container(&client);
    let pets = database
        .create_container_if_absent("Pets", "/species")
        .unwrap()
        .into_resource();
    families.create_item(&andersen()).unwrap();
    pets.create_item(&json!({"id": "goofy", "species": "dog"})).unwrap();

    database.delete_container("FamilyContainer").unwrap();

    assert!(families.read_item("Andersen.1", "Andersen").is_err());
    assert!(pets.read_item("goofy", "dog").is_ok());
    assert_eq!(database.list_containers().unwrap(), vec!["Pets"]);
}

#[test]
fn deleting_missing_entities_is_not_found() {
    let client = client();
    let (database, container) = family_container(&client);
    assert!(matches!(
        client.delete_database("Nope"),
        Err(Error::NotFound { resource: ResourceKind::Database, .. })
    ));
    assert!(matches!(
        database.delete_container("Nope"),
        Err(Error::NotFound { resource: ResourceKind::Container, .. })
    ));
    assert!(matches!(
        container.delete_item("Nope", "Andersen"),
        Err(Error::NotFound { resource: ResourceKind::Document, .. })
    ));
}

#[test]
fn closing_client_closes_every_handle() {
    let client = client();
    let (database, container) = family_container(&client);
    client.close();
    client.close();

    assert!(client.is_closed());
    assert!(matches!(client.list_databases(), Err(Error::ClientClosed)));
    assert!(matches!(database.list_containers(), Err(Error::ClientClosed)));
    assert!(matches!(
        container.read_item("Andersen.1", "Andersen"),
        Err(Error::ClientClosed)
    ));
}
