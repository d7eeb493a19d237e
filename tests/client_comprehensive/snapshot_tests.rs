//! Export a database to a snapshot file and import it into another client.

use crate::common::*;
use docstore::DatabaseSnapshot;
use tempfile::TempDir;

#[test]
fn export_then_import_into_new_client() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("family.snapshot");

    {
        let client = client();
        let (database, container) = family_container(&client);
        container.create_item(&andersen()).unwrap();
        container.create_item(&wakefield()).unwrap();
        let mut registered = andersen();
        registered.is_registered = true;
        container.replace_item(&registered).unwrap();

        let snapshot = database.export_snapshot().unwrap();
        assert_eq!(snapshot.document_count(), 2);
        snapshot.save(&path).unwrap();
    }

    let client = client();
    let imported = client.import_database_file(&path).unwrap();
    assert_eq!(imported.status(), ResponseStatus::Created);
    let database = imported.into_resource();
    assert_eq!(database.id(), "FamilyDatabase");

    let container = database.container("FamilyContainer").unwrap();
    assert_eq!(container.partition_key_path(), "/lastName");
    let read = container.read_item("Andersen.1", "Andersen").unwrap();
    assert_eq!(read.etag(), Some(2));
    assert!(read.deserialize::<Family>().unwrap().is_registered);

    let mut ids = query_ids(&container, "SELECT * FROM c");
    ids.sort();
    assert_eq!(ids, vec!["Andersen.1", "Wakefield.7"]);
}

#[test]
fn import_over_existing_database_fails() {
    let client = client();
    let (database, _) = family_container(&client);
    let snapshot = database.export_snapshot().unwrap();
    assert!(matches!(
        client.import_database(snapshot),
        Err(Error::AlreadyExists { resource: ResourceKind::Database, .. })
    ));
}

#[test]
fn corrupt_snapshot_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.snapshot");
    std::fs::write(&path, b"not a snapshot").unwrap();
    assert!(DatabaseSnapshot::load(&path).is_err());
    assert!(client().import_database_file(&path).is_err());
}

#[test]
fn imported_database_accepts_writes() {
    let client = client();
    let (database, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();
    let snapshot = database.export_snapshot().unwrap();

    let other = docstore::DocumentClient::ephemeral().unwrap();
    let restored = other.import_database(snapshot).unwrap().into_resource();
    let container = restored.container("FamilyContainer").unwrap();
    container.create_item(&wakefield()).unwrap();
    container.delete_item("Andersen.1", "Andersen").unwrap();
    assert_eq!(container.document_count().unwrap(), 1);
}

#[test]
fn scan_order_survives_export_and_import() {
    let client = client();
    let (database, container) = family_container(&client);
    for id in ["z", "m", "a"] {
        container.create_item(&family(id, "Smith", "Seattle")).unwrap();
    }
    let before = query_ids(&container, "SELECT * FROM c");
    assert_eq!(before, vec!["z", "m", "a"]);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ordered.snapshot");
    database.export_snapshot().unwrap().save(&path).unwrap();

    let other = docstore::DocumentClient::ephemeral().unwrap();
    let restored = other.import_database_file(&path).unwrap().into_resource();
    let container = restored.container("FamilyContainer").unwrap();
    assert_eq!(query_ids(&container, "SELECT * FROM c"), before);
}

#[test]
fn import_rejects_documents_over_the_size_limit() {
    let client = client();
    let (database, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();
    let snapshot = database.export_snapshot().unwrap();

    let small = docstore::DocumentClient::open(ClientConfig {
        max_document_size: 64,
        ..ClientConfig::default()
    })
    .unwrap();
    let err = small.import_database(snapshot).unwrap_err();
    assert!(matches!(err, Error::DocumentTooLarge { max: 64, .. }));
    assert_eq!(err.status_code(), 413);
    assert!(small.list_databases().unwrap().is_empty());
    assert!(small.database("FamilyDatabase").unwrap_err().is_not_found());
}
