//! Database handle

use crate::client::ClientShared;
use crate::container::Container;
use crate::meter::OperationKind;
use crate::response::{ItemResponse, ResponseStatus};
use docstore_core::{Error, PartitionKeyPath, ResourceKind, Result};
use docstore_storage::{ContainerStore, DatabaseCatalog, DatabaseSnapshot};
use std::sync::Arc;
use tracing::debug;

/// Handle to one database
///
/// Cheap to clone. Once the database is deleted every call fails with
/// `NotFound`, even if a database with the same name is created later.
#[derive(Debug, Clone)]
pub struct Database {
    shared: Arc<ClientShared>,
    catalog: Arc<DatabaseCatalog>,
}

impl Database {
    pub(crate) fn new(shared: Arc<ClientShared>, catalog: Arc<DatabaseCatalog>) -> Self {
        Database { shared, catalog }
    }

    /// Database name
    pub fn id(&self) -> &str {
        self.catalog.name()
    }

    /// Get or create a container partitioned on `partition_key_path`
    ///
    /// # Errors
    ///
    /// - `InvalidPartitionKey` if the path is not of the form `/a/b`
    /// - `ContainerConfigConflict` if the container exists with another path
    pub fn create_container_if_absent(
        &self,
        id: &str,
        partition_key_path: &str,
    ) -> Result<ItemResponse<Container>> {
        self.shared.ensure_open()?;
        let path: PartitionKeyPath = partition_key_path.parse()?;
        let (store, created) = self.catalog.create_container_if_absent(id, path)?;
        let status = if created {
            debug!(
                target: "docstore::client",
                database = self.id(),
                container = id,
                partition_key_path = %store.partition_key_path(),
                "Container created"
            );
            ResponseStatus::Created
        } else {
            ResponseStatus::Ok
        };
        Ok(self.container_response(store, status))
    }

    /// Create a container that must not exist yet
    pub fn create_container(
        &self,
        id: &str,
        partition_key_path: &str,
    ) -> Result<ItemResponse<Container>> {
        self.shared.ensure_open()?;
        let path: PartitionKeyPath = partition_key_path.parse()?;
        let store = self.catalog.create_container(id, path)?;
        debug!(target: "docstore::client", database = self.id(), container = id, "Container created");
        Ok(self.container_response(store, ResponseStatus::Created))
    }

    /// Look up a container
    pub fn container(&self, id: &str) -> Result<Container> {
        self.shared.ensure_open()?;
        let store = self.catalog.container(id)?;
        Ok(Container::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.catalog),
            store,
        ))
    }

    /// Delete a container and its documents
    pub fn delete_container(&self, id: &str) -> Result<ItemResponse<()>> {
        self.shared.ensure_open()?;
        self.catalog.delete_container(id)?;
        debug!(target: "docstore::client", database = self.id(), container = id, "Container deleted");
        Ok(self.deleted_response())
    }

    /// Container names, sorted
    pub fn list_containers(&self) -> Result<Vec<String>> {
        self.shared.ensure_open()?;
        if self.catalog.is_deleted() {
            return Err(Error::not_found(ResourceKind::Database, self.id()));
        }
        Ok(self.catalog.list_containers())
    }

    /// Delete this database with every container and document in it
    pub fn delete(&self) -> Result<ItemResponse<()>> {
        self.shared.ensure_open()?;
        self.shared.delete_database(&self.catalog)?;
        Ok(self.deleted_response())
    }

    /// Copy the current contents into a snapshot
    ///
    /// Save it with [`DatabaseSnapshot::save`] and load it into any client
    /// with [`DocumentClient::import_database`](crate::DocumentClient::import_database).
    pub fn export_snapshot(&self) -> Result<DatabaseSnapshot> {
        self.shared.ensure_open()?;
        DatabaseSnapshot::capture(&self.catalog)
    }

    fn container_response(
        &self,
        store: Arc<ContainerStore>,
        status: ResponseStatus,
    ) -> ItemResponse<Container> {
        let charge = self.shared.charge(OperationKind::Metadata, 0);
        ItemResponse::new(
            Container::new(Arc::clone(&self.shared), Arc::clone(&self.catalog), store),
            status,
            charge,
            None,
        )
    }

    fn deleted_response(&self) -> ItemResponse<()> {
        let charge = self.shared.charge(OperationKind::Metadata, 0);
        ItemResponse::new((), ResponseStatus::NoContent, charge, None)
    }
}
