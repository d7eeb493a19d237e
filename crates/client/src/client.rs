//! DocumentClient
//!
//! Entry point of the library. A client owns a set of databases, the
//! configuration every container is created with, and the request meter.
//! [`Database`] and [`Container`] handles share the client's state, so
//! closing the client makes every outstanding handle fail with
//! `ClientClosed`.
//!
//! # Lifecycle
//!
//! ```text
//! open / open_in / ephemeral ──► OPEN ──► close() or drop ──► CLOSED
//! ```
//!
//! [`DocumentClient::scoped`] opens a client, runs a closure and closes the
//! client on every exit path, including early returns through `?`.

use crate::config::{ClientConfig, CONFIG_FILE_NAME};
use crate::database::Database;
use crate::meter::{OperationKind, RequestCharge, RequestMeter};
use crate::response::{ItemResponse, ResponseStatus};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use docstore_core::{Error, ResourceKind, Result};
use docstore_storage::{DatabaseCatalog, DatabaseSnapshot};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// State shared by a client and every handle it gives out
#[derive(Debug)]
pub(crate) struct ClientShared {
    config: ClientConfig,
    meter: Arc<dyn RequestMeter>,
    databases: DashMap<String, Arc<DatabaseCatalog>>,
    closed: AtomicBool,
}

impl ClientShared {
    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::ClientClosed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn charge(&self, operation: OperationKind, payload_bytes: usize) -> RequestCharge {
        self.meter.charge(operation, payload_bytes)
    }

    /// Remove `catalog` if it is still the database registered under its name
    pub(crate) fn delete_database(&self, catalog: &Arc<DatabaseCatalog>) -> Result<()> {
        let (_, removed) = self
            .databases
            .remove_if(catalog.name(), |_, current| Arc::ptr_eq(current, catalog))
            .ok_or_else(|| Error::not_found(ResourceKind::Database, catalog.name()))?;
        removed.mark_deleted();
        debug!(target: "docstore::client", database = %removed.name(), "Database deleted");
        Ok(())
    }
}

/// Handle to an embedded document store
///
/// # Example
///
/// ```
/// use docstore_client::DocumentClient;
/// use serde_json::json;
///
/// let client = DocumentClient::ephemeral().unwrap();
/// let database = client.create_database_if_absent("FamilyDatabase").unwrap().into_resource();
/// let container = database
///     .create_container_if_absent("FamilyContainer", "/lastName")
///     .unwrap()
///     .into_resource();
///
/// let created = container
///     .create_item_if_absent(&json!({"id": "Wakefield.7", "lastName": "Wakefield"}))
///     .unwrap();
/// assert!(created.is_created());
///
/// let read = container.read_item("Wakefield.7", "Wakefield").unwrap();
/// assert_eq!(read.etag(), Some(1));
/// ```
#[derive(Debug)]
pub struct DocumentClient {
    shared: Arc<ClientShared>,
}

impl DocumentClient {
    /// Open a client with the given configuration
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a setting is out of range.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let meter = config.meter()?;
        Self::open_with_meter(config, meter)
    }

    /// Open a client that charges through a caller-provided meter
    ///
    /// The `request_meter` setting of `config` is ignored.
    pub fn open_with_meter(config: ClientConfig, meter: Arc<dyn RequestMeter>) -> Result<Self> {
        let mut checked = config.clone();
        checked.request_meter = "none".to_string();
        checked.validate()?;

        info!(
            target: "docstore::client",
            partition_count = config.partition_count,
            max_item_count = config.max_item_count,
            meter = ?meter,
            "Client opened"
        );

        Ok(DocumentClient {
            shared: Arc::new(ClientShared {
                config,
                meter,
                databases: DashMap::new(),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Open a client configured by `docstore.toml` in `dir`
    ///
    /// The directory is created if needed and a commented default config is
    /// written on first use.
    pub fn open_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let config_path = dir.join(CONFIG_FILE_NAME);
        ClientConfig::write_default_if_missing(&config_path)?;
        let config = ClientConfig::from_file(&config_path)?;
        Self::open(config)
    }

    /// Open a client with default settings
    pub fn ephemeral() -> Result<Self> {
        Self::open(ClientConfig::default())
    }

    /// Open a client, run `f` with it and close it afterwards
    ///
    /// The client is closed whether `f` succeeds, fails or panics.
    ///
    /// ```
    /// use docstore_client::{ClientConfig, DocumentClient};
    ///
    /// let names = DocumentClient::scoped(ClientConfig::default(), |client| {
    ///     client.create_database_if_absent("a")?;
    ///     client.list_databases()
    /// })
    /// .unwrap();
    /// assert_eq!(names, vec!["a"]);
    /// ```
    pub fn scoped<T, F>(config: ClientConfig, f: F) -> Result<T>
    where
        F: FnOnce(&DocumentClient) -> Result<T>,
    {
        let client = Self::open(config)?;
        let result = f(&client);
        client.close();
        result
    }

    /// Active configuration
    pub fn config(&self) -> &ClientConfig {
        self.shared.config()
    }

    /// True once the client has been closed
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Close the client and release every database
    ///
    /// Idempotent. Handles obtained from this client fail with
    /// `ClientClosed` afterwards.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let databases = self.shared.databases.len();
        self.shared.databases.clear();
        info!(target: "docstore::client", databases, "Client closed");
    }

    // =========================================================================
    // Databases
    // =========================================================================

    /// Get or create a database
    ///
    /// The response status is `Created` when this call created it, `Ok`
    /// when it already existed.
    pub fn create_database_if_absent(&self, id: &str) -> Result<ItemResponse<Database>> {
        self.shared.ensure_open()?;
        let (catalog, status) = match self.shared.databases.entry(id.to_string()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), ResponseStatus::Ok),
            Entry::Vacant(entry) => {
                // close() clears shards after setting the flag
                self.shared.ensure_open()?;
                let catalog = Arc::new(DatabaseCatalog::new(
                    id,
                    self.shared.config().container_options(),
                )?);
                entry.insert(Arc::clone(&catalog));
                debug!(target: "docstore::client", database = id, "Database created");
                (catalog, ResponseStatus::Created)
            }
        };
        Ok(self.database_response(catalog, status))
    }

    /// Create a database that must not exist yet
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the name is taken.
    pub fn create_database(&self, id: &str) -> Result<ItemResponse<Database>> {
        self.shared.ensure_open()?;
        let catalog = match self.shared.databases.entry(id.to_string()) {
            Entry::Occupied(_) => return Err(Error::already_exists(ResourceKind::Database, id)),
            Entry::Vacant(entry) => {
                // close() clears shards after setting the flag
                self.shared.ensure_open()?;
                let catalog = Arc::new(DatabaseCatalog::new(
                    id,
                    self.shared.config().container_options(),
                )?);
                entry.insert(Arc::clone(&catalog));
                debug!(target: "docstore::client", database = id, "Database created");
                catalog
            }
        };
        Ok(self.database_response(catalog, ResponseStatus::Created))
    }

    /// Look up a database
    pub fn database(&self, id: &str) -> Result<Database> {
        self.shared.ensure_open()?;
        let catalog = self
            .shared
            .databases
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::not_found(ResourceKind::Database, id))?;
        Ok(Database::new(Arc::clone(&self.shared), catalog))
    }

    /// Delete a database with all of its containers and documents
    pub fn delete_database(&self, id: &str) -> Result<ItemResponse<()>> {
        self.database(id)?.delete()
    }

    /// Database names, sorted
    pub fn list_databases(&self) -> Result<Vec<String>> {
        self.shared.ensure_open()?;
        let mut names: Vec<String> = self
            .shared
            .databases
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Recreate a database from a snapshot
    ///
    /// Containers are created with this client's settings; documents keep
    /// their etags and timestamps.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if a database with the snapshot's name exists.
    pub fn import_database(&self, snapshot: DatabaseSnapshot) -> Result<ItemResponse<Database>> {
        self.shared.ensure_open()?;
        let name = snapshot.name.clone();
        let documents = snapshot.document_count();
        let catalog = match self.shared.databases.entry(name.clone()) {
            Entry::Occupied(_) => {
                return Err(Error::already_exists(ResourceKind::Database, name))
            }
            Entry::Vacant(entry) => {
                self.shared.ensure_open()?;
                let catalog = Arc::new(snapshot.restore(self.shared.config().container_options())?);
                entry.insert(Arc::clone(&catalog));
                catalog
            }
        };
        info!(target: "docstore::client", database = %name, documents, "Database imported");
        Ok(self.database_response(catalog, ResponseStatus::Created))
    }

    /// Recreate a database from a snapshot file
    pub fn import_database_file<P: AsRef<Path>>(&self, path: P) -> Result<ItemResponse<Database>> {
        let snapshot = DatabaseSnapshot::load(path.as_ref())?;
        self.import_database(snapshot)
    }

    fn database_response(
        &self,
        catalog: Arc<DatabaseCatalog>,
        status: ResponseStatus,
    ) -> ItemResponse<Database> {
        let charge = self.shared.charge(OperationKind::Metadata, 0);
        ItemResponse::new(
            Database::new(Arc::clone(&self.shared), catalog),
            status,
            charge,
            None,
        )
    }
}

impl Drop for DocumentClient {
    fn drop(&mut self) {
        self.close();
    }
}
