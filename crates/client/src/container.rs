//! Container handle
//!
//! Item operations take any `Serialize` value as the document body and
//! return the stored [`Document`] wrapped in an [`ItemResponse`]. The body
//! must serialize to a JSON object with a string `id` and a value at the
//! container's partition key path.

use crate::client::ClientShared;
use crate::feed::FeedIterator;
use crate::meter::OperationKind;
use crate::response::{ItemResponse, ResponseStatus};
use docstore_core::{Document, Error, JsonValue, PartitionKey, ResourceKind, Result};
use docstore_storage::{query, ContainerStore, DatabaseCatalog, QueryDefinition, QueryIter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Handle to one container
#[derive(Debug, Clone)]
pub struct Container {
    shared: Arc<ClientShared>,
    catalog: Arc<DatabaseCatalog>,
    store: Arc<ContainerStore>,
}

impl Container {
    pub(crate) fn new(
        shared: Arc<ClientShared>,
        catalog: Arc<DatabaseCatalog>,
        store: Arc<ContainerStore>,
    ) -> Self {
        Container {
            shared,
            catalog,
            store,
        }
    }

    /// Container name
    pub fn id(&self) -> &str {
        self.store.name()
    }

    /// Name of the owning database
    pub fn database_id(&self) -> &str {
        self.catalog.name()
    }

    /// Partition key path, e.g. `/lastName`
    pub fn partition_key_path(&self) -> &str {
        self.store.partition_key_path().as_str()
    }

    /// Number of partition buckets
    pub fn partition_count(&self) -> u32 {
        self.store.partition_count()
    }

    /// Number of stored documents
    pub fn document_count(&self) -> Result<usize> {
        self.shared.ensure_open()?;
        self.ensure_live()?;
        Ok(self.store.document_count())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Create the item unless `(partition key, id)` already exists
    ///
    /// Returns `Created` with the new document, or `Ok` with the existing
    /// one left untouched.
    pub fn create_item_if_absent<T: Serialize + ?Sized>(
        &self,
        item: &T,
    ) -> Result<ItemResponse<Document>> {
        self.shared.ensure_open()?;
        let (document, created) = self.store.create_if_absent(to_body(item)?)?;
        if created {
            Ok(self.write_response(document, ResponseStatus::Created))
        } else {
            Ok(self.read_response(document))
        }
    }

    /// Create an item that must not exist yet
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if `(partition key, id)` is present.
    pub fn create_item<T: Serialize + ?Sized>(&self, item: &T) -> Result<ItemResponse<Document>> {
        self.shared.ensure_open()?;
        let document = self.store.create(to_body(item)?)?;
        Ok(self.write_response(document, ResponseStatus::Created))
    }

    /// Point read by id and partition key value
    pub fn read_item(
        &self,
        id: &str,
        partition_key: impl Into<PartitionKey>,
    ) -> Result<ItemResponse<Document>> {
        self.shared.ensure_open()?;
        let document = self.store.read(id, &partition_key.into())?;
        Ok(self.read_response(document))
    }

    /// Replace an existing item as a whole
    ///
    /// # Errors
    ///
    /// `NotFound` if `(partition key, id)` is absent.
    pub fn replace_item<T: Serialize + ?Sized>(&self, item: &T) -> Result<ItemResponse<Document>> {
        self.shared.ensure_open()?;
        let document = self.store.replace(to_body(item)?)?;
        Ok(self.write_response(document, ResponseStatus::Ok))
    }

    /// Replace an existing item only if its etag is still `etag`
    ///
    /// # Errors
    ///
    /// `PreconditionFailed` if another write got there first.
    pub fn replace_item_if_match<T: Serialize + ?Sized>(
        &self,
        item: &T,
        etag: u64,
    ) -> Result<ItemResponse<Document>> {
        self.shared.ensure_open()?;
        let document = self.store.replace_if_match(to_body(item)?, etag)?;
        Ok(self.write_response(document, ResponseStatus::Ok))
    }

    /// Insert or replace
    pub fn upsert_item<T: Serialize + ?Sized>(&self, item: &T) -> Result<ItemResponse<Document>> {
        self.shared.ensure_open()?;
        let (document, created) = self.store.upsert(to_body(item)?)?;
        let status = if created {
            ResponseStatus::Created
        } else {
            ResponseStatus::Ok
        };
        Ok(self.write_response(document, status))
    }

    /// Delete an item
    ///
    /// # Errors
    ///
    /// `NotFound` if `(partition key, id)` is absent.
    pub fn delete_item(
        &self,
        id: &str,
        partition_key: impl Into<PartitionKey>,
    ) -> Result<ItemResponse<()>> {
        self.shared.ensure_open()?;
        self.store.delete(id, &partition_key.into())?;
        let charge = self.shared.charge(OperationKind::Delete, 0);
        Ok(ItemResponse::new((), ResponseStatus::NoContent, charge, None))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Page through the results of a query, deserializing each body into `T`
    ///
    /// Pages hold at most the client's `max_item_count` items.
    pub fn query_items<T: DeserializeOwned>(
        &self,
        query: &QueryDefinition,
    ) -> Result<FeedIterator<T>> {
        let results = self.query_documents(query)?;
        Ok(FeedIterator::new(
            Arc::clone(&self.shared),
            results,
            self.shared.config().max_item_count,
        ))
    }

    /// Parse query text and page through its results
    ///
    /// # Errors
    ///
    /// `UnsupportedQuery` for anything outside
    /// `SELECT * FROM c [WHERE c.<path> = <literal>]`.
    pub fn query_items_text<T: DeserializeOwned>(&self, text: &str) -> Result<FeedIterator<T>> {
        self.query_items(&QueryDefinition::parse(text)?)
    }

    /// Page through documents whose `field_path` equals `value`
    pub fn query_items_where<T: DeserializeOwned>(
        &self,
        field_path: &str,
        value: impl Into<JsonValue>,
    ) -> Result<FeedIterator<T>> {
        self.query_items(&QueryDefinition::field_equals(field_path, value)?)
    }

    /// Lazy scan over matching documents, without paging or charges
    pub fn query_documents(&self, definition: &QueryDefinition) -> Result<QueryIter> {
        self.shared.ensure_open()?;
        query::execute(&self.store, definition)
    }

    /// Delete this container and its documents
    pub fn delete(&self) -> Result<ItemResponse<()>> {
        self.shared.ensure_open()?;
        self.catalog.delete_container_store(&self.store)?;
        debug!(
            target: "docstore::client",
            database = self.catalog.name(),
            container = self.store.name(),
            "Container deleted"
        );
        let charge = self.shared.charge(OperationKind::Metadata, 0);
        Ok(ItemResponse::new((), ResponseStatus::NoContent, charge, None))
    }

    fn ensure_live(&self) -> Result<()> {
        if self.store.is_deleted() {
            Err(Error::not_found(ResourceKind::Container, self.id()))
        } else {
            Ok(())
        }
    }

    fn read_response(&self, document: Document) -> ItemResponse<Document> {
        let charge = self
            .shared
            .charge(OperationKind::Read, document.body().size_bytes());
        let etag = Some(document.etag());
        ItemResponse::new(document, ResponseStatus::Ok, charge, etag)
    }

    fn write_response(&self, document: Document, status: ResponseStatus) -> ItemResponse<Document> {
        let charge = self
            .shared
            .charge(OperationKind::Write, document.body().size_bytes());
        let etag = Some(document.etag());
        ItemResponse::new(document, status, charge, etag)
    }
}

fn to_body<T: Serialize + ?Sized>(item: &T) -> Result<JsonValue> {
    Ok(JsonValue::from(serde_json::to_value(item)?))
}
