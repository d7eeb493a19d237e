//! Database snapshots
//!
//! A [`DatabaseSnapshot`] is a point-in-time copy of one database: every
//! container with its partition key path, and every document grouped by
//! partition key value then id, plus the order the container held them
//! in. Documents keep their system properties (etag and timestamps).
//!
//! Snapshots are encoded as MessagePack with named fields. Capture reads
//! each bucket under its read lock in turn, so a snapshot taken during
//! concurrent writes is per-bucket consistent only.

use crate::catalog::DatabaseCatalog;
use crate::container::{ContainerOptions, ContainerStore};
use docstore_core::{
    Document, DocumentKey, Error, PartitionKey, PartitionKeyPath, ResourceKind, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Snapshot encoding version
pub const SNAPSHOT_FORMAT_VERSION: u32 = 2;

/// Point-in-time copy of a database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    /// Encoding version
    pub format_version: u32,
    /// Database name
    pub name: String,
    /// Containers by name
    pub containers: BTreeMap<String, ContainerSnapshot>,
}

/// Point-in-time copy of a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// Path the container was created with
    pub partition_key_path: PartitionKeyPath,
    /// partition key value -> id -> document
    pub partitions: BTreeMap<PartitionKey, BTreeMap<String, Document>>,
    /// Every document key, in the order a scan returned them at capture
    pub order: Vec<DocumentKey>,
}

impl ContainerSnapshot {
    fn capture(store: &ContainerStore) -> Self {
        let mut partitions: BTreeMap<PartitionKey, BTreeMap<String, Document>> = BTreeMap::new();
        let mut order = Vec::new();
        for document in store.documents() {
            order.push(document.key().clone());
            partitions
                .entry(document.partition_key().clone())
                .or_default()
                .insert(document.id().to_string(), document);
        }
        ContainerSnapshot {
            partition_key_path: store.partition_key_path().clone(),
            partitions,
            order,
        }
    }

    /// Take documents out of the partition map in capture order
    ///
    /// Every entry must be filed under the partition key and id its body
    /// carries, and `order` must name each entry exactly once.
    fn into_ordered(self, container: &str) -> Result<(PartitionKeyPath, Vec<Document>)> {
        let ContainerSnapshot {
            partition_key_path,
            mut partitions,
            order,
        } = self;

        let mut documents = Vec::with_capacity(order.len());
        for key in order {
            let document = partitions
                .get_mut(&key.partition_key)
                .and_then(|by_id| by_id.remove(&key.id))
                .ok_or_else(|| {
                    Error::InvalidDocument(format!(
                        "snapshot of container {} lists {} without an entry",
                        container, key
                    ))
                })?;
            let body_key = partition_key_path.extract(document.body())?;
            if body_key != key.partition_key || document.key() != &key {
                return Err(Error::InvalidDocument(format!(
                    "snapshot entry {} in container {} does not match its body",
                    key, container
                )));
            }
            documents.push(document);
        }

        if let Some(stray) = partitions.values().flat_map(BTreeMap::values).next() {
            return Err(Error::InvalidDocument(format!(
                "snapshot entry {} in container {} is missing from the scan order",
                stray.key(),
                container
            )));
        }
        Ok((partition_key_path, documents))
    }

    /// Number of documents
    pub fn document_count(&self) -> usize {
        self.partitions.values().map(BTreeMap::len).sum()
    }
}

impl DatabaseSnapshot {
    /// Copy the current contents of a database
    ///
    /// # Errors
    ///
    /// `NotFound` if the database has been deleted.
    pub fn capture(catalog: &DatabaseCatalog) -> Result<Self> {
        if catalog.is_deleted() {
            return Err(Error::not_found(ResourceKind::Database, catalog.name()));
        }
        let containers = catalog
            .containers()
            .iter()
            .map(|store| (store.name().to_string(), ContainerSnapshot::capture(store)))
            .collect();
        Ok(DatabaseSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            name: catalog.name().to_string(),
            containers,
        })
    }

    /// Number of documents across all containers
    pub fn document_count(&self) -> usize {
        self.containers
            .values()
            .map(ContainerSnapshot::document_count)
            .sum()
    }

    /// Encode as MessagePack
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Decode from MessagePack
    ///
    /// # Errors
    ///
    /// `Serialization` for malformed input or an unknown format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: DatabaseSnapshot = rmp_serde::from_slice(bytes)?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::Serialization(format!(
                "unsupported snapshot format version {} (expected {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        Ok(snapshot)
    }

    /// Write to a file, replacing it atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Read from a file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Build a new catalog holding this snapshot's contents
    ///
    /// Containers are created with `options` and documents are re-inserted
    /// in capture order, so each bucket scans back in the order it was
    /// captured. Every document is checked before the first one is written.
    ///
    /// # Errors
    ///
    /// `InvalidDocument` if a document's body disagrees with the partition
    /// key or id it is filed under, or the scan order does not list exactly
    /// the filed documents. `DocumentTooLarge` or `NestingTooDeep` if a body
    /// breaks the limits in `options`.
    pub fn restore(self, options: ContainerOptions) -> Result<DatabaseCatalog> {
        let mut containers = Vec::with_capacity(self.containers.len());
        for (name, container) in self.containers {
            let (path, documents) = container.into_ordered(&name)?;
            for document in &documents {
                document.body().validate(options.max_document_size)?;
            }
            containers.push((name, path, documents));
        }

        let catalog = DatabaseCatalog::new(self.name, options)?;
        for (name, path, documents) in containers {
            let store = catalog.create_container(&name, path)?;
            for document in documents {
                store.restore(document)?;
            }
        }
        Ok(catalog)
    }
}
