//! Container store
//!
//! CRUD over the documents of one container. Every operation resolves the
//! document's partition key through the [`PartitionRouter`] and runs inside
//! that bucket's lock:
//!
//! - Mutations (`create_if_absent`, `create`, `replace`, `upsert`, `delete`)
//!   take the bucket's write lock, so the existence check and the write are
//!   one critical section. There is no window for a duplicate insert.
//! - Reads take the read lock.
//! - Buckets are independent; writers on different buckets never contend.
//!
//! # Deletion
//!
//! Deleting a container flags it first, then clears every bucket. Each
//! operation checks the flag after taking its bucket lock, so a call racing
//! with the deletion either lands before the bucket is cleared (and is
//! cleared with it) or fails with `NotFound`.
//!
//! Every failure path returns before anything is written.

use crate::partition::Partition;
use crate::router::{PartitionId, PartitionRouter};
use docstore_core::{
    validate_name, Document, DocumentKey, Error, JsonValue, PartitionKey, PartitionKeyPath,
    ResourceKind, Result, Timestamp, MAX_DOCUMENT_SIZE,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Settings applied to every container a catalog creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Number of partition buckets per container
    pub partition_count: u32,
    /// Largest accepted document body, in bytes of compact JSON
    pub max_document_size: usize,
}

impl ContainerOptions {
    /// Default document size budget (2 MiB)
    pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 2 * 1024 * 1024;
}

impl Default for ContainerOptions {
    fn default() -> Self {
        ContainerOptions {
            partition_count: PartitionRouter::DEFAULT_PARTITION_COUNT,
            max_document_size: Self::DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

/// Documents of one container, split across partition buckets
#[derive(Debug)]
pub struct ContainerStore {
    name: String,
    partition_key_path: PartitionKeyPath,
    router: PartitionRouter,
    partitions: Vec<RwLock<Partition>>,
    max_document_size: usize,
    deleted: AtomicBool,
}

impl ContainerStore {
    /// Create an empty container
    ///
    /// # Errors
    ///
    /// - `InvalidName` for an empty or reserved-character name
    /// - `InvalidConfig` for a partition count or size budget out of range
    pub fn new(
        name: impl Into<String>,
        partition_key_path: PartitionKeyPath,
        options: ContainerOptions,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(ResourceKind::Container, &name)?;
        if options.max_document_size == 0 || options.max_document_size > MAX_DOCUMENT_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max document size must be between 1 and {} bytes, got {}",
                MAX_DOCUMENT_SIZE, options.max_document_size
            )));
        }
        let router = PartitionRouter::new(options.partition_count)?;
        let partitions = router.partition_ids().map(|_| RwLock::default()).collect();

        Ok(ContainerStore {
            name,
            partition_key_path,
            router,
            partitions,
            max_document_size: options.max_document_size,
            deleted: AtomicBool::new(false),
        })
    }

    /// Container name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path supplying each document's partition key
    pub fn partition_key_path(&self) -> &PartitionKeyPath {
        &self.partition_key_path
    }

    /// Router used to place documents
    pub fn router(&self) -> &PartitionRouter {
        &self.router
    }

    /// Number of partition buckets
    pub fn partition_count(&self) -> u32 {
        self.router.partition_count()
    }

    /// True once the container has been deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Document Operations
    // ========================================================================

    /// Validate a body and turn it into a document for this container
    pub fn prepare(&self, body: JsonValue) -> Result<Document> {
        body.validate(self.max_document_size)?;
        Document::from_body(body, &self.partition_key_path)
    }

    /// Insert a document unless `(partition key, id)` is already present
    ///
    /// Returns the stored document and whether this call created it. When
    /// the document already exists it is returned unchanged and the body
    /// passed in is discarded.
    pub fn create_if_absent(&self, body: JsonValue) -> Result<(Document, bool)> {
        let document = self.prepare(body)?;
        let mut partition = self.bucket(document.partition_key()).write();
        self.ensure_live()?;

        if let Some(existing) = partition.get(document.key()) {
            return Ok((existing.clone(), false));
        }
        let stored = document.stamped_new(Timestamp::now());
        partition.insert(stored.clone());
        Ok((stored, true))
    }

    /// Insert a new document
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when `(partition key, id)` is present.
    pub fn create(&self, body: JsonValue) -> Result<Document> {
        let document = self.prepare(body)?;
        let mut partition = self.bucket(document.partition_key()).write();
        self.ensure_live()?;

        if partition.contains(document.key()) {
            return Err(Error::already_exists(
                ResourceKind::Document,
                document.key().to_string(),
            ));
        }
        let stored = document.stamped_new(Timestamp::now());
        partition.insert(stored.clone());
        Ok(stored)
    }

    /// Read a document
    ///
    /// # Errors
    ///
    /// `NotFound` when the document (or the container) does not exist.
    pub fn read(&self, id: &str, partition_key: &PartitionKey) -> Result<Document> {
        let key = DocumentKey::new(partition_key.clone(), id);
        let partition = self.bucket(partition_key).read();
        self.ensure_live()?;

        partition
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::not_found(ResourceKind::Document, key.to_string()))
    }

    /// Replace an existing document wholesale
    ///
    /// The id and partition key are read from the new body and must name an
    /// existing document. No fields are merged. The etag advances even when
    /// the body is unchanged.
    pub fn replace(&self, body: JsonValue) -> Result<Document> {
        self.replace_inner(body, None)
    }

    /// Replace an existing document only if its etag still equals `etag`
    ///
    /// # Errors
    ///
    /// - `NotFound` when the document does not exist
    /// - `PreconditionFailed` when the stored etag differs
    pub fn replace_if_match(&self, body: JsonValue, etag: u64) -> Result<Document> {
        self.replace_inner(body, Some(etag))
    }

    fn replace_inner(&self, body: JsonValue, if_match: Option<u64>) -> Result<Document> {
        let document = self.prepare(body)?;
        let mut partition = self.bucket(document.partition_key()).write();
        self.ensure_live()?;

        let previous = partition.get(document.key()).ok_or_else(|| {
            Error::not_found(ResourceKind::Document, document.key().to_string())
        })?;
        if let Some(expected) = if_match {
            if previous.etag() != expected {
                return Err(Error::PreconditionFailed {
                    expected,
                    actual: previous.etag(),
                });
            }
        }
        let stored = document.stamped_replacing(previous, Timestamp::now());
        partition.replace(stored.clone());
        Ok(stored)
    }

    /// Insert the document, or replace it if it already exists
    ///
    /// Returns the stored document and whether it was newly created.
    pub fn upsert(&self, body: JsonValue) -> Result<(Document, bool)> {
        let document = self.prepare(body)?;
        let mut partition = self.bucket(document.partition_key()).write();
        self.ensure_live()?;

        let now = Timestamp::now();
        match partition.get(document.key()) {
            Some(previous) => {
                let stored = document.stamped_replacing(previous, now);
                partition.replace(stored.clone());
                Ok((stored, false))
            }
            None => {
                let stored = document.stamped_new(now);
                partition.insert(stored.clone());
                Ok((stored, true))
            }
        }
    }

    /// Delete a document
    ///
    /// # Errors
    ///
    /// `NotFound` when the document does not exist. Deleting twice is an
    /// error the second time, never a silent no-op.
    pub fn delete(&self, id: &str, partition_key: &PartitionKey) -> Result<()> {
        let key = DocumentKey::new(partition_key.clone(), id);
        let mut partition = self.bucket(partition_key).write();
        self.ensure_live()?;

        partition
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(ResourceKind::Document, key.to_string()))
    }

    // ========================================================================
    // Counting and Scanning
    // ========================================================================

    /// Total documents across all buckets
    pub fn document_count(&self) -> usize {
        self.partitions.iter().map(|p| p.read().len()).sum()
    }

    /// Documents in one bucket
    pub fn partition_len(&self, partition: PartitionId) -> usize {
        self.partitions
            .get(partition.index())
            .map(|p| p.read().len())
            .unwrap_or(0)
    }

    /// Run `f` against one bucket under its read lock
    ///
    /// Returns `None` if the bucket index is out of range or the container
    /// has been deleted.
    pub(crate) fn with_partition<R>(&self, index: usize, f: impl FnOnce(&Partition) -> R) -> Option<R> {
        let partition = self.partitions.get(index)?.read();
        if self.is_deleted() {
            return None;
        }
        Some(f(&partition))
    }

    /// Every document, bucket by bucket in ascending id order, each bucket
    /// in insertion order
    pub fn documents(&self) -> Vec<Document> {
        let mut out = Vec::new();
        for partition in &self.partitions {
            let partition = partition.read();
            if self.is_deleted() {
                return Vec::new();
            }
            out.extend(partition.iter().cloned());
        }
        out
    }

    /// Flag the container deleted and drop all of its documents
    pub fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::SeqCst);
        for partition in &self.partitions {
            partition.write().clear();
        }
    }

    /// Insert an already-stamped document, keeping its system properties
    ///
    /// The body is held to the same size and depth limits as a fresh write.
    pub(crate) fn restore(&self, document: Document) -> Result<()> {
        document.body().validate(self.max_document_size)?;
        let mut partition = self.bucket(document.partition_key()).write();
        if !partition.insert(document.clone()) {
            return Err(Error::already_exists(
                ResourceKind::Document,
                document.key().to_string(),
            ));
        }
        Ok(())
    }

    fn bucket(&self, partition_key: &PartitionKey) -> &RwLock<Partition> {
        // resolve() is always < partition_count == partitions.len()
        &self.partitions[self.router.resolve(partition_key).index()]
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_deleted() {
            Err(Error::not_found(ResourceKind::Container, self.name.clone()))
        } else {
            Ok(())
        }
    }
}
