//! Storage layer for docstore
//!
//! This crate implements the in-memory document store:
//! - PartitionRouter: maps partition key values to buckets (xxh3)
//! - Partition: one bucket, FxHashMap index + insertion-ordered BTreeMap
//! - ContainerStore: CRUD over a container's buckets, one RwLock per bucket
//! - Query engine: lazy cross-partition equality scans
//! - DatabaseCatalog: containers of one database, DashMap by name
//! - DatabaseSnapshot: MessagePack export/import of a database
//!
//! # Concurrency
//!
//! All types are `Send + Sync` and are shared behind `Arc`. Writes to the
//! same bucket serialize on its write lock; different buckets and different
//! containers never contend.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod container;
pub mod partition;
pub mod query;
pub mod router;
pub mod snapshot;

pub use catalog::DatabaseCatalog;
pub use container::{ContainerOptions, ContainerStore};
pub use partition::{Partition, Sequence};
pub use query::{execute, query, Predicate, QueryDefinition, QueryIter};
pub use router::{PartitionId, PartitionRouter};
pub use snapshot::{ContainerSnapshot, DatabaseSnapshot, SNAPSHOT_FORMAT_VERSION};
