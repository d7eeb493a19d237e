//! docstore - embeddable partitioned document store
//!
//! docstore keeps JSON documents in containers, partitions each container
//! by a key path such as `/lastName`, and answers point reads and
//! single-field equality queries from memory.
//!
//! # Quick Start
//!
//! ```ignore
//! use docstore::{ClientConfig, DocumentClient};
//!
//! let client = DocumentClient::ephemeral()?;
//! let db = client.create_database_if_absent("FamilyDatabase")?.into_resource();
//! let families = db
//!     .create_container_if_absent("FamilyContainer", "/lastName")?
//!     .into_resource();
//!
//! families.create_item_if_absent(&family)?;
//! let read = families.read_item("Andersen.1", "Andersen")?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`DocumentClient`] facade. The document
//! model lives in `docstore-core`, routing, partitions, queries and
//! snapshots in `docstore-storage`. Only the pieces callers touch are
//! re-exported here.

// Re-export the public API from docstore-client
pub use docstore_client::*;

pub use docstore_core::{DocumentKey, PartitionKeyPath, MAX_DOCUMENT_SIZE};
pub use docstore_storage::{ContainerSnapshot, Predicate, SNAPSHOT_FORMAT_VERSION};
