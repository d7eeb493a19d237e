//! # docstore client
//!
//! The public facade of docstore: a [`DocumentClient`] owns databases,
//! a [`Database`] owns containers and a [`Container`] holds JSON documents
//! partitioned by a key path.
//!
//! | Call | Idempotent | Fails with |
//! |------|------------|------------|
//! | `create_database_if_absent` / `create_container_if_absent` / `create_item_if_absent` | yes | `ContainerConfigConflict` on a differing partition key path |
//! | `create_database` / `create_container` / `create_item` | no | `AlreadyExists` |
//! | `read_item` / `replace_item` / `delete_item` | - | `NotFound` |
//! | `replace_item_if_match` | - | `PreconditionFailed` |
//!
//! Every call returns an [`ItemResponse`] (or a [`FeedResponse`] page)
//! carrying the [`RequestCharge`] computed by the client's
//! [`RequestMeter`].
//!
//! ## Quick Start
//!
//! ```text
//! use docstore_client::{DocumentClient, ClientConfig};
//!
//! DocumentClient::scoped(ClientConfig::default(), |client| {
//!     let db = client.create_database_if_absent("FamilyDatabase")?.into_resource();
//!     let families = db
//!         .create_container_if_absent("FamilyContainer", "/lastName")?
//!         .into_resource();
//!     families.create_item_if_absent(&family)?;
//!     let mut feed = families.query_items_text::<Family>(
//!         "SELECT * FROM c WHERE c.lastName = 'Andersen'",
//!     )?;
//!     while feed.has_more_results() {
//!         for family in feed.read_next()? {
//!             println!("{:?}", family);
//!         }
//!     }
//!     Ok(())
//! })?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
pub mod config;
mod container;
mod database;
mod feed;
pub mod meter;
mod response;

pub use client::DocumentClient;
pub use config::{ClientConfig, CONFIG_FILE_NAME};
pub use container::Container;
pub use database::Database;
pub use feed::FeedIterator;
pub use meter::{NoopMeter, OperationKind, RequestCharge, RequestMeter, SizeBasedMeter};
pub use response::{FeedResponse, ItemResponse, ResponseStatus};

// Re-export the types callers need so they don't depend on the inner crates
pub use docstore_core::{
    Document, Error, JsonPath, JsonValue, PartitionKey, ResourceKind, Result, Timestamp,
};
pub use docstore_storage::{DatabaseSnapshot, QueryDefinition, QueryIter};
