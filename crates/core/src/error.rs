//! Error types for docstore
//!
//! Every fallible operation in the workspace returns [`Result`]. Errors are
//! returned to the immediate caller and never retried: transient-fault
//! handling belongs to whatever transport wraps the store.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::json::LimitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for docstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A database in the client catalog
    Database,
    /// A container inside a database
    Container,
    /// A document inside a container
    Document,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Database => write!(f, "database"),
            ResourceKind::Container => write!(f, "container"),
            ResourceKind::Document => write!(f, "document"),
        }
    }
}

/// Error types for docstore
#[derive(Debug, Error)]
pub enum Error {
    /// Read, replace or delete on an entity that does not exist (or was deleted)
    #[error("{resource} not found: {name}")]
    NotFound {
        /// Kind of the missing entity
        resource: ResourceKind,
        /// Name or `(partition key, id)` rendering of the entity
        name: String,
    },

    /// Strict create on an entity that already exists
    #[error("{resource} already exists: {name}")]
    AlreadyExists {
        /// Kind of the existing entity
        resource: ResourceKind,
        /// Name of the existing entity
        name: String,
    },

    /// Partition key value is absent, null or not a scalar
    #[error("invalid partition key: {0}")]
    InvalidPartitionKey(String),

    /// Container exists with a different partition key path
    #[error("container {container} already exists with partition key path {existing}, requested {requested}")]
    ContainerConfigConflict {
        /// Container name
        container: String,
        /// Path the container was created with
        existing: String,
        /// Path the caller asked for
        requested: String,
    },

    /// Query is outside the supported `field = literal` subset
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),

    /// Database, container or document name is empty or contains a reserved character
    #[error("invalid {resource} name: {reason}")]
    InvalidName {
        /// Kind of the entity being named
        resource: ResourceKind,
        /// What is wrong with the name
        reason: String,
    },

    /// Document body is malformed or nests too deep
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Document body is larger than the container's size budget
    #[error("document size {size} exceeds maximum of {max} bytes")]
    DocumentTooLarge {
        /// Compact JSON size of the body
        size: usize,
        /// Budget in force
        max: usize,
    },

    /// Conditional replace saw a different etag
    #[error("precondition failed: expected etag {expected}, found {actual}")]
    PreconditionFailed {
        /// Etag supplied by the caller
        expected: u64,
        /// Etag currently stored
        actual: u64,
    },

    /// Configuration could not be parsed or is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error (config files, snapshot files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The client handle has been closed
    #[error("client is closed")]
    ClientClosed,
}

impl Error {
    /// Build a `NotFound` error
    pub fn not_found(resource: ResourceKind, name: impl Into<String>) -> Self {
        Error::NotFound {
            resource,
            name: name.into(),
        }
    }

    /// Build an `AlreadyExists` error
    pub fn already_exists(resource: ResourceKind, name: impl Into<String>) -> Self {
        Error::AlreadyExists {
            resource,
            name: name.into(),
        }
    }

    /// True for any `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP-style status code a transport can surface for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::AlreadyExists { .. } | Error::ContainerConfigConflict { .. } => 409,
            Error::PreconditionFailed { .. } => 412,
            Error::DocumentTooLarge { .. } => 413,
            Error::InvalidPartitionKey(_)
            | Error::InvalidName { .. }
            | Error::UnsupportedQuery(_)
            | Error::InvalidDocument(_)
            | Error::InvalidConfig(_) => 400,
            Error::ClientClosed => 503,
            Error::Serialization(_) | Error::Io(_) => 500,
        }
    }
}

impl From<LimitError> for Error {
    fn from(e: LimitError) -> Self {
        match e {
            LimitError::DocumentTooLarge { size, max } => Error::DocumentTooLarge { size, max },
            other => Error::InvalidDocument(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
