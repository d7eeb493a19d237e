//! Core types for docstore
//!
//! This crate defines the foundational types used throughout the workspace:
//! - Document: id, partition key, JSON body and system properties
//! - PartitionKey / PartitionKeyPath: placement of documents
//! - JsonValue / JsonPath: document bodies and field addressing
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod json;

pub use document::{
    validate_name, Document, DocumentKey, PartitionKey, PartitionKeyPath, Timestamp, ID_FIELD,
};
pub use error::{Error, ResourceKind, Result};
pub use json::{
    get_at_path, JsonPath, JsonValue, LimitError, PathParseError, PathSegment, MAX_DOCUMENT_SIZE,
    MAX_NESTING_DEPTH, MAX_PATH_LENGTH,
};
