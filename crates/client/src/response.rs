//! Operation responses

use crate::meter::RequestCharge;
use docstore_core::{Document, Result};
use serde::de::DeserializeOwned;
use std::fmt;

/// Outcome of a successful operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// Existing resource returned or updated (200)
    Ok,
    /// Resource created by this call (201)
    Created,
    /// Resource deleted (204)
    NoContent,
}

impl ResponseStatus {
    /// HTTP-style status code
    pub fn code(&self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::Created => 201,
            ResponseStatus::NoContent => 204,
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Ok => write!(f, "200 OK"),
            ResponseStatus::Created => write!(f, "201 Created"),
            ResponseStatus::NoContent => write!(f, "204 No Content"),
        }
    }
}

/// A resource plus the metadata of the call that produced it
#[derive(Debug, Clone)]
pub struct ItemResponse<T> {
    resource: T,
    status: ResponseStatus,
    request_charge: RequestCharge,
    etag: Option<u64>,
}

impl<T> ItemResponse<T> {
    pub(crate) fn new(
        resource: T,
        status: ResponseStatus,
        request_charge: RequestCharge,
        etag: Option<u64>,
    ) -> Self {
        ItemResponse {
            resource,
            status,
            request_charge,
            etag,
        }
    }

    /// The returned resource
    pub fn resource(&self) -> &T {
        &self.resource
    }

    /// Take the returned resource
    pub fn into_resource(self) -> T {
        self.resource
    }

    /// Outcome of the call
    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    /// True when this call created the resource
    pub fn is_created(&self) -> bool {
        self.status == ResponseStatus::Created
    }

    /// Cost of the call
    pub fn request_charge(&self) -> RequestCharge {
        self.request_charge
    }

    /// Document version after the call; `None` for databases, containers
    /// and deletes
    pub fn etag(&self) -> Option<u64> {
        self.etag
    }
}

impl ItemResponse<Document> {
    /// Deserialize the document body into a caller type
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        self.resource.deserialize()
    }
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct FeedResponse<T> {
    items: Vec<T>,
    request_charge: RequestCharge,
}

impl<T> FeedResponse<T> {
    pub(crate) fn new(items: Vec<T>, request_charge: RequestCharge) -> Self {
        FeedResponse {
            items,
            request_charge,
        }
    }

    /// Number of items on this page
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// True for an empty page
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items on this page
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Iterate the items on this page
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Take the items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Cost of reading this page
    pub fn request_charge(&self) -> RequestCharge {
        self.request_charge
    }
}

impl<T> IntoIterator for FeedResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a FeedResponse<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
