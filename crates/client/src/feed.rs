//! Paged query results

use crate::client::ClientShared;
use crate::meter::OperationKind;
use crate::response::FeedResponse;
use docstore_core::Result;
use docstore_storage::QueryIter;
use serde::de::DeserializeOwned;
use std::iter::Peekable;
use std::marker::PhantomData;
use std::sync::Arc;

/// Pages over the results of a query
///
/// Each [`read_next`](Self::read_next) pulls at most `max_item_count`
/// documents from the underlying lazy scan and deserializes their bodies
/// into `T`. Use `serde_json::Value` for untyped bodies.
///
/// ```text
/// let mut feed = container.query_items::<Family>(&query)?;
/// while feed.has_more_results() {
///     let page = feed.read_next()?;
///     for family in &page {
///         println!("{:?}", family);
///     }
/// }
/// ```
pub struct FeedIterator<T> {
    shared: Arc<ClientShared>,
    results: Peekable<QueryIter>,
    max_item_count: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> FeedIterator<T> {
    pub(crate) fn new(shared: Arc<ClientShared>, results: QueryIter, max_item_count: usize) -> Self {
        FeedIterator {
            shared,
            results: results.peekable(),
            max_item_count: max_item_count.max(1),
            _marker: PhantomData,
        }
    }

    /// Override the page size
    pub fn with_max_item_count(mut self, max_item_count: usize) -> Self {
        self.max_item_count = max_item_count.max(1);
        self
    }

    /// Page size
    pub fn max_item_count(&self) -> usize {
        self.max_item_count
    }

    /// True while another non-empty page is available
    pub fn has_more_results(&mut self) -> bool {
        !self.shared.is_closed() && self.results.peek().is_some()
    }

    /// Read the next page
    ///
    /// Returns an empty page once the results are exhausted.
    ///
    /// # Errors
    ///
    /// `ClientClosed` after the client is closed, `Serialization` if a body
    /// does not deserialize into `T`.
    pub fn read_next(&mut self) -> Result<FeedResponse<T>> {
        self.shared.ensure_open()?;
        let mut items = Vec::new();
        let mut payload_bytes = 0;
        while items.len() < self.max_item_count {
            let Some(document) = self.results.next() else {
                break;
            };
            payload_bytes += document.body().size_bytes();
            items.push(document.deserialize::<T>()?);
        }
        let charge = self.shared.charge(OperationKind::Query, payload_bytes);
        Ok(FeedResponse::new(items, charge))
    }
}

impl<T: DeserializeOwned> Iterator for FeedIterator<T> {
    type Item = Result<FeedResponse<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_more_results() {
            Some(self.read_next())
        } else {
            None
        }
    }
}
