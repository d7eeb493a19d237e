//! Partition bucket
//!
//! One bucket holds every document whose partition key routes to it.
//! Documents are identified by `(partition key, id)` through an FxHashMap
//! index and kept in insertion order in a BTreeMap keyed by a per-bucket
//! sequence number. Replacing a document keeps its sequence number, so a
//! replaced document does not move in scan order.
//!
//! A bucket does no locking of its own; the container wraps each one in a
//! `RwLock` and every method here runs inside that critical section.

use docstore_core::{Document, DocumentKey};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Position of a document in its bucket's insertion order
pub type Sequence = u64;

/// Documents routed to one partition bucket
#[derive(Debug, Default)]
pub struct Partition {
    /// `(partition key, id)` -> sequence number
    index: FxHashMap<DocumentKey, Sequence>,
    /// Insertion-ordered documents
    documents: BTreeMap<Sequence, Document>,
    next_seq: Sequence,
}

impl Partition {
    /// Create an empty bucket
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in the bucket
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the bucket is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up a document
    pub fn get(&self, key: &DocumentKey) -> Option<&Document> {
        self.index
            .get(key)
            .and_then(|seq| self.documents.get(seq))
    }

    /// Check if a document is present
    pub fn contains(&self, key: &DocumentKey) -> bool {
        self.index.contains_key(key)
    }

    /// Append a document that is not yet present
    ///
    /// Returns `false` and leaves the bucket untouched if the key exists.
    pub fn insert(&mut self, document: Document) -> bool {
        if self.index.contains_key(document.key()) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(document.key().clone(), seq);
        self.documents.insert(seq, document);
        true
    }

    /// Swap in a new version of an existing document, keeping its position
    ///
    /// Returns the previous version, or `None` (and changes nothing) if the
    /// key is absent.
    pub fn replace(&mut self, document: Document) -> Option<Document> {
        let seq = *self.index.get(document.key())?;
        self.documents.insert(seq, document)
    }

    /// Remove a document
    pub fn remove(&mut self, key: &DocumentKey) -> Option<Document> {
        let seq = self.index.remove(key)?;
        self.documents.remove(&seq)
    }

    /// Drop every document
    pub fn clear(&mut self) {
        self.index.clear();
        self.documents.clear();
    }

    /// Documents in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// First document after `cursor` (exclusive) satisfying `matches`
    ///
    /// A `None` cursor starts from the beginning. Used by the query engine
    /// to resume a scan after re-acquiring the bucket lock.
    pub fn next_after<F>(&self, cursor: Option<Sequence>, mut matches: F) -> Option<(Sequence, &Document)>
    where
        F: FnMut(&Document) -> bool,
    {
        let lower = match cursor {
            Some(seq) => Bound::Excluded(seq),
            None => Bound::Unbounded,
        };
        self.documents
            .range((lower, Bound::Unbounded))
            .find(|(_, doc)| matches(doc))
            .map(|(seq, doc)| (*seq, doc))
    }
}
