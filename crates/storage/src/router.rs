//! Partition routing
//!
//! Maps a partition key value to one of a fixed number of buckets. Routing
//! is a pure function of the key and the bucket count: xxh3 of the key
//! text seeded with the key's JSON type tag, reduced modulo the count. Two containers configured with the same
//! count route every key identically.

use docstore_core::{Error, PartitionKey, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Identity of a partition bucket inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionId(u32);

impl PartitionId {
    /// Bucket index
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Routes partition key values to buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionRouter {
    partition_count: u32,
}

impl PartitionRouter {
    /// Bucket count used when none is configured
    pub const DEFAULT_PARTITION_COUNT: u32 = 16;

    /// Largest accepted bucket count
    pub const MAX_PARTITION_COUNT: u32 = 4096;

    /// Create a router over `partition_count` buckets
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when the count is 0 or above [`Self::MAX_PARTITION_COUNT`].
    pub fn new(partition_count: u32) -> Result<Self> {
        if partition_count == 0 || partition_count > Self::MAX_PARTITION_COUNT {
            return Err(Error::InvalidConfig(format!(
                "partition count must be between 1 and {}, got {}",
                Self::MAX_PARTITION_COUNT,
                partition_count
            )));
        }
        Ok(PartitionRouter { partition_count })
    }

    /// Number of buckets
    #[inline]
    pub fn partition_count(&self) -> u32 {
        self.partition_count
    }

    /// Bucket for a partition key value
    #[inline]
    pub fn resolve(&self, key: &PartitionKey) -> PartitionId {
        let hash = xxh3_64_with_seed(key.as_str().as_bytes(), key.type_tag());
        PartitionId((hash % u64::from(self.partition_count)) as u32)
    }

    /// Bucket for a raw JSON value read from a document
    ///
    /// Fails with `InvalidPartitionKey` when the value is absent or null.
    pub fn resolve_value(&self, value: Option<&serde_json::Value>) -> Result<PartitionId> {
        PartitionKey::from_json(value).map(|key| self.resolve(&key))
    }

    /// All bucket ids in ascending order
    pub fn partition_ids(&self) -> impl Iterator<Item = PartitionId> {
        (0..self.partition_count).map(PartitionId)
    }
}

impl Default for PartitionRouter {
    fn default() -> Self {
        PartitionRouter {
            partition_count: Self::DEFAULT_PARTITION_COUNT,
        }
    }
}
