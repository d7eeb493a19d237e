//! Request charges
//!
//! Every response carries a [`RequestCharge`], the cost unit a hosted
//! service would bill for the operation. The store itself has no notion of
//! cost: a [`RequestMeter`] computes the charge from the operation kind and
//! payload size, and the client passes it through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Cost of one operation, in request units
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct RequestCharge(f64);

impl RequestCharge {
    /// No cost
    pub const ZERO: RequestCharge = RequestCharge(0.0);

    /// Wrap a raw value; negative and non-finite values become zero
    pub fn new(units: f64) -> Self {
        if units.is_finite() && units > 0.0 {
            RequestCharge(units)
        } else {
            RequestCharge::ZERO
        }
    }

    /// Request units
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for RequestCharge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} RU", self.0)
    }
}

impl Add for RequestCharge {
    type Output = RequestCharge;

    fn add(self, rhs: RequestCharge) -> RequestCharge {
        RequestCharge(self.0 + rhs.0)
    }
}

impl AddAssign for RequestCharge {
    fn add_assign(&mut self, rhs: RequestCharge) {
        self.0 += rhs.0;
    }
}

impl Sum for RequestCharge {
    fn sum<I: Iterator<Item = RequestCharge>>(iter: I) -> RequestCharge {
        iter.fold(RequestCharge::ZERO, Add::add)
    }
}

/// What an operation did, for metering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Point read
    Read,
    /// Create, replace or upsert
    Write,
    /// Document delete
    Delete,
    /// One page of query results
    Query,
    /// Database or container management
    Metadata,
}

/// Computes the charge for an operation
pub trait RequestMeter: Send + Sync + fmt::Debug {
    /// Charge for an operation that moved `payload_bytes` of document JSON
    fn charge(&self, operation: OperationKind, payload_bytes: usize) -> RequestCharge;
}

/// Charges nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMeter;

impl RequestMeter for NoopMeter {
    fn charge(&self, _operation: OperationKind, _payload_bytes: usize) -> RequestCharge {
        RequestCharge::ZERO
    }
}

/// Charges by payload size
///
/// Reads and query pages cost `read_per_kib` per KiB, writes
/// `write_per_kib` per KiB. Every operation costs at least `minimum`.
/// Deletes and metadata operations carry no payload and cost the minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBasedMeter {
    /// Units per KiB read
    pub read_per_kib: f64,
    /// Units per KiB written
    pub write_per_kib: f64,
    /// Floor applied to every charge
    pub minimum: f64,
}

impl Default for SizeBasedMeter {
    fn default() -> Self {
        SizeBasedMeter {
            read_per_kib: 1.0,
            write_per_kib: 5.0,
            minimum: 1.0,
        }
    }
}

impl RequestMeter for SizeBasedMeter {
    fn charge(&self, operation: OperationKind, payload_bytes: usize) -> RequestCharge {
        let kib = payload_bytes as f64 / 1024.0;
        let units = match operation {
            OperationKind::Read | OperationKind::Query => kib * self.read_per_kib,
            OperationKind::Write => kib * self.write_per_kib,
            OperationKind::Delete | OperationKind::Metadata => 0.0,
        };
        RequestCharge::new(units.max(self.minimum))
    }
}
