//! Document value type
//!
//! A [`Document`] is the unit of storage: an id, the partition key read
//! from the container's [`PartitionKeyPath`], and the JSON body. The body
//! is the full object the caller supplied, `id` field included, so queries
//! can address any field uniformly.
//!
//! System properties (`etag`, `created_at`, `updated_at`) live beside the
//! body and are assigned by the store, never by callers.

use crate::error::{Error, ResourceKind, Result};
use crate::json::{get_at_path, JsonPath, JsonValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the body field holding the document id
pub const ID_FIELD: &str = "id";

/// Characters a resource name may not contain
const FORBIDDEN_NAME_CHARS: [char; 4] = ['/', '\\', '?', '#'];

// =============================================================================
// Timestamp
// =============================================================================

/// Millisecond timestamp since Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Unix epoch
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Current wall-clock time
    pub fn now() -> Self {
        Timestamp(chrono::Utc::now().timestamp_millis())
    }

    /// Create from milliseconds since epoch
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Milliseconds since epoch
    pub const fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match chrono::DateTime::<chrono::Utc>::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

// =============================================================================
// PartitionKey / PartitionKeyPath
// =============================================================================

/// Partition key value of a document
///
/// The JSON type is part of the key: the number `17` and the string `"17"`
/// are different keys. Numbers compare by value, so `17` and `17.0` are
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartitionKey {
    /// String value, kept verbatim
    String(String),
    /// Numeric value in canonical decimal form
    Number(String),
    /// Boolean value
    Bool(bool),
}

impl PartitionKey {
    /// Create a string partition key
    pub fn new(value: impl Into<String>) -> Self {
        PartitionKey::String(value.into())
    }

    /// Derive a partition key from the JSON value found at the key path
    ///
    /// Fails with `InvalidPartitionKey` when the value is absent, null, an
    /// object or an array.
    pub fn from_json(value: Option<&serde_json::Value>) -> Result<Self> {
        match value {
            Some(serde_json::Value::String(s)) => Ok(PartitionKey::String(s.clone())),
            Some(serde_json::Value::Number(n)) => Ok(PartitionKey::Number(canonical_number(n))),
            Some(serde_json::Value::Bool(b)) => Ok(PartitionKey::Bool(*b)),
            Some(serde_json::Value::Null) => Err(Error::InvalidPartitionKey(
                "partition key value is null".to_string(),
            )),
            Some(_) => Err(Error::InvalidPartitionKey(
                "partition key value must be a string, number or boolean".to_string(),
            )),
            None => Err(Error::InvalidPartitionKey(
                "partition key value is missing".to_string(),
            )),
        }
    }

    /// Text of the value (`"true"`/`"false"` for booleans)
    pub fn as_str(&self) -> &str {
        match self {
            PartitionKey::String(s) | PartitionKey::Number(s) => s,
            PartitionKey::Bool(true) => "true",
            PartitionKey::Bool(false) => "false",
        }
    }

    /// Tag distinguishing the JSON type, mixed into the routing hash
    pub fn type_tag(&self) -> u64 {
        match self {
            PartitionKey::String(_) => 0,
            PartitionKey::Number(_) => 1,
            PartitionKey::Bool(_) => 2,
        }
    }
}

/// Integral values print without a fraction so `17` and `17.0` agree
fn canonical_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PartitionKey {
    fn from(s: &str) -> Self {
        PartitionKey::String(s.to_string())
    }
}

impl From<String> for PartitionKey {
    fn from(s: String) -> Self {
        PartitionKey::String(s)
    }
}

impl From<i64> for PartitionKey {
    fn from(n: i64) -> Self {
        PartitionKey::Number(n.to_string())
    }
}

impl From<f64> for PartitionKey {
    fn from(n: f64) -> Self {
        match serde_json::Number::from_f64(n) {
            Some(n) => PartitionKey::Number(canonical_number(&n)),
            None => PartitionKey::Number(n.to_string()),
        }
    }
}

impl From<bool> for PartitionKey {
    fn from(b: bool) -> Self {
        PartitionKey::Bool(b)
    }
}

/// Path of the body field that supplies a container's partition key
///
/// Written in slash form (`/lastName`, `/address/zipCode`), fixed when the
/// container is created.
///
/// ```
/// use docstore_core::PartitionKeyPath;
///
/// let path: PartitionKeyPath = "/address/city".parse().unwrap();
/// assert_eq!(path.as_str(), "/address/city");
/// assert_eq!(path.json_path().to_string(), "address.city");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartitionKeyPath {
    raw: String,
    path: JsonPath,
}

impl PartitionKeyPath {
    /// Original slash-form path
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Equivalent dotted JSON path
    pub fn json_path(&self) -> &JsonPath {
        &self.path
    }

    /// Read the partition key out of a document body
    pub fn extract(&self, body: &JsonValue) -> Result<PartitionKey> {
        PartitionKey::from_json(get_at_path(body, &self.path))
    }
}

impl FromStr for PartitionKeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s.strip_prefix('/').ok_or_else(|| {
            Error::InvalidPartitionKey(format!("partition key path '{}' must start with '/'", s))
        })?;

        let mut path = JsonPath::root();
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidPartitionKey(format!(
                    "partition key path '{}' has an empty segment",
                    s
                )));
            }
            path = path.key(segment);
        }

        Ok(PartitionKeyPath {
            raw: s.to_string(),
            path,
        })
    }
}

impl TryFrom<String> for PartitionKeyPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PartitionKeyPath> for String {
    fn from(p: PartitionKeyPath) -> Self {
        p.raw
    }
}

impl fmt::Display for PartitionKeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// =============================================================================
// DocumentKey
// =============================================================================

/// Identity of a document within a container: `(partition key, id)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    /// Partition key value
    pub partition_key: PartitionKey,
    /// Document id
    pub id: String,
}

impl DocumentKey {
    /// Create a document key
    pub fn new(partition_key: impl Into<PartitionKey>, id: impl Into<String>) -> Self {
        DocumentKey {
            partition_key: partition_key.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.partition_key, self.id)
    }
}

// =============================================================================
// Document
// =============================================================================

/// A stored (or about-to-be-stored) document
///
/// # Example
///
/// ```
/// use docstore_core::{Document, PartitionKeyPath};
///
/// let path: PartitionKeyPath = "/lastName".parse().unwrap();
/// let doc = Document::from_body(
///     serde_json::json!({"id": "Appeldoorn.1", "lastName": "van Appeldoorn"}).into(),
///     &path,
/// )
/// .unwrap();
/// assert_eq!(doc.id(), "Appeldoorn.1");
/// assert_eq!(doc.partition_key().as_str(), "van Appeldoorn");
/// assert_eq!(doc.etag(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    key: DocumentKey,
    body: JsonValue,
    etag: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Document {
    /// Build a document from a JSON body
    ///
    /// The body must be an object with a non-empty string `id` field and a
    /// partition key value at `path`.
    pub fn from_body(body: JsonValue, path: &PartitionKeyPath) -> Result<Self> {
        if !body.is_object() {
            return Err(Error::InvalidDocument(
                "document body must be a JSON object".to_string(),
            ));
        }
        let id = match body.get(ID_FIELD) {
            Some(serde_json::Value::String(id)) => id.clone(),
            Some(_) => {
                return Err(Error::InvalidDocument(
                    "document id must be a string".to_string(),
                ))
            }
            None => {
                return Err(Error::InvalidDocument(
                    "document is missing the 'id' field".to_string(),
                ))
            }
        };
        validate_name(ResourceKind::Document, &id)?;
        let partition_key = path.extract(&body)?;

        Ok(Document {
            key: DocumentKey { partition_key, id },
            body,
            etag: 0,
            created_at: Timestamp::EPOCH,
            updated_at: Timestamp::EPOCH,
        })
    }

    /// Build a document from any serializable value
    pub fn from_serializable<T: Serialize + ?Sized>(
        value: &T,
        path: &PartitionKeyPath,
    ) -> Result<Self> {
        let body = serde_json::to_value(value)?;
        Self::from_body(JsonValue::from(body), path)
    }

    /// Document id
    pub fn id(&self) -> &str {
        &self.key.id
    }

    /// Partition key value
    pub fn partition_key(&self) -> &PartitionKey {
        &self.key.partition_key
    }

    /// `(partition key, id)` identity
    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// Full JSON body
    pub fn body(&self) -> &JsonValue {
        &self.body
    }

    /// Consume the document, returning its body
    pub fn into_body(self) -> JsonValue {
        self.body
    }

    /// Value of a body field, if present
    pub fn attribute(&self, path: &JsonPath) -> Option<&serde_json::Value> {
        get_at_path(&self.body, path)
    }

    /// Deserialize the body into a caller type
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.as_inner().clone())?)
    }

    /// Version token; 0 until stored, 1 on create, +1 per replace
    pub fn etag(&self) -> u64 {
        self.etag
    }

    /// When the document was first stored
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// When the document was last written
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Assign system properties for a first write
    pub fn stamped_new(mut self, now: Timestamp) -> Self {
        self.etag = 1;
        self.created_at = now;
        self.updated_at = now;
        self
    }

    /// Assign system properties for a write replacing `previous`
    pub fn stamped_replacing(mut self, previous: &Document, now: Timestamp) -> Self {
        self.etag = previous.etag + 1;
        self.created_at = previous.created_at;
        self.updated_at = now;
        self
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}

/// Check a database, container or document name
///
/// Names must be non-empty and free of `/`, `\\`, `?` and `#`.
pub fn validate_name(resource: ResourceKind, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            resource,
            reason: "name is empty".to_string(),
        });
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(Error::InvalidName {
            resource,
            reason: format!("'{}' contains forbidden character '{}'", name, c),
        });
    }
    Ok(())
}
