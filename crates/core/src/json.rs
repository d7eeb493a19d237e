//! JSON types for document bodies
//!
//! - [`JsonValue`]: document body, a newtype over `serde_json::Value`
//! - [`JsonPath`]: field address inside a body (`address.city`,
//!   `children[0].age`)
//!
//! # Limits
//!
//! | Limit | Value | Constant |
//! |-------|-------|----------|
//! | Max document size | 16 MB | [`MAX_DOCUMENT_SIZE`] |
//! | Max nesting depth | 100 levels | [`MAX_NESTING_DEPTH`] |
//! | Max path length | 256 segments | [`MAX_PATH_LENGTH`] |
//!
//! A client may lower the document size it enforces, never raise it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::iter::Peekable;
use std::ops::Deref;
use std::str::{CharIndices, FromStr};
use thiserror::Error;

// =============================================================================
// Limits
// =============================================================================

/// Hard ceiling on a document body in bytes of compact JSON (16 MB)
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Deepest accepted nesting of arrays and objects
pub const MAX_NESTING_DEPTH: usize = 100;

/// Longest accepted field path, in segments
pub const MAX_PATH_LENGTH: usize = 256;

/// A body or path outside the limits above
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// Body is larger than the size budget
    #[error("document size {size} exceeds maximum of {max} bytes")]
    DocumentTooLarge {
        /// Compact JSON size of the body
        size: usize,
        /// Budget in force
        max: usize,
    },

    /// Body nests deeper than [`MAX_NESTING_DEPTH`]
    #[error("document nesting depth {depth} exceeds maximum of {max} levels")]
    NestingTooDeep {
        /// Nesting depth of the body
        depth: usize,
        /// Maximum allowed depth
        max: usize,
    },

    /// Path has more than [`MAX_PATH_LENGTH`] segments
    #[error("path length {length} exceeds maximum of {max} segments")]
    PathTooLong {
        /// Segments in the path
        length: usize,
        /// Maximum allowed segments
        max: usize,
    },
}

// =============================================================================
// JsonValue
// =============================================================================

/// Document body
///
/// Read access to the wrapped `serde_json::Value` goes through `Deref`.
///
/// # Examples
///
/// ```
/// use docstore_core::JsonValue;
///
/// let name = JsonValue::from("Wakefield");
/// let age = JsonValue::from(8);
///
/// assert_eq!(name.as_str(), Some("Wakefield"));
/// assert!(age.matches_value(&serde_json::json!(8.0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonValue(Value);

impl JsonValue {
    /// JSON `null`
    pub fn null() -> Self {
        JsonValue(Value::Null)
    }

    /// Borrow the wrapped value
    pub fn as_inner(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the `serde_json::Value`
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Length of the compact JSON rendering
    pub fn size_bytes(&self) -> usize {
        self.0.to_string().len()
    }

    /// Check the body against a size budget and [`MAX_NESTING_DEPTH`]
    pub fn validate(&self, max_size: usize) -> Result<(), LimitError> {
        let size = self.size_bytes();
        if size > max_size {
            return Err(LimitError::DocumentTooLarge {
                size,
                max: max_size,
            });
        }
        let depth = depth(&self.0);
        if depth > MAX_NESTING_DEPTH {
            return Err(LimitError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    /// Equality used by query predicates
    ///
    /// Numbers compare by value across integer and float forms (`17` equals
    /// `17.0`); everything else compares structurally.
    pub fn matches_value(&self, other: &Value) -> bool {
        match (&self.0, other) {
            (Value::Number(a), Value::Number(b)) => {
                if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                    x == y
                } else if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
                    x == y
                } else {
                    a.as_f64() == b.as_f64()
                }
            }
            (a, b) => a == b,
        }
    }
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        Value::Object(fields) => 1 + fields.values().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}

impl Deref for JsonValue {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for JsonValue {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(JsonValue)
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        JsonValue(value)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        value.0
    }
}

impl From<f64> for JsonValue {
    fn from(v: f64) -> Self {
        // NaN and infinity have no JSON form
        JsonValue(serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number))
    }
}

macro_rules! json_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for JsonValue {
                fn from(v: $ty) -> Self {
                    JsonValue(Value::from(v))
                }
            }
        )*
    };
}

json_value_from!(bool, i32, i64, u64, &str, String);

// =============================================================================
// JsonPath
// =============================================================================

/// Why a path string was rejected; positions are byte offsets
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// `a..b`, trailing `.`, or `.` before `[`
    #[error("empty key in path at position {0}")]
    EmptyKey(usize),
    /// `[` without a matching `]`
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    /// Bracket content is not a non-negative integer
    #[error("invalid array index at position {0}: {1}")]
    InvalidIndex(usize, String),
    /// Character that cannot appear in a key
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
}

/// One step of a [`JsonPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object field
    Key(String),
    /// Array element
    Index(usize),
}

/// Field address inside a document body
///
/// Keys are separated by `.`, array elements are selected with `[n]`, a
/// leading `.` is ignored and the empty string is the root.
///
/// ```
/// use docstore_core::JsonPath;
///
/// let path: JsonPath = "children[0].firstName".parse().unwrap();
/// assert_eq!(path, JsonPath::root().key("children").index(0).key("firstName"));
/// assert_eq!(path.to_string(), "children[0].firstName");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// The whole document
    pub fn root() -> Self {
        JsonPath::default()
    }

    /// Append an object field
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an array element
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    /// Steps of the path, outermost first
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// True for the empty path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check the path against [`MAX_PATH_LENGTH`]
    pub fn validate(&self) -> Result<(), LimitError> {
        if self.segments.len() > MAX_PATH_LENGTH {
            return Err(LimitError::PathTooLong {
                length: self.segments.len(),
                max: MAX_PATH_LENGTH,
            });
        }
        Ok(())
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for JsonPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.char_indices().peekable();
        let mut segments = Vec::new();

        if let Some((_, '.')) = chars.peek() {
            chars.next();
        }

        while let Some(&(pos, c)) = chars.peek() {
            match c {
                '[' => {
                    chars.next();
                    segments.push(PathSegment::Index(parse_index(s, pos, &mut chars)?));
                }
                '.' => {
                    chars.next();
                    match chars.peek() {
                        Some(&(_, next)) if is_key_char(next) => {}
                        Some(&(next_pos, _)) => return Err(PathParseError::EmptyKey(next_pos)),
                        None => return Err(PathParseError::EmptyKey(s.len())),
                    }
                }
                c if is_key_char(c) => {
                    let mut end = pos;
                    while let Some(&(i, k)) = chars.peek() {
                        if !is_key_char(k) {
                            break;
                        }
                        end = i + k.len_utf8();
                        chars.next();
                    }
                    segments.push(PathSegment::Key(s[pos..end].to_string()));
                }
                other => return Err(PathParseError::UnexpectedChar(other, pos)),
            }
        }

        Ok(JsonPath { segments })
    }
}

/// Parse the digits after `[` at `open` through the closing `]`
fn parse_index(
    s: &str,
    open: usize,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<usize, PathParseError> {
    let start = open + 1;
    for (i, c) in chars.by_ref() {
        if c == ']' {
            let digits = &s[start..i];
            return digits
                .parse()
                .map_err(|_| PathParseError::InvalidIndex(start, digits.to_string()));
        }
    }
    Err(PathParseError::UnclosedBracket(open))
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '$')
}

/// Value at `path` inside `value`
///
/// `None` when a step is missing or meets the wrong shape (a key into an
/// array, an index into an object).
///
/// ```
/// use docstore_core::json::{get_at_path, JsonPath, JsonValue};
///
/// let doc = JsonValue::from(serde_json::json!({"address": {"city": "Woudenberg"}}));
/// let path: JsonPath = "address.city".parse().unwrap();
/// assert_eq!(get_at_path(&doc, &path).and_then(|v| v.as_str()), Some("Woudenberg"));
/// ```
pub fn get_at_path<'a>(value: &'a JsonValue, path: &JsonPath) -> Option<&'a Value> {
    path.segments
        .iter()
        .try_fold(value.as_inner(), |current, segment| match segment {
            PathSegment::Key(key) => current.as_object()?.get(key),
            PathSegment::Index(index) => current.as_array()?.get(*index),
        })
}
