//! Query engine
//!
//! Evaluates single-field equality predicates over every document of a
//! container. Queries are cross-partition: [`QueryIter`] visits buckets in
//! ascending [`PartitionId`](crate::PartitionId) order and each bucket in
//! insertion order.
//!
//! The iterator is lazy. It holds no lock between items: each `next()`
//! takes the current bucket's read lock, finds the next match after its
//! cursor, clones it and releases the lock. A scan therefore sees writes
//! committed before it reaches a bucket (read-committed at scan time) and
//! there is no snapshot isolation. Calling [`execute`] again re-scans the
//! current state.
//!
//! # Query text
//!
//! Only this subset is accepted:
//!
//! ```text
//! SELECT * FROM c
//! SELECT * FROM c WHERE c.lastName = 'van Appeldoorn'
//! SELECT * FROM f WHERE f.address.city = "Woudenberg"
//! SELECT * FROM c WHERE c.children[0].age = 17
//! ```
//!
//! Any other shape (projections, other operators, `AND`/`OR`, `ORDER BY`,
//! functions) fails with `UnsupportedQuery`.

use crate::container::ContainerStore;
use crate::partition::Sequence;
use docstore_core::{Document, Error, JsonPath, JsonValue, ResourceKind, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Predicate
// =============================================================================

/// Filter applied to each document
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Every document matches
    All,
    /// The value at `path` equals `value`
    Eq {
        /// Field path inside the body
        path: JsonPath,
        /// Literal to compare against
        value: JsonValue,
    },
}

impl Predicate {
    /// `field_path = value`
    ///
    /// # Errors
    ///
    /// `UnsupportedQuery` when the path does not parse or is the root.
    pub fn eq(field_path: &str, value: impl Into<JsonValue>) -> Result<Self> {
        Ok(Predicate::Eq {
            path: parse_field_path(field_path)?,
            value: value.into(),
        })
    }

    /// Evaluate against a document
    ///
    /// A document missing the field never matches, not even `= null`.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Eq { path, value } => document
                .attribute(path)
                .is_some_and(|found| value.matches_value(found)),
        }
    }
}

fn parse_field_path(field_path: &str) -> Result<JsonPath> {
    let path: JsonPath = field_path.parse().map_err(|e| {
        Error::UnsupportedQuery(format!("invalid field path '{}': {}", field_path, e))
    })?;
    if path.is_root() {
        return Err(Error::UnsupportedQuery(
            "predicate needs a field path".to_string(),
        ));
    }
    path.validate()
        .map_err(|e| Error::UnsupportedQuery(e.to_string()))?;
    Ok(path)
}

// =============================================================================
// QueryDefinition
// =============================================================================

/// A parsed query
///
/// Built from query text with [`QueryDefinition::parse`], or directly from
/// a field path and value.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefinition {
    text: String,
    predicate: Predicate,
}

impl QueryDefinition {
    /// Match every document
    pub fn all() -> Self {
        QueryDefinition {
            text: "SELECT * FROM c".to_string(),
            predicate: Predicate::All,
        }
    }

    /// Match documents whose `field_path` equals `value`
    pub fn field_equals(field_path: &str, value: impl Into<JsonValue>) -> Result<Self> {
        let path = parse_field_path(field_path)?;
        let value = value.into();
        Ok(QueryDefinition {
            text: format!("SELECT * FROM c WHERE c.{} = {}", path, value),
            predicate: Predicate::Eq { path, value },
        })
    }

    /// Parse query text
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        let predicate = Parser { tokens, pos: 0 }.parse_query()?;
        Ok(QueryDefinition {
            text: text.to_string(),
            predicate,
        })
    }

    /// Query text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Predicate evaluated per document
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl FromStr for QueryDefinition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QueryDefinition::parse(s)
    }
}

impl fmt::Display for QueryDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// =============================================================================
// Execution
// =============================================================================

/// Start a scan of `store` for `field_path = value`
pub fn query(
    store: &Arc<ContainerStore>,
    field_path: &str,
    value: impl Into<JsonValue>,
) -> Result<QueryIter> {
    execute(store, &QueryDefinition::field_equals(field_path, value)?)
}

/// Start a scan of `store` for a parsed query
///
/// # Errors
///
/// `NotFound` if the container has been deleted.
pub fn execute(store: &Arc<ContainerStore>, definition: &QueryDefinition) -> Result<QueryIter> {
    if store.is_deleted() {
        return Err(Error::not_found(ResourceKind::Container, store.name()));
    }
    Ok(QueryIter {
        store: Arc::clone(store),
        predicate: definition.predicate.clone(),
        partition: 0,
        cursor: None,
    })
}

/// Lazy cross-partition scan
///
/// Finite: it ends after the last bucket. If the container is deleted
/// mid-scan the iterator simply ends.
#[derive(Debug)]
pub struct QueryIter {
    store: Arc<ContainerStore>,
    predicate: Predicate,
    partition: usize,
    cursor: Option<Sequence>,
}

impl QueryIter {
    /// Predicate being evaluated
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// True once every bucket has been scanned
    pub fn is_exhausted(&self) -> bool {
        self.partition >= self.store.partition_count() as usize
    }
}

impl Iterator for QueryIter {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        while !self.is_exhausted() {
            let predicate = &self.predicate;
            let cursor = self.cursor;
            let step = self.store.with_partition(self.partition, |partition| {
                partition
                    .next_after(cursor, |doc| predicate.matches(doc))
                    .map(|(seq, doc)| (seq, doc.clone()))
            });

            match step {
                // Container deleted
                None => {
                    self.partition = usize::MAX;
                    return None;
                }
                Some(Some((seq, doc))) => {
                    self.cursor = Some(seq);
                    return Some(doc);
                }
                Some(None) => {
                    self.partition += 1;
                    self.cursor = None;
                }
            }
        }
        None
    }
}

// =============================================================================
// Query text parsing
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Star,
    Eq,
    Str(String),
    Number(String),
    Symbol(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::Star => f.write_str("*"),
            Token::Eq => f.write_str("="),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::Number(n) => f.write_str(n),
            Token::Symbol(s) => f.write_str(s),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']' | '$' | '-')
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '*' {
            tokens.push(Token::Star);
            i += 1;
        } else if c == '=' {
            tokens.push(Token::Eq);
            i += 1;
        } else if c == '\'' || c == '"' {
            let quote = c;
            let mut literal = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(Error::UnsupportedQuery(
                            "unterminated string literal".to_string(),
                        ))
                    }
                    Some('\\') => {
                        match chars.get(i + 1) {
                            Some(escaped) => literal.push(*escaped),
                            None => {
                                return Err(Error::UnsupportedQuery(
                                    "unterminated string literal".to_string(),
                                ))
                            }
                        }
                        i += 2;
                    }
                    Some(ch) if *ch == quote => {
                        i += 1;
                        break;
                    }
                    Some(ch) => {
                        literal.push(*ch);
                        i += 1;
                    }
                }
            }
            tokens.push(Token::Str(literal));
        } else if c.is_ascii_digit()
            || (c == '-' && chars.get(i + 1).map_or(false, |n| n.is_ascii_digit()))
        {
            let start = i;
            i += 1;
            while i < chars.len()
                && (chars[i].is_ascii_digit() || matches!(chars[i], '.' | 'e' | 'E' | '+' | '-'))
            {
                i += 1;
            }
            tokens.push(Token::Number(chars[start..i].iter().collect()));
        } else if is_word_char(c) {
            let start = i;
            while i < chars.len() && is_word_char(chars[i]) {
                i += 1;
            }
            tokens.push(Token::Word(chars[start..i].iter().collect()));
        } else {
            // Comparison operators are grouped so the error names them whole
            let start = i;
            i += 1;
            while i < chars.len() && matches!(chars[i], '=' | '>' | '<') {
                i += 1;
            }
            tokens.push(Token::Symbol(chars[start..i].iter().collect()));
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn parse_query(&mut self) -> Result<Predicate> {
        self.expect_keyword("SELECT")?;
        match self.advance() {
            Some(Token::Star) => {}
            Some(other) => {
                return Err(Error::UnsupportedQuery(format!(
                    "only SELECT * is supported, found '{}'",
                    other
                )))
            }
            None => return Err(unexpected_end()),
        }
        self.expect_keyword("FROM")?;
        let alias = match self.advance() {
            Some(Token::Word(w)) if !w.contains(&['.', '[', ']'][..]) => w,
            Some(other) => {
                return Err(Error::UnsupportedQuery(format!(
                    "expected a container alias, found '{}'",
                    other
                )))
            }
            None => return Err(unexpected_end()),
        };

        if self.peek().is_none() {
            return Ok(Predicate::All);
        }
        self.expect_keyword("WHERE")?;

        let field = match self.advance() {
            Some(Token::Word(w)) => w,
            Some(other) => {
                return Err(Error::UnsupportedQuery(format!(
                    "expected a field reference, found '{}'",
                    other
                )))
            }
            None => return Err(unexpected_end()),
        };
        let field_path = field
            .strip_prefix(alias.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .ok_or_else(|| {
                Error::UnsupportedQuery(format!(
                    "field '{}' must be qualified with the alias '{}'",
                    field, alias
                ))
            })?
            .to_string();

        match self.advance() {
            Some(Token::Eq) => {}
            Some(other) => {
                return Err(Error::UnsupportedQuery(format!(
                    "only equality predicates are supported, found '{}'",
                    other
                )))
            }
            None => return Err(unexpected_end()),
        }

        let value = self.parse_literal()?;

        if let Some(extra) = self.peek() {
            let message = match extra {
                Token::Word(w) if w.eq_ignore_ascii_case("AND") || w.eq_ignore_ascii_case("OR") => {
                    "only single-field predicates are supported".to_string()
                }
                other => format!("unexpected '{}' after predicate", other),
            };
            return Err(Error::UnsupportedQuery(message));
        }

        Predicate::eq(&field_path, value)
    }

    fn parse_literal(&mut self) -> Result<JsonValue> {
        match self.advance() {
            Some(Token::Str(s)) => Ok(JsonValue::from(s)),
            Some(Token::Number(n)) => n
                .parse::<JsonValue>()
                .ok()
                .filter(|v| v.is_number())
                .ok_or_else(|| Error::UnsupportedQuery(format!("invalid number literal '{}'", n))),
            Some(Token::Word(w)) if w == "true" => Ok(JsonValue::from(true)),
            Some(Token::Word(w)) if w == "false" => Ok(JsonValue::from(false)),
            Some(Token::Word(w)) if w == "null" => Ok(JsonValue::null()),
            Some(other) => Err(Error::UnsupportedQuery(format!(
                "right-hand side must be a literal, found '{}'",
                other
            ))),
            None => Err(unexpected_end()),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        match self.advance() {
            Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword) => Ok(()),
            Some(other) => Err(Error::UnsupportedQuery(format!(
                "expected {}, found '{}'",
                keyword, other
            ))),
            None => Err(unexpected_end()),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }
}

fn unexpected_end() -> Error {
    Error::UnsupportedQuery("unexpected end of query".to_string())
}
