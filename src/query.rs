//! Query-string construction from a validated key-value map.

use serde_json::{Map, Value};
use snafu::Snafu;
use url::form_urlencoded;

/// The error returned when constructing a [`QueryBuilder`] from a value that
/// is not a string-keyed object.
#[derive(Debug, Snafu)]
#[snafu(display("Invalid query parameters: expected an object, got {kind}"))]
pub struct InvalidQueryError {
    kind: &'static str,
}

impl crate::Error for InvalidQueryError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Validates and serializes a flat key-value map into a query string.
///
/// The map is validated eagerly at construction and immutable afterwards.
/// Key order in the output follows the map's insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    query: Map<String, Value>,
}

impl QueryBuilder {
    /// Creates a `QueryBuilder` from a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidQueryError`] for any non-object value.
    pub fn new(query: Value) -> Result<Self, InvalidQueryError> {
        match query {
            Value::Object(query) => Ok(Self { query }),
            other => InvalidQuerySnafu {
                kind: json_kind(&other),
            }
            .fail(),
        }
    }

    /// The validated query parameters.
    #[must_use]
    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    /// Serializes the query parameters into a URL-encoded query string.
    ///
    /// Values that are "absent" under the truthy-inclusion policy are
    /// skipped entirely: `null`, `false`, numeric zero and the empty string
    /// never appear in the output. Empty arrays and objects are truthy and
    /// serialize to `[]`/`{}`. String values are appended verbatim, arrays
    /// and objects are JSON-serialized first, and the remaining scalars use
    /// their display form. Percent-encoding is left to the serializer.
    #[must_use]
    pub fn build(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.query {
            if !is_present(value) {
                continue;
            }
            match value {
                Value::String(value) => serializer.append_pair(key, value),
                other => serializer.append_pair(key, &other.to_string()),
            };
        }
        serializer.finish()
    }
}

impl From<Map<String, Value>> for QueryBuilder {
    fn from(query: Map<String, Value>) -> Self {
        Self { query }
    }
}

/// Truthy-inclusion policy: mirrors the upstream behavior of dropping falsy
/// values, including `0`, `false` and `""`.
#[allow(clippy::float_cmp)]
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
