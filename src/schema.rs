//! The pluggable validation capability applied to parsed response bodies.
//!
//! A [`Schema`] receives the parsed value (or `None` when the response had
//! no parseable body) and checks or coerces it into its output type. The
//! trait is independent of any validation library: the bundled validators
//! cover the common cases, [`from_fn`] lifts a closure, and anything else
//! can implement [`Schema`] directly.

use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use snafu::prelude::*;

use crate::{body::Body, form::FormData, platform::MaybeSendSync};

/// Errors from validating a parsed response value.
///
/// Distinct from [`crate::HttpError`]: a schema error means the request
/// succeeded and the body parsed, but the value did not conform.
#[derive(Debug, Snafu)]
pub enum SchemaError {
    /// The value did not deserialize into the target type.
    #[snafu(display("Value does not conform to the schema"))]
    Deserialize {
        /// The underlying deserialization error.
        source: serde_json::Error,
    },
    /// The value belonged to a different parsing category than the schema
    /// expects.
    #[snafu(display("Schema expected {expected}, got {found}"))]
    Mismatch {
        /// The category the schema expects.
        expected: &'static str,
        /// The category (or "nothing") that was found.
        found: &'static str,
    },
    /// A custom validator rejected the value.
    #[snafu(display("{message}"))]
    Invalid {
        /// The validator's description of the problem.
        message: String,
    },
}

impl SchemaError {
    /// Creates a custom validation error, for use by [`from_fn`] validators.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        InvalidSnafu {
            message: message.into(),
        }
        .build()
    }
}

impl crate::Error for SchemaError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Validates or coerces a parsed response value into a typed output.
pub trait Schema: MaybeSendSync {
    /// The validated output type.
    type Output;

    /// Checks the parsed value (`None` when the response had no parseable
    /// body) and produces the output.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the value does not conform.
    fn parse(&self, value: Option<Body>) -> Result<Self::Output, SchemaError>;
}

/// The identity validator: returns the parsed (or absent) value untouched.
///
/// This is the "no schema" path: use it when the caller wants the raw
/// [`Body`] without validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl Schema for Raw {
    type Output = Option<Body>;

    fn parse(&self, value: Option<Body>) -> Result<Self::Output, SchemaError> {
        Ok(value)
    }
}

/// Deserializes a JSON body into `T`.
#[derive(Debug)]
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    /// Creates the validator.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Schema for Json<T> {
    type Output = T;

    fn parse(&self, value: Option<Body>) -> Result<T, SchemaError> {
        match value {
            Some(Body::Json(value)) => serde_json::from_value(value).context(DeserializeSnafu),
            other => MismatchSnafu {
                expected: "json",
                found: found_kind(other.as_ref()),
            }
            .fail(),
        }
    }
}

/// Expects a text body and yields it as a `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl Schema for Text {
    type Output = String;

    fn parse(&self, value: Option<Body>) -> Result<String, SchemaError> {
        match value {
            Some(Body::Text(value)) => Ok(value),
            other => MismatchSnafu {
                expected: "text",
                found: found_kind(other.as_ref()),
            }
            .fail(),
        }
    }
}

/// Accepts either binary category (blob or arrayBuffer) and yields the raw
/// bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binary;

impl Schema for Binary {
    type Output = Bytes;

    fn parse(&self, value: Option<Body>) -> Result<Bytes, SchemaError> {
        match value {
            Some(Body::Blob(blob)) => Ok(blob.into_bytes()),
            Some(Body::ArrayBuffer(bytes)) => Ok(bytes),
            other => MismatchSnafu {
                expected: "blob or arrayBuffer",
                found: found_kind(other.as_ref()),
            }
            .fail(),
        }
    }
}

/// Expects a decoded multipart body and yields the [`FormData`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Form;

impl Schema for Form {
    type Output = FormData;

    fn parse(&self, value: Option<Body>) -> Result<FormData, SchemaError> {
        match value {
            Some(Body::FormData(form)) => Ok(form),
            other => MismatchSnafu {
                expected: "formData",
                found: found_kind(other.as_ref()),
            }
            .fail(),
        }
    }
}

/// A validator built from a closure.
pub struct FnSchema<F>(F);

impl<T, F> Schema for FnSchema<F>
where
    F: Fn(Option<Body>) -> Result<T, SchemaError> + MaybeSendSync,
{
    type Output = T;

    fn parse(&self, value: Option<Body>) -> Result<T, SchemaError> {
        (self.0)(value)
    }
}

/// Lifts a closure into a [`Schema`].
pub fn from_fn<T, F>(f: F) -> FnSchema<F>
where
    F: Fn(Option<Body>) -> Result<T, SchemaError> + MaybeSendSync,
{
    FnSchema(f)
}

fn found_kind(value: Option<&Body>) -> &'static str {
    value.map_or("nothing", |body| body.kind().as_str())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Page {
        number: u32,
        title: String,
    }

    #[test]
    fn json_schema_coerces_into_the_target_type() {
        let value = Body::Json(json!({ "number": 3, "title": "intro" }));
        let page: Page = Json::new().parse(Some(value)).unwrap();
        assert_eq!(
            page,
            Page {
                number: 3,
                title: "intro".to_owned()
            }
        );
    }

    #[test]
    fn json_schema_rejects_non_conforming_values() {
        let value = Body::Json(json!({ "number": "three" }));
        let err = Json::<Page>::new().parse(Some(value)).unwrap_err();
        assert!(matches!(err, SchemaError::Deserialize { .. }));
    }

    #[test]
    fn json_schema_rejects_other_categories_and_absence() {
        let err = Json::<Page>::new()
            .parse(Some(Body::Text("nope".to_owned())))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Mismatch { expected: "json", found: "text" }
        ));

        let err = Json::<Page>::new().parse(None).unwrap_err();
        assert!(matches!(err, SchemaError::Mismatch { found: "nothing", .. }));
    }

    #[test]
    fn raw_is_the_identity() {
        assert_eq!(Raw.parse(None).unwrap(), None);
        let body = Body::Text("as-is".to_owned());
        assert_eq!(Raw.parse(Some(body.clone())).unwrap(), Some(body));
    }

    #[test]
    fn binary_accepts_both_binary_categories() {
        let blob = Body::Blob(crate::Blob::with_content_type(vec![1u8, 2], "image/png"));
        assert_eq!(Binary.parse(Some(blob)).unwrap(), Bytes::from(vec![1u8, 2]));

        let buffer = Body::ArrayBuffer(Bytes::from_static(b"raw"));
        assert_eq!(Binary.parse(Some(buffer)).unwrap(), Bytes::from_static(b"raw"));
    }

    #[test]
    fn text_and_form_schemas_expect_their_categories() {
        assert_eq!(Text.parse(Some(Body::Text("t".into()))).unwrap(), "t");
        assert!(matches!(
            Text.parse(None).unwrap_err(),
            SchemaError::Mismatch { found: "nothing", .. }
        ));

        let mut form = FormData::with_boundary("b");
        form.append("k", "v");
        assert_eq!(Form.parse(Some(Body::FormData(form.clone()))).unwrap(), form);
        assert!(matches!(
            Form.parse(Some(Body::ArrayBuffer(Bytes::new()))).unwrap_err(),
            SchemaError::Mismatch {
                expected: "formData",
                found: "arrayBuffer"
            }
        ));
    }

    #[test]
    fn closures_are_validators() {
        let schema = from_fn(|value| match value {
            Some(Body::Text(text)) if text.len() <= 5 => Ok(text),
            Some(Body::Text(_)) => Err(SchemaError::invalid("text too long")),
            other => Err(SchemaError::invalid(format!("unexpected {other:?}"))),
        });
        assert_eq!(schema.parse(Some(Body::Text("ok".into()))).unwrap(), "ok");
        assert!(schema
            .parse(Some(Body::Text("much too long".into())))
            .is_err());
    }
}
