//! Parsed response values, one variant per parsing category.

use bytes::Bytes;

use crate::{content_type::BodyKind, form::FormData};

/// A response body parsed according to its classified content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A text body.
    Text(String),
    /// A JSON body.
    Json(serde_json::Value),
    /// A decoded multipart form body.
    FormData(FormData),
    /// A typed binary body.
    Blob(Blob),
    /// A raw binary body.
    ArrayBuffer(Bytes),
}

impl Body {
    /// The parsing category this value came from.
    #[must_use]
    pub const fn kind(&self) -> BodyKind {
        match self {
            Self::Text(_) => BodyKind::Text,
            Self::Json(_) => BodyKind::Json,
            Self::FormData(_) => BodyKind::FormData,
            Self::Blob(_) => BodyKind::Blob,
            Self::ArrayBuffer(_) => BodyKind::ArrayBuffer,
        }
    }
}

/// A binary payload that remembers its declared content type, both as a
/// parsed response value and as the request body for `post_blob`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    content_type: Option<String>,
}

impl Blob {
    /// Creates a blob with no declared content type.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Creates a blob with a declared content type.
    pub fn with_content_type(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: Some(content_type.into()),
        }
    }

    /// The payload bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The declared content type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Consumes the blob and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
