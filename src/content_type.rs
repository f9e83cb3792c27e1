//! The closed MIME-type taxonomy and response classification.
//!
//! Recognized content types are partitioned into five parsing categories
//! ([`BodyKind`]). Classification is an exact string match against the
//! closed sets below: a `Content-Type` header that is absent, carries
//! parameters (`application/json; charset=utf-8`), or names an unlisted
//! MIME type maps to no category at all. The response is then treated as
//! having no parseable body, which is deliberately not an error.

use std::fmt;

use http::{HeaderMap, header::CONTENT_TYPE};

/// Content types whose response bodies are read as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextContentType {
    /// `text/plain`
    Plain,
    /// `text/html`
    Html,
    /// `text/css`
    Css,
    /// `text/javascript`
    Javascript,
    /// `text/csv`
    Csv,
    /// `application/x-www-form-urlencoded`
    FormUrlencoded,
    /// `text/xml`
    Xml,
}

impl TextContentType {
    /// The MIME string for this content type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Html => "text/html",
            Self::Css => "text/css",
            Self::Javascript => "text/javascript",
            Self::Csv => "text/csv",
            Self::FormUrlencoded => "application/x-www-form-urlencoded",
            Self::Xml => "text/xml",
        }
    }

    /// Looks up a MIME string in this closed set.
    #[must_use]
    pub fn from_mime(value: &str) -> Option<Self> {
        match value {
            "text/plain" => Some(Self::Plain),
            "text/html" => Some(Self::Html),
            "text/css" => Some(Self::Css),
            "text/javascript" => Some(Self::Javascript),
            "text/csv" => Some(Self::Csv),
            "application/x-www-form-urlencoded" => Some(Self::FormUrlencoded),
            "text/xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

/// Content types whose response bodies are parsed as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonContentType {
    /// `application/json`
    Json,
    /// `application/ld+json`
    LdJson,
}

impl JsonContentType {
    /// The MIME string for this content type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::LdJson => "application/ld+json",
        }
    }

    /// Looks up a MIME string in this closed set.
    #[must_use]
    pub fn from_mime(value: &str) -> Option<Self> {
        match value {
            "application/json" => Some(Self::Json),
            "application/ld+json" => Some(Self::LdJson),
            _ => None,
        }
    }
}

/// Content types whose response bodies are decoded as multipart form data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormDataContentType {
    /// `multipart/form-data`
    Multipart,
}

impl FormDataContentType {
    /// The MIME string for this content type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multipart => "multipart/form-data",
        }
    }

    /// Looks up a MIME string in this closed set.
    #[must_use]
    pub fn from_mime(value: &str) -> Option<Self> {
        match value {
            "multipart/form-data" => Some(Self::Multipart),
            _ => None,
        }
    }
}

/// Content types whose response bodies are read as typed binary blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobContentType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/gif`
    Gif,
    /// `image/webp`
    Webp,
    /// `image/svg+xml`
    Svg,
    /// `application/pdf`
    Pdf,
    /// `application/zip`
    Zip,
    /// `application/vnd.ms-excel`
    Excel,
    /// `application/vnd.openxmlformats-officedocument.spreadsheetml.sheet`
    ExcelOpenXml,
    /// `application/atom+xml`
    Atom,
    /// `application/rss+xml`
    Rss,
}

impl BlobContentType {
    /// The MIME string for this content type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
            Self::Zip => "application/zip",
            Self::Excel => "application/vnd.ms-excel",
            Self::ExcelOpenXml => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Atom => "application/atom+xml",
            Self::Rss => "application/rss+xml",
        }
    }

    /// Looks up a MIME string in this closed set.
    #[must_use]
    pub fn from_mime(value: &str) -> Option<Self> {
        match value {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            "image/svg+xml" => Some(Self::Svg),
            "application/pdf" => Some(Self::Pdf),
            "application/zip" => Some(Self::Zip),
            "application/vnd.ms-excel" => Some(Self::Excel),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::ExcelOpenXml)
            }
            "application/atom+xml" => Some(Self::Atom),
            "application/rss+xml" => Some(Self::Rss),
            _ => None,
        }
    }
}

/// Content types whose response bodies are read as raw byte buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayBufferContentType {
    /// `application/octet-stream`
    OctetStream,
    /// `audio/mpeg`
    Mpeg,
    /// `audio/ogg`
    Ogg,
    /// `audio/wav`
    Wav,
    /// `video/mp4`
    Mp4,
    /// `video/ogg`
    OggVideo,
    /// `video/webm`
    Webm,
    /// `font/woff`
    Woff,
    /// `font/woff2`
    Woff2,
    /// `application/font-woff`
    FontWoff,
    /// `application/xml`
    Xml,
    /// `application/xhtml+xml`
    Xhtml,
    /// `application/x-yaml`
    Yaml,
}

impl ArrayBufferContentType {
    /// The MIME string for this content type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OctetStream => "application/octet-stream",
            Self::Mpeg => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Wav => "audio/wav",
            Self::Mp4 => "video/mp4",
            Self::OggVideo => "video/ogg",
            Self::Webm => "video/webm",
            Self::Woff => "font/woff",
            Self::Woff2 => "font/woff2",
            Self::FontWoff => "application/font-woff",
            Self::Xml => "application/xml",
            Self::Xhtml => "application/xhtml+xml",
            Self::Yaml => "application/x-yaml",
        }
    }

    /// Looks up a MIME string in this closed set.
    #[must_use]
    pub fn from_mime(value: &str) -> Option<Self> {
        match value {
            "application/octet-stream" => Some(Self::OctetStream),
            "audio/mpeg" => Some(Self::Mpeg),
            "audio/ogg" => Some(Self::Ogg),
            "audio/wav" => Some(Self::Wav),
            "video/mp4" => Some(Self::Mp4),
            "video/ogg" => Some(Self::OggVideo),
            "video/webm" => Some(Self::Webm),
            "font/woff" => Some(Self::Woff),
            "font/woff2" => Some(Self::Woff2),
            "application/font-woff" => Some(Self::FontWoff),
            "application/xml" => Some(Self::Xml),
            "application/xhtml+xml" => Some(Self::Xhtml),
            "application/x-yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

macro_rules! display_as_mime {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_mime!(
    TextContentType,
    JsonContentType,
    FormDataContentType,
    BlobContentType,
    ArrayBufferContentType,
);

/// The five response-parsing categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Read the body as text.
    Text,
    /// Parse the body as JSON.
    Json,
    /// Decode the body as multipart form data.
    FormData,
    /// Read the body as a typed binary blob.
    Blob,
    /// Read the body as a raw byte buffer.
    ArrayBuffer,
}

impl BodyKind {
    /// The category name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::FormData => "formData",
            Self::Blob => "blob",
            Self::ArrayBuffer => "arrayBuffer",
        }
    }

    /// Classifies a MIME string into its parsing category, if recognized.
    #[must_use]
    pub fn of(value: &str) -> Option<Self> {
        if TextContentType::from_mime(value).is_some() {
            return Some(Self::Text);
        }
        if JsonContentType::from_mime(value).is_some() {
            return Some(Self::Json);
        }
        if FormDataContentType::from_mime(value).is_some() {
            return Some(Self::FormData);
        }
        if BlobContentType::from_mime(value).is_some() {
            return Some(Self::Blob);
        }
        if ArrayBufferContentType::from_mime(value).is_some() {
            return Some(Self::ArrayBuffer);
        }
        None
    }
}

/// Reads the `Content-Type` header (header names compare case-insensitively)
/// and classifies it.
///
/// Returns `None` when the header is missing, is not valid UTF-8, or is not
/// a member of any of the closed sets. Callers must treat `None` as "no body
/// to parse" rather than a failure.
#[must_use]
pub fn parse_content_type(headers: &HeaderMap) -> Option<BodyKind> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    BodyKind::of(value)
}
