//! Multipart form data: an ordered set of named parts with an encoding
//! boundary, plus the RFC 2046 encoder and decoder used by the `formData`
//! request and response categories.

use bytes::Bytes;
use rand::Rng as _;
use snafu::prelude::*;

const HEX: [u8; 16] = *b"0123456789abcdef";

/// Errors from decoding a multipart body.
#[derive(Debug, Snafu)]
pub enum FormDataError {
    /// The `Content-Type` header carried no `boundary` parameter, so the
    /// body cannot be split into parts.
    #[snafu(display("Multipart body has no boundary"))]
    MissingBoundary,
    /// The body ended before the closing boundary delimiter.
    #[snafu(display("Multipart body is truncated"))]
    Truncated,
    /// A part header line was not a `Name: value` pair.
    #[snafu(display("Malformed part header: {header}"))]
    MalformedPartHeader {
        /// The offending header line.
        header: String,
    },
    /// A part carried no `name` in its `Content-Disposition` header.
    #[snafu(display("Part is missing a name"))]
    MissingPartName,
}

impl crate::Error for FormDataError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// A single field of a [`FormData`] body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    value: Bytes,
}

impl Part {
    /// Creates a text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            value: Bytes::from(value.into()),
        }
    }

    /// Creates a file field with a filename, a content type, and raw bytes.
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        value: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            value: value.into(),
        }
    }

    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The filename, for file fields.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// The part's own content type, if one was declared.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The raw field value.
    #[must_use]
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// The field value as text, when it is valid UTF-8.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

/// An ordered multipart form body.
///
/// Appending preserves order; the boundary is generated at construction and
/// reused for every encode, so encoding is deterministic per instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormData {
    boundary: String,
    parts: Vec<Part>,
}

impl FormData {
    /// Creates an empty form with a freshly generated boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Creates an empty form with an explicit boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// The boundary separating parts in the encoded body.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Appends a text field.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.append_part(Part::text(name, value))
    }

    /// Appends a part.
    pub fn append_part(&mut self, part: Part) -> &mut Self {
        self.parts.push(part);
        self
    }

    /// The first part with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// All parts, in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the form has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Encodes the form as a `multipart/form-data` body.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(b"--");
            out.extend_from_slice(self.boundary.as_bytes());
            out.extend_from_slice(b"\r\nContent-Disposition: form-data; name=\"");
            out.extend_from_slice(part.name.as_bytes());
            out.extend_from_slice(b"\"");
            if let Some(filename) = &part.filename {
                out.extend_from_slice(b"; filename=\"");
                out.extend_from_slice(filename.as_bytes());
                out.extend_from_slice(b"\"");
            }
            out.extend_from_slice(b"\r\n");
            if let Some(content_type) = &part.content_type {
                out.extend_from_slice(b"Content-Type: ");
                out.extend_from_slice(content_type.as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(&part.value);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"--");
        out.extend_from_slice(self.boundary.as_bytes());
        out.extend_from_slice(b"--\r\n");
        Bytes::from(out)
    }

    /// Decodes a `multipart/form-data` body delimited by `boundary`.
    ///
    /// # Errors
    ///
    /// Returns [`FormDataError`] when the body is truncated, a part header
    /// is malformed, or a part has no name.
    pub fn parse(body: &[u8], boundary: &str) -> Result<Self, FormDataError> {
        ensure!(!boundary.is_empty(), MissingBoundarySnafu);

        let mut form = Self::with_boundary(boundary);
        let delimiter = format!("--{boundary}");

        let start = find(body, delimiter.as_bytes()).context(TruncatedSnafu)?;
        let mut rest = &body[start + delimiter.len()..];

        loop {
            if rest.starts_with(b"--") {
                break;
            }
            rest = rest.strip_prefix(b"\r\n").context(TruncatedSnafu)?;

            let header_end = find(rest, b"\r\n\r\n").context(TruncatedSnafu)?;
            let (headers, tail) = rest.split_at(header_end);
            rest = &tail[4..];

            let closing = format!("\r\n--{boundary}");
            let value_end = find(rest, closing.as_bytes()).context(TruncatedSnafu)?;
            let value = Bytes::copy_from_slice(&rest[..value_end]);
            rest = &rest[value_end + closing.len()..];

            form.append_part(parse_part(headers, value)?);
        }
        Ok(form)
    }
}

impl Default for FormData {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_part(headers: &[u8], value: Bytes) -> Result<Part, FormDataError> {
    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    let headers = String::from_utf8_lossy(headers);
    for line in headers.split("\r\n").filter(|line| !line.is_empty()) {
        let (header, rest) = line
            .split_once(':')
            .context(MalformedPartHeaderSnafu { header: line })?;
        if header.eq_ignore_ascii_case("content-disposition") {
            for param in rest.split(';').skip(1) {
                let Some((key, val)) = param.split_once('=') else {
                    continue;
                };
                let val = val.trim().trim_matches('"').to_owned();
                match key.trim() {
                    "name" => name = Some(val),
                    "filename" => filename = Some(val),
                    _ => {}
                }
            }
        } else if header.eq_ignore_ascii_case("content-type") {
            content_type = Some(rest.trim().to_owned());
        }
    }

    let name = name.context(MissingPartNameSnafu)?;
    Ok(Part {
        name,
        filename,
        content_type,
        value,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn generate_boundary() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes[..]);

    let mut boundary = String::with_capacity(16 + 32);
    boundary.push_str("----FormBoundary");
    for byte in bytes {
        boundary.push(char::from(HEX[(byte >> 4) as usize]));
        boundary.push(char::from(HEX[(byte & 0x0F) as usize]));
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_and_file_parts() {
        let mut form = FormData::with_boundary("xyz");
        form.append("field", "value")
            .append_part(Part::file("upload", "a.bin", "application/octet-stream", vec![1, 2]));

        let expected = b"--xyz\r\n\
            Content-Disposition: form-data; name=\"field\"\r\n\
            \r\n\
            value\r\n\
            --xyz\r\n\
            Content-Disposition: form-data; name=\"upload\"; filename=\"a.bin\"\r\n\
            Content-Type: application/octet-stream\r\n\
            \r\n\
            \x01\x02\r\n\
            --xyz--\r\n";
        assert_eq!(form.encode(), expected.as_slice());
    }

    #[test]
    fn parse_round_trips_encode() {
        let mut form = FormData::with_boundary("boundary42");
        form.append("a", "1")
            .append("b", "two words")
            .append_part(Part::file("f", "f.png", "image/png", vec![0x89, 0x50]));

        let decoded = FormData::parse(&form.encode(), "boundary42").unwrap();
        assert_eq!(decoded, form);
    }

    #[test]
    fn parses_a_hand_written_body() {
        let body = b"preamble is ignored\r\n\
            --b\r\n\
            content-disposition: form-data; name=\"greeting\"\r\n\
            \r\n\
            hello\r\n\
            --b--\r\n";
        let form = FormData::parse(body, "b").unwrap();
        assert_eq!(form.len(), 1);
        assert_eq!(form.get("greeting").unwrap().as_text(), Some("hello"));
    }

    #[test]
    fn part_values_may_contain_line_breaks() {
        let mut form = FormData::with_boundary("b");
        form.append("text", "line one\r\nline two");
        let decoded = FormData::parse(&form.encode(), "b").unwrap();
        assert_eq!(
            decoded.get("text").unwrap().as_text(),
            Some("line one\r\nline two")
        );
    }

    #[test]
    fn truncated_body_is_an_error() {
        let body = b"--b\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\nvalue";
        assert!(matches!(
            FormData::parse(body, "b"),
            Err(FormDataError::Truncated)
        ));
    }

    #[test]
    fn part_without_a_name_is_an_error() {
        let body = b"--b\r\nContent-Disposition: form-data\r\n\r\nvalue\r\n--b--\r\n";
        assert!(matches!(
            FormData::parse(body, "b"),
            Err(FormDataError::MissingPartName)
        ));
    }

    #[test]
    fn generated_boundaries_are_unique() {
        assert_ne!(FormData::new().boundary(), FormData::new().boundary());
    }
}
