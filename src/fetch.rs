//! Request orchestration: build the URL, issue one HTTP call, classify and
//! parse the response, and validate the result.

use bon::bon;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Request, header::CONTENT_TYPE};
use serde::Serialize;
use snafu::prelude::*;

use crate::{
    body::{Blob, Body},
    content_type::{
        ArrayBufferContentType, BlobContentType, BodyKind, FormDataContentType, JsonContentType,
        TextContentType, parse_content_type,
    },
    error::HttpError,
    form::{FormData, FormDataError},
    http::{HttpClient, HttpResponse},
    schema::{Schema, SchemaError},
    url_builder::UrlBuilder,
};

/// Errors from a single fetch operation.
#[derive(Debug, Snafu)]
pub enum FetchError<HttpReqErr: crate::Error + 'static, HttpRespErr: crate::Error + 'static> {
    /// The built URL was not a valid request URI.
    #[snafu(display("Built URL is not a valid request URI"))]
    Uri {
        /// The underlying URI parse error.
        source: http::uri::InvalidUri,
    },
    /// A computed header value was invalid.
    #[snafu(display("Computed header value was invalid"))]
    BadHeader {
        /// The underlying error.
        source: http::header::InvalidHeaderValue,
    },
    /// The request body could not be serialized to JSON.
    #[snafu(display("Failed to serialize request body"))]
    SerializeBody {
        /// The underlying serialization error.
        source: serde_json::Error,
    },
    /// An error occurred when making the HTTP request.
    #[snafu(display("Failed to make HTTP request"))]
    Request {
        /// The transport's request error.
        source: HttpReqErr,
    },
    /// The response carried a non-success status. Raised before any of the
    /// body is read.
    #[snafu(transparent)]
    Status {
        /// The status and status text of the failed response.
        source: HttpError,
    },
    /// There was an error when reading the response body.
    #[snafu(display("Failed to read response body"))]
    ResponseBodyRead {
        /// The transport's body error.
        source: HttpRespErr,
    },
    /// A JSON response body could not be parsed.
    #[snafu(display("Failed to parse response body as JSON"))]
    Deserialize {
        /// The underlying parse error.
        source: serde_json::Error,
    },
    /// A multipart response body could not be decoded.
    #[snafu(display("Failed to decode multipart response body"))]
    FormData {
        /// The underlying decode error.
        source: FormDataError,
    },
    /// The parsed value did not conform to the supplied schema.
    Schema {
        /// The underlying validation error.
        source: SchemaError,
    },
}

impl<HttpReqErr: crate::Error, HttpRespErr: crate::Error> crate::Error
    for FetchError<HttpReqErr, HttpRespErr>
{
    fn is_retryable(&self) -> bool {
        match self {
            Self::Request { source } => source.is_retryable(),
            Self::ResponseBodyRead { source } => source.is_retryable(),
            Self::Status { source } => source.is_retryable(),
            Self::Uri { .. }
            | Self::BadHeader { .. }
            | Self::SerializeBody { .. }
            | Self::Deserialize { .. }
            | Self::FormData { .. }
            | Self::Schema { .. } => false,
        }
    }
}

/// Stateless fetch surface: one operation per request shape.
///
/// Every operation builds the final URL from a [`UrlBuilder`], performs
/// exactly one HTTP call through the supplied [`HttpClient`], classifies
/// the response by its `Content-Type`, parses it accordingly, and hands the
/// parsed (or absent) value to the supplied [`Schema`]. Pass
/// [`crate::schema::Raw`] to receive the value unvalidated.
///
/// Extra headers given via `.headers(..)` are merged into the request
/// before the operation's own `Content-Type` is inserted, so the variant's
/// content type always wins.
pub struct Fetcher;

#[bon]
impl Fetcher {
    /// Fetches a URL with `GET`.
    ///
    /// ```ignore
    /// let user: User = Fetcher::get(&url)
    ///     .schema(&schema::Json::new())
    ///     .call(&http_client)
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    #[builder]
    pub async fn get<C: HttpClient, S: Schema>(
        #[builder(start_fn)] url_builder: &UrlBuilder,
        #[builder(finish_fn)] http_client: &C,
        schema: &S,
        headers: Option<HeaderMap>,
    ) -> Result<S::Output, FetchError<C::Error, <C::Response as HttpResponse>::Error>> {
        let request = build_request(url_builder, Method::GET, headers, None, Bytes::new())
            .context(UriSnafu)?;
        execute(http_client, request, schema).await
    }

    /// Posts a text body with one of the text content types.
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    #[builder]
    pub async fn post_text<C: HttpClient, S: Schema>(
        #[builder(start_fn)] url_builder: &UrlBuilder,
        #[builder(finish_fn)] http_client: &C,
        body: &str,
        content_type: TextContentType,
        schema: &S,
        headers: Option<HeaderMap>,
    ) -> Result<S::Output, FetchError<C::Error, <C::Response as HttpResponse>::Error>> {
        let request = build_request(
            url_builder,
            Method::POST,
            headers,
            Some(HeaderValue::from_static(content_type.as_str())),
            Bytes::copy_from_slice(body.as_bytes()),
        )
        .context(UriSnafu)?;
        execute(http_client, request, schema).await
    }

    /// Serializes `body` to JSON and posts it with one of the JSON content
    /// types.
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    #[builder]
    pub async fn post_json<C: HttpClient, S: Schema, B: Serialize + ?Sized>(
        #[builder(start_fn)] url_builder: &UrlBuilder,
        #[builder(finish_fn)] http_client: &C,
        body: &B,
        content_type: JsonContentType,
        schema: &S,
        headers: Option<HeaderMap>,
    ) -> Result<S::Output, FetchError<C::Error, <C::Response as HttpResponse>::Error>> {
        let body = serde_json::to_vec(body).context(SerializeBodySnafu)?;
        let request = build_request(
            url_builder,
            Method::POST,
            headers,
            Some(HeaderValue::from_static(content_type.as_str())),
            Bytes::from(body),
        )
        .context(UriSnafu)?;
        execute(http_client, request, schema).await
    }

    /// Encodes `body` as multipart and posts it. The `Content-Type` header
    /// carries the form's boundary parameter.
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    #[builder]
    pub async fn post_form_data<C: HttpClient, S: Schema>(
        #[builder(start_fn)] url_builder: &UrlBuilder,
        #[builder(finish_fn)] http_client: &C,
        body: &FormData,
        content_type: FormDataContentType,
        schema: &S,
        headers: Option<HeaderMap>,
    ) -> Result<S::Output, FetchError<C::Error, <C::Response as HttpResponse>::Error>> {
        let header = format!("{}; boundary={}", content_type.as_str(), body.boundary());
        let request = build_request(
            url_builder,
            Method::POST,
            headers,
            Some(HeaderValue::from_str(&header).context(BadHeaderSnafu)?),
            body.encode(),
        )
        .context(UriSnafu)?;
        execute(http_client, request, schema).await
    }

    /// Posts a binary blob with one of the blob content types.
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    #[builder]
    pub async fn post_blob<C: HttpClient, S: Schema>(
        #[builder(start_fn)] url_builder: &UrlBuilder,
        #[builder(finish_fn)] http_client: &C,
        body: &Blob,
        content_type: BlobContentType,
        schema: &S,
        headers: Option<HeaderMap>,
    ) -> Result<S::Output, FetchError<C::Error, <C::Response as HttpResponse>::Error>> {
        let request = build_request(
            url_builder,
            Method::POST,
            headers,
            Some(HeaderValue::from_static(content_type.as_str())),
            body.bytes().clone(),
        )
        .context(UriSnafu)?;
        execute(http_client, request, schema).await
    }

    /// Posts a raw byte buffer with one of the arrayBuffer content types.
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    #[builder]
    pub async fn post_array_buffer<C: HttpClient, S: Schema>(
        #[builder(start_fn)] url_builder: &UrlBuilder,
        #[builder(finish_fn)] http_client: &C,
        #[builder(into)] body: Bytes,
        content_type: ArrayBufferContentType,
        schema: &S,
        headers: Option<HeaderMap>,
    ) -> Result<S::Output, FetchError<C::Error, <C::Response as HttpResponse>::Error>> {
        let request = build_request(
            url_builder,
            Method::POST,
            headers,
            Some(HeaderValue::from_static(content_type.as_str())),
            body,
        )
        .context(UriSnafu)?;
        execute(http_client, request, schema).await
    }
}

fn build_request(
    url_builder: &UrlBuilder,
    method: Method,
    extra_headers: Option<HeaderMap>,
    content_type: Option<HeaderValue>,
    body: Bytes,
) -> Result<Request<Bytes>, http::uri::InvalidUri> {
    let uri = http::Uri::try_from(url_builder.build())?;

    let (mut parts, ()) = Request::new(()).into_parts();
    parts.method = method;
    parts.uri = uri;
    if let Some(extra) = extra_headers {
        parts.headers = extra;
    }
    // Inserted after the extra headers so the variant's content type wins.
    if let Some(content_type) = content_type {
        parts.headers.insert(CONTENT_TYPE, content_type);
    }

    Ok(Request::from_parts(parts, body))
}

async fn execute<C: HttpClient, S: Schema>(
    http_client: &C,
    request: Request<Bytes>,
    schema: &S,
) -> Result<S::Output, FetchError<C::Error, <C::Response as HttpResponse>::Error>> {
    let response = http_client.execute(request).await.context(RequestSnafu)?;

    let status = response.status();
    if !status.is_success() {
        return Err(HttpError::from_status(status).into());
    }

    let headers = response.headers();
    let Some(kind) = parse_content_type(&headers) else {
        // Missing or unrecognized content type: no body to parse.
        return schema.parse(None).context(SchemaSnafu);
    };

    let bytes = response.body().await.context(ResponseBodyReadSnafu)?;
    let body = match kind {
        BodyKind::Text => Body::Text(String::from_utf8_lossy(&bytes).into_owned()),
        BodyKind::Json => Body::Json(serde_json::from_slice(&bytes).context(DeserializeSnafu)?),
        BodyKind::FormData => {
            let boundary = multipart_boundary(&headers)
                .ok_or(FormDataError::MissingBoundary)
                .context(FormDataSnafu)?;
            Body::FormData(FormData::parse(&bytes, &boundary).context(FormDataSnafu)?)
        }
        BodyKind::Blob => match declared_content_type(&headers) {
            Some(content_type) => Body::Blob(Blob::with_content_type(bytes, content_type)),
            None => Body::Blob(Blob::new(bytes)),
        },
        BodyKind::ArrayBuffer => Body::ArrayBuffer(bytes),
    };

    schema.parse(Some(body)).context(SchemaSnafu)
}

fn declared_content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn multipart_boundary(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    value.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_owned())
    })
}
