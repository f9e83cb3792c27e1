use std::sync::LazyLock;

use super::{HttpClient, HttpResponse};

use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};

fn into_reqwest(
    client: &reqwest::Client,
    request: Request<Bytes>,
) -> Result<reqwest::Request, reqwest::Error> {
    let (parts, body) = request.into_parts();
    client
        .request(parts.method, parts.uri.to_string())
        .headers(parts.headers)
        .body(body)
        .build()
}

impl HttpClient for reqwest::Client {
    type Response = reqwest::Response;
    type Error = reqwest::Error;

    /// Executes an `http::Request<Bytes>` by converting it into a
    /// `reqwest::Request` and sending it through this client.
    async fn execute(&self, request: Request<Bytes>) -> Result<Self::Response, Self::Error> {
        reqwest::Client::execute(self, into_reqwest(self, request)?).await
    }
}

impl HttpClient for LazyLock<reqwest::Client> {
    type Response = reqwest::Response;
    type Error = reqwest::Error;

    /// Executes an `http::Request<Bytes>` using the lazily-initialized client.
    async fn execute(&self, request: Request<Bytes>) -> Result<Self::Response, Self::Error> {
        reqwest::Client::execute(self, into_reqwest(self, request)?).await
    }
}

impl HttpResponse for reqwest::Response {
    type Error = reqwest::Error;

    fn status(&self) -> StatusCode {
        self.status()
    }

    fn headers(&self) -> HeaderMap {
        self.headers().clone()
    }

    /// Consumes the response and reads the full body via `reqwest::Response::bytes()`.
    async fn body(self) -> Result<Bytes, Self::Error> {
        self.bytes().await
    }
}

impl crate::Error for reqwest::Error {
    fn is_retryable(&self) -> bool {
        self.is_connect()
    }
}
