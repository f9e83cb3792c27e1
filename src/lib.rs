//! Implements a typed HTTP fetch helper.

#![forbid(unsafe_code)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod body;
pub mod content_type;
mod error;
pub mod fetch;
pub mod form;
pub mod http;
pub mod platform;
pub mod prelude;
pub mod query;
pub mod schema;
mod url_builder;

pub use body::{Blob, Body};
pub use error::{BoxedError, Error, HttpError};
pub use fetch::{FetchError, Fetcher};
pub use form::FormData;
pub use query::QueryBuilder;
pub use url_builder::{UrlBuilder, UrlBuilderError};

/// Documentation
pub mod _documentation {
    #[doc = include_str!("../README.md")]
    mod readme {}
}

pub use bytes::Bytes;
