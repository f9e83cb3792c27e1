//! A validated URL assembled from a base, a path template, and a query.
//!
//! [`UrlBuilder`] validates its parts eagerly at construction and is
//! immutable afterwards except for explicit [`UrlBuilder::replace_path_params`]
//! calls, which substitute `:name` placeholders in the stored path.

use std::collections::HashMap;

use bon::bon;
use snafu::prelude::*;
use url::Url;

use crate::query::QueryBuilder;

/// Errors from validating or templating a [`UrlBuilder`].
#[derive(Debug, Snafu)]
pub enum UrlBuilderError {
    /// The base URL was not a syntactically valid absolute URL.
    #[snafu(display("Invalid base URL"))]
    InvalidBaseUrl {
        /// The underlying URL parse error.
        source: url::ParseError,
    },
    /// The path did not start with `/` or contained characters outside
    /// alphanumerics, hyphens, slashes, and colons.
    #[snafu(display("Invalid path: {path}"))]
    InvalidPath {
        /// The rejected path.
        path: String,
    },
    /// The path contained a `:name` placeholder with no matching value.
    #[snafu(display("Missing value for path parameter: {name}"))]
    MissingPathParam {
        /// The placeholder name that had no value.
        name: String,
    },
}

impl crate::Error for UrlBuilderError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Validates and composes a base URL, a path with `:name` placeholders, and
/// a [`QueryBuilder`] into a final URL string.
///
/// The builder exclusively owns its `QueryBuilder` after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlBuilder {
    base_url: Url,
    path: String,
    query_builder: QueryBuilder,
}

#[bon]
impl UrlBuilder {
    /// Validates and assembles a `UrlBuilder`.
    ///
    /// The path defaults to `/` and the query to an empty [`QueryBuilder`].
    ///
    /// # Errors
    ///
    /// Fails fast with [`UrlBuilderError`] when the base URL is not an
    /// absolute URL or the path fails validation; nothing is partially
    /// constructed.
    #[builder]
    pub fn new(
        #[builder(start_fn, into)] base_url: String,
        #[builder(into)] path: Option<String>,
        query_builder: Option<QueryBuilder>,
    ) -> Result<Self, UrlBuilderError> {
        let base_url = Url::parse(&base_url).context(InvalidBaseUrlSnafu)?;
        let path = path.unwrap_or_else(|| "/".to_owned());
        ensure!(is_valid_path(&path), InvalidPathSnafu { path });
        Ok(Self {
            base_url,
            path,
            query_builder: query_builder.unwrap_or_default(),
        })
    }
}

impl UrlBuilder {
    /// The validated base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The current path, after any parameter substitution so far.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The owned query builder.
    #[must_use]
    pub fn query_builder(&self) -> &QueryBuilder {
        &self.query_builder
    }

    /// Replaces every `:name` placeholder in the path with its value from
    /// `params`, then returns `self` for chaining.
    ///
    /// The full replacement is computed before the stored path is touched,
    /// so a missing parameter leaves the builder unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`UrlBuilderError::MissingPathParam`] for the first
    /// placeholder (left to right) that has no entry in `params`.
    pub fn replace_path_params(
        &mut self,
        params: &HashMap<&str, &str>,
    ) -> Result<&mut Self, UrlBuilderError> {
        let mut replaced = String::with_capacity(self.path.len());
        let mut rest = self.path.as_str();
        while let Some(start) = rest.find(':') {
            replaced.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let name_len = after
                .find(|c: char| !is_word(c))
                .unwrap_or(after.len());
            if name_len == 0 {
                // A bare colon is not a placeholder.
                replaced.push(':');
                rest = after;
                continue;
            }
            let name = &after[..name_len];
            let value = params.get(name).context(MissingPathParamSnafu { name })?;
            replaced.push_str(value);
            rest = &after[name_len..];
        }
        replaced.push_str(rest);
        self.path = replaced;
        Ok(self)
    }

    /// Builds the canonical URL string: the base URL with its path replaced
    /// by the current path and its query replaced by the query builder's
    /// output (or cleared when that output is empty).
    ///
    /// Calling `build` repeatedly without mutation yields identical strings.
    #[must_use]
    pub fn build(&self) -> String {
        let mut url = self.base_url.clone();
        url.set_path(&self.path);
        let query = self.query_builder.build();
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        url.to_string()
    }
}

fn is_valid_path(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | ':'))
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_to_the_root_path() {
        let url = UrlBuilder::builder("https://example.com").build().unwrap();
        assert_eq!(url.path(), "/");
        assert_eq!(url.build(), "https://example.com/");
    }

    #[test]
    fn composes_path_and_query() {
        let query = QueryBuilder::new(json!({ "page": 1, "search": "hello" })).unwrap();
        let url = UrlBuilder::builder("https://example.com")
            .path("/path/to/resource")
            .query_builder(query)
            .build()
            .unwrap();
        assert_eq!(
            url.build(),
            "https://example.com/path/to/resource?page=1&search=hello"
        );
    }

    #[test]
    fn rejects_an_invalid_base_url() {
        assert!(matches!(
            UrlBuilder::builder("not a url").build(),
            Err(UrlBuilderError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn rejects_an_invalid_path() {
        for path in ["no-leading-slash", "/white space", "/query?x=1", "/percent%20"] {
            assert!(matches!(
                UrlBuilder::builder("https://example.com").path(path).build(),
                Err(UrlBuilderError::InvalidPath { .. })
            ));
        }
    }

    #[test]
    fn replaces_path_params_and_chains() {
        let mut url = UrlBuilder::builder("https://example.com")
            .path("/path/:id")
            .build()
            .unwrap();
        let built = url
            .replace_path_params(&HashMap::from([("id", "123")]))
            .unwrap()
            .build();
        assert_eq!(url.path(), "/path/123");
        assert_eq!(built, "https://example.com/path/123");
    }

    #[test]
    fn replaces_multiple_params() {
        let mut url = UrlBuilder::builder("https://example.com")
            .path("/users/:user/posts/:post")
            .build()
            .unwrap();
        url.replace_path_params(&HashMap::from([("user", "42"), ("post", "7")]))
            .unwrap();
        assert_eq!(url.path(), "/users/42/posts/7");
    }

    #[test]
    fn missing_param_fails_and_leaves_the_path_untouched() {
        let mut url = UrlBuilder::builder("https://example.com")
            .path("/path/:id")
            .build()
            .unwrap();
        let err = url.replace_path_params(&HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            UrlBuilderError::MissingPathParam { ref name } if name == "id"
        ));
        assert_eq!(url.path(), "/path/:id");
    }

    #[test]
    fn first_missing_param_aborts_atomically() {
        let mut url = UrlBuilder::builder("https://example.com")
            .path("/a/:one/b/:two")
            .build()
            .unwrap();
        // `one` resolves but `two` does not; the stored path must not change.
        let err = url
            .replace_path_params(&HashMap::from([("one", "1")]))
            .unwrap_err();
        assert!(matches!(err, UrlBuilderError::MissingPathParam { ref name } if name == "two"));
        assert_eq!(url.path(), "/a/:one/b/:two");
    }

    #[test]
    fn build_is_idempotent() {
        let query = QueryBuilder::new(json!({ "q": "x" })).unwrap();
        let url = UrlBuilder::builder("https://example.com")
            .path("/search")
            .query_builder(query)
            .build()
            .unwrap();
        assert_eq!(url.build(), url.build());
    }

    #[test]
    fn empty_query_leaves_no_question_mark() {
        let url = UrlBuilder::builder("https://example.com")
            .path("/plain")
            .build()
            .unwrap();
        assert_eq!(url.build(), "https://example.com/plain");
    }

    #[test]
    fn base_url_query_is_overwritten() {
        let url = UrlBuilder::builder("https://example.com/old?stale=1")
            .path("/fresh")
            .build()
            .unwrap();
        assert_eq!(url.build(), "https://example.com/fresh");
    }
}
