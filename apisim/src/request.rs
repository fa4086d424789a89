//! Request-side types: call options and the normalized per-dispatch descriptor.

use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use url::Url;

/// Options accompanying a network call, mirroring the (target, options) shape
/// of the underlying transport interface.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the `Authorization` header to `Bearer <key>`.
    ///
    /// A key that cannot be encoded as a header value is simply not set, which
    /// the router then rejects like any other missing credential.
    pub fn bearer(mut self, key: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {key}")) {
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Raw JSON body plus the matching content type header.
    pub fn json_body(self, body: impl Into<String>) -> Self {
        self.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
    }
}

/// Normalized representation of one incoming call; lives for one dispatch.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// URL path with the fixed API prefix stripped.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: Option<String>,
}

impl RequestDescriptor {
    /// Derive a descriptor from the original call arguments, stripping
    /// `path_prefix` from the URL's path component before matching.
    pub fn from_parts(url: &Url, options: &RequestOptions, path_prefix: &str) -> Self {
        let path = url.path();
        let path = path.strip_prefix(path_prefix).unwrap_or(path).to_string();

        let query = url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        let authorization = options
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self {
            method: options.method.clone(),
            path,
            query,
            authorization,
            body: options.body.clone(),
        }
    }

    /// First query parameter with the given name, if any.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
