//! Response construction: the single place that decides body encoding.

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde_json::Value;

/// A synthetic HTTP response: status, headers and an already-serialized body.
///
/// Shaped like a real response so callers can consume simulated and
/// passthrough results identically.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    /// Build a response from optional JSON data.
    ///
    /// Data is serialized as pretty-printed JSON (two-space indent); absent
    /// data yields an empty body. `Content-Type: application/json` is always
    /// present unless an entry in `extra_headers` overrides it; extras win on
    /// any conflict. Every success and error payload funnels through here so
    /// encoding stays consistent.
    pub fn build(data: Option<&Value>, status: StatusCode, extra_headers: HeaderMap) -> Self {
        let body = match data {
            // Pretty-printing an already-parsed Value cannot fail.
            Some(value) => serde_json::to_string_pretty(value).unwrap_or_default(),
            None => String::new(),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra_headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase for the status code.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Look up a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body as text; empty when the response carries no content.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Whether the content type indicates a JSON body.
    pub fn is_json(&self) -> bool {
        self.header(CONTENT_TYPE.as_str())
            .map(|value| value.contains("application/json"))
            .unwrap_or(false)
    }
}
