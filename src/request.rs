//! Incoming HTTP request snapshot.
//!
//! The body is collected before dispatch, so handlers see a complete request
//! with no further I/O. `Request` is cheap to clone (`Bytes` body, header map
//! copy) — the [`Context`](crate::Context) hands out clones so that a
//! middleware-substituted request is what every downstream link observes.

use bytes::Bytes;
use http::{HeaderMap, Uri, Version};

/// An inbound HTTP request with its body fully buffered.
#[derive(Clone, Debug)]
pub struct Request {
    method: http::Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
        }
    }

    /// Builds a request from scratch — useful for substituting a rewritten
    /// request via [`Context::set_request`](crate::Context::set_request).
    pub fn new(method: http::Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self { method, uri, version: Version::HTTP_11, headers, body }
    }

    pub fn method(&self) -> &http::Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Case-insensitive header lookup; `None` for missing or non-UTF-8 values.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Looks up a query-string parameter by name.
    ///
    /// Plain `key=value` splitting on `&` — no percent-decoding. A key with
    /// no `=` yields an empty value.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.uri.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
    }
}
