//! Buffered per-request response sink.
//!
//! Handlers never touch the wire. They write status, headers, and body into
//! this buffer through the [`Context`](crate::Context) render helpers; the
//! server serialises it once the chain finishes. A chain link that returns
//! without writing leaves the default `200` with an empty body.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;

/// The response being assembled for one request.
#[derive(Debug)]
pub(crate) struct ResponseParts {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    /// Set by the first body write; later writes are ignored.
    pub(crate) written: bool,
}

impl Default for ResponseParts {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            written: false,
        }
    }
}

impl ResponseParts {
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }

    /// A bare status-only response, used by the recovery boundary and for
    /// requests rejected before dispatch.
    pub(crate) fn status_only(status: StatusCode) -> Self {
        Self { status, written: true, ..Self::default() }
    }
}

// `content-type` values used by the render helpers.

pub(crate) fn text_plain() -> HeaderValue {
    HeaderValue::from_static("text/plain; charset=utf-8")
}

pub(crate) fn text_html() -> HeaderValue {
    HeaderValue::from_static("text/html; charset=utf-8")
}

pub(crate) fn application_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}
