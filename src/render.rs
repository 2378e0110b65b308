//! Response-writing helpers on [`Context`].
//!
//! Each `write_*` call renders the whole response in one shot: status,
//! `content-type`, body. The first write wins; a chain link that writes after
//! a response is already in the buffer gets a `warn!` and is ignored
//! (double-writing is a caller contract violation, not something worth
//! failing the request over). Headers and cookies set before the body write
//! are kept.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, COOKIE, HeaderName, HeaderValue, LOCATION, SET_COOKIE};
use http::StatusCode;
use serde::Serialize;
use tracing::{error, warn};

use crate::context::Context;
use crate::response;

impl Context {
    /// `text/plain; charset=utf-8` body.
    pub fn write_string(&self, status: StatusCode, body: &str) {
        self.write(status, Some(response::text_plain()), Bytes::copy_from_slice(body.as_bytes()));
    }

    /// `text/html; charset=utf-8` body.
    pub fn write_html(&self, status: StatusCode, body: &str) {
        self.write(status, Some(response::text_html()), Bytes::copy_from_slice(body.as_bytes()));
    }

    /// Serialises `value` as compact JSON. A serialisation failure is logged
    /// and rendered as an empty 500.
    pub fn write_json<T: Serialize>(&self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.write(status, Some(response::application_json()), body.into()),
            Err(e) => self.write_json_error(e),
        }
    }

    /// Like [`write_json`](Context::write_json), pretty-printed.
    pub fn write_indented_json<T: Serialize>(&self, status: StatusCode, value: &T) {
        match serde_json::to_vec_pretty(value) {
            Ok(body) => self.write(status, Some(response::application_json()), body.into()),
            Err(e) => self.write_json_error(e),
        }
    }

    /// Raw body with an explicit `content-type`.
    pub fn write_binary(&self, status: StatusCode, content_type: &str, body: impl Into<Bytes>) {
        let content_type = HeaderValue::from_str(content_type).ok();
        self.write(status, content_type, body.into());
    }

    /// Empty body with a `location` header. Pass a 3xx status.
    pub fn redirect(&self, status: StatusCode, location: &str) {
        self.set_header_value(LOCATION, location);
        self.write(status, None, Bytes::new());
    }

    /// Sets a response header. Invalid names or values are logged and dropped.
    pub fn set_header(&self, name: &str, value: &str) -> &Self {
        match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => self.set_header_value(name, value),
            Err(_) => warn!(header = name, "invalid response header name, dropped"),
        }
        self
    }

    /// Appends a `set-cookie` header for `name=value`.
    pub fn set_cookie(&self, name: &str, value: &str) -> &Self {
        match HeaderValue::from_str(&format!("{name}={value}")) {
            Ok(cookie) => {
                self.inner.response.lock().unwrap().headers.append(SET_COOKIE, cookie);
            }
            Err(_) => warn!(cookie = name, "invalid cookie value, dropped"),
        }
        self
    }

    /// Reads a cookie from the request's `cookie` header.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let request = self.inner.request.lock().unwrap();
        let header = request.headers().get(COOKIE)?.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_owned())
        })
    }

    /// Reads a cookie, falling back to `default` when it is absent.
    pub fn cookie_or(&self, name: &str, default: &str) -> String {
        self.cookie(name).unwrap_or_else(|| default.to_owned())
    }

    /// Whether a body write has already happened for this request.
    pub fn written(&self) -> bool {
        self.inner.response.lock().unwrap().written
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn write(&self, status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) {
        let mut response = self.inner.response.lock().unwrap();
        if response.written {
            warn!(%status, "response already written, ignoring later write");
            return;
        }
        response.status = status;
        if let Some(content_type) = content_type {
            response.headers.insert(CONTENT_TYPE, content_type);
        }
        response.body = body;
        response.written = true;
    }

    fn set_header_value(&self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.inner.response.lock().unwrap().headers.insert(name, value);
            }
            Err(_) => warn!(header = %name, "invalid response header value, dropped"),
        }
    }

    fn write_json_error(&self, e: serde_json::Error) {
        error!(error = %e, "json serialisation failed");
        self.write(StatusCode::INTERNAL_SERVER_ERROR, None, Bytes::new());
    }
}
