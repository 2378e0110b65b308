//! Per-request context.
//!
//! One [`Context`] exists per inbound request. It is a facade over three
//! independent pieces of per-request state — the buffered response sink, the
//! (substitutable) request snapshot, and the opaque key/value store — plus
//! the resolved path parameters and a handle on the middleware chain being
//! executed.
//!
//! `Context` is `Clone`, and every clone observes the *same* request state:
//! the copy a middleware passes forward via [`invoke_next`](Context::invoke_next)
//! is the same logical context, one link further along the chain. State cells
//! sit behind mutexes only to satisfy `Sync`; a single request's chain runs
//! strictly sequentially, so the locks are never contended and never held
//! across an await point.

use std::any::Any;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::ResponseParts;
use crate::store::Store;

pub(crate) struct ContextInner {
    pub(crate) request: Mutex<Request>,
    pub(crate) response: Mutex<ResponseParts>,
    store: Mutex<Store>,
    params: Vec<(String, String)>,
}

/// The per-request object handed to every chain link.
#[derive(Clone)]
pub struct Context {
    pub(crate) inner: Arc<ContextInner>,
    /// The full chain for this route; empty for a direct-bound handler.
    chain: Arc<[BoxedHandler]>,
    /// Index of the next link. `cursor == chain.len()` means no next.
    cursor: usize,
}

impl Context {
    pub(crate) fn new(
        request: Request,
        params: Vec<(String, String)>,
        chain: Arc<[BoxedHandler]>,
        cursor: usize,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                request: Mutex::new(request),
                response: Mutex::new(ResponseParts::default()),
                store: Mutex::new(Store::default()),
                params,
            }),
            chain,
            cursor,
        }
    }

    // ── Chain control ────────────────────────────────────────────────────────

    /// Passes control to the next link in the chain, sharing this request's
    /// state. By convention each link calls this at most once.
    ///
    /// # Panics
    ///
    /// Panics with `"invalid invoke next"` when no next link exists — a
    /// terminal handler calling this is a programming error, not a runtime
    /// condition. The baseline recovery boundary turns the panic into a 500
    /// for this request only.
    pub async fn invoke_next(&self) {
        let Some(link) = self.chain.get(self.cursor) else {
            panic!("invalid invoke next");
        };
        let next = Self {
            inner: Arc::clone(&self.inner),
            chain: Arc::clone(&self.chain),
            cursor: self.cursor + 1,
        };
        link.call(next).await;
    }

    // ── Key/value store ──────────────────────────────────────────────────────

    /// Stores `value` under `key` in the request-scoped store, silently
    /// overwriting. Returns `&self` so calls chain:
    ///
    /// ```rust,no_run
    /// # use arbor::Context;
    /// # fn f(c: &Context) {
    /// c.set("user", "alice".to_owned()).set("role", "admin".to_owned());
    /// # }
    /// ```
    pub fn set(&self, key: impl Into<String>, value: impl Any + Send + Sync) -> &Self {
        self.inner.store.lock().unwrap().set(key, value);
        self
    }

    /// Returns a clone of the value stored under `key`, or `None` if absent
    /// (or stored with a different type). Never fails.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.inner.store.lock().unwrap().get(key)
    }

    /// Like [`get`](Context::get), but panics with a "missing context key"
    /// error if the value is absent. Use for values upstream middleware
    /// guarantees are always set.
    pub fn must_get<T: Any + Clone>(&self, key: &str) -> T {
        self.inner.store.lock().unwrap().must_get(key)
    }

    // ── Path parameters ──────────────────────────────────────────────────────

    /// Returns the named path parameter resolved by route matching.
    ///
    /// For a route `/users/{id}`, `c.param("id")` on `/users/42` is `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.inner
            .params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All resolved path parameters, in pattern order.
    pub fn params(&self) -> &[(String, String)] {
        &self.inner.params
    }

    // ── Request views ────────────────────────────────────────────────────────

    /// A snapshot of the inbound request (or of whatever a middleware
    /// substituted via [`set_request`](Context::set_request)).
    pub fn request(&self) -> Request {
        self.inner.request.lock().unwrap().clone()
    }

    /// Replaces the request observed by all subsequent lookups and links.
    pub fn set_request(&self, request: Request) {
        *self.inner.request.lock().unwrap() = request;
    }

    pub fn method(&self) -> http::Method {
        self.inner.request.lock().unwrap().method().clone()
    }

    pub fn path(&self) -> String {
        self.inner.request.lock().unwrap().path().to_owned()
    }

    /// Case-insensitive request-header lookup.
    pub fn header(&self, name: &str) -> Option<String> {
        self.inner.request.lock().unwrap().header(name).map(str::to_owned)
    }

    /// Query-string parameter lookup (see [`Request::query`]).
    pub fn query(&self, name: &str) -> Option<String> {
        self.inner.request.lock().unwrap().query(name).map(str::to_owned)
    }

    /// The fully-buffered request body.
    pub fn body(&self) -> Bytes {
        self.inner.request.lock().unwrap().body().clone()
    }

    // ── Completion ───────────────────────────────────────────────────────────

    /// Extracts the assembled response once the chain has finished.
    pub(crate) fn finish(self) -> ResponseParts {
        std::mem::take(&mut *self.inner.response.lock().unwrap())
    }
}
