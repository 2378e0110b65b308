//! Application entry point and baseline pipeline.
//!
//! [`App`] owns the root [`Router`] and wraps every request in the fixed
//! baseline pipeline before any user middleware runs:
//!
//! 1. **Logging** — one structured `tracing` line per request with method,
//!    path, status, and latency.
//! 2. **Recovery** — each request runs in its own task; a panicking chain
//!    link (including `must_get` misses and stray `invoke_next` calls) is
//!    caught at the task boundary and rendered as an empty 500. One
//!    request's failure never takes down another, or the process.
//!
//! Registration calls delegate to the root router; [`App::handle`] is the
//! per-request entry, public so tests can drive the full pipeline with
//! synthetic requests and no sockets.

use std::time::Instant;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use tracing::{error, info};

use crate::error::Error;
use crate::handler::{Handler, IntoHandlers};
use crate::response::ResponseParts;
use crate::router::Router;
use crate::server::Server;

/// The framework entry point: root router plus baseline pipeline.
#[derive(Clone)]
pub struct App {
    router: Router,
}

impl App {
    /// An app with no global middleware.
    pub fn new() -> Self {
        Self { router: Router::root(Vec::new()) }
    }

    /// An app whose global middleware runs ahead of every group and route
    /// handler, in the order given.
    pub fn with_middleware<M>(middleware: impl IntoHandlers<M>) -> Self {
        Self { router: Router::root(middleware.into_handlers()) }
    }

    // ── Registration surface (delegates to the root router) ─────────────────

    pub fn get<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.router.get(path, handlers);
    }

    pub fn head<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.router.head(path, handlers);
    }

    pub fn options<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.router.options(path, handlers);
    }

    pub fn post<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.router.post(path, handlers);
    }

    pub fn put<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.router.put(path, handlers);
    }

    pub fn patch<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.router.patch(path, handlers);
    }

    pub fn delete<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.router.delete(path, handlers);
    }

    /// See [`Router::group`].
    pub fn group<M>(&self, path: &str, middleware: impl IntoHandlers<M>) -> Router {
        self.router.group(path, middleware)
    }

    pub fn set_not_found_handle(&self, handler: impl Handler) {
        self.router.set_not_found_handle(handler);
    }

    pub fn set_method_not_allowed_handle(&self, handler: impl Handler) {
        self.router.set_method_not_allowed_handle(handler);
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Runs one request through the baseline pipeline and the matched chain.
    ///
    /// This is the seam the [`Server`] calls for every request, and the one
    /// integration tests call directly.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        // Recovery boundary: the chain runs in its own task so a panic in
        // any link is contained to this request.
        let router = self.router.clone();
        let outcome = tokio::spawn(async move { router.dispatch(req).await }).await;

        let parts = match outcome {
            Ok(parts) => parts,
            Err(e) => {
                if e.is_panic() {
                    let panic = e.into_panic();
                    let message = panic
                        .downcast_ref::<&str>()
                        .copied()
                        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                        .unwrap_or("unknown panic");
                    error!(%method, path, panic = message, "handler panicked");
                } else {
                    error!(%method, path, "handler task cancelled");
                }
                ResponseParts::status_only(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        info!(
            %method,
            path,
            status = parts.status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request",
        );

        parts.into_http()
    }

    /// Binds `addr` and serves forever (until a shutdown signal).
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub async fn run(self, addr: &str) -> Result<(), Error> {
        Server::bind(addr).serve(self).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
