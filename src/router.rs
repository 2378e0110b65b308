//! Radix-tree request router with groups and inherited middleware.
//!
//! One [`matchit`] tree per HTTP method — O(path-length) lookup, built once
//! at startup, read-only afterwards. A `Router` value is a *view* onto the
//! shared route table: [`Router::group`] returns a new view with a longer
//! path prefix and an extended middleware list, while every view registers
//! into the same trees. Middleware lists are copied on extension, so sibling
//! groups never observe each other's additions.
//!
//! Path validation happens at registration, not dispatch: a malformed
//! pattern is a configuration bug, and it should take the process down at
//! startup rather than 404 in production.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::StatusCode;
use matchit::Router as MatchitRouter;

use crate::chain::{compose, Route};
use crate::context::Context;
use crate::handler::{BoxedHandler, Handler, IntoHandlers};
use crate::method::Method;
use crate::request::Request;
use crate::response::ResponseParts;

/// A scope of the route table: a path prefix plus the middleware inherited
/// by everything registered under it.
///
/// Obtained from [`App`](crate::App) (the root scope) or [`Router::group`].
/// Cloning a `Router` clones the view, not the table.
#[derive(Clone)]
pub struct Router {
    table: Arc<Mutex<RouteTable>>,
    absolute_path: String,
    middlewares: Arc<Vec<BoxedHandler>>,
}

impl Router {
    pub(crate) fn root(middlewares: Vec<BoxedHandler>) -> Self {
        Self {
            table: Arc::new(Mutex::new(RouteTable::new())),
            absolute_path: String::new(),
            middlewares: Arc::new(middlewares),
        }
    }

    // ── Registration ─────────────────────────────────────────────────────────

    /// Registers handlers for `GET` on `path`. Panics on an invalid pattern
    /// or an empty handler list — see [`Router::group`] for path semantics.
    pub fn get<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.register(Method::Get, path, handlers.into_handlers());
    }

    pub fn head<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.register(Method::Head, path, handlers.into_handlers());
    }

    pub fn options<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.register(Method::Options, path, handlers.into_handlers());
    }

    pub fn post<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.register(Method::Post, path, handlers.into_handlers());
    }

    pub fn put<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.register(Method::Put, path, handlers.into_handlers());
    }

    pub fn patch<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.register(Method::Patch, path, handlers.into_handlers());
    }

    pub fn delete<M>(&self, path: &str, handlers: impl IntoHandlers<M>) {
        self.register(Method::Delete, path, handlers.into_handlers());
    }

    fn register(&self, method: Method, path: &str, handlers: Vec<BoxedHandler>) {
        if handlers.is_empty() {
            panic!("must register at least one handler for `{path}`");
        }
        validate_path(path);
        let route = compose(&self.middlewares, handlers);
        let absolute = format!("{}{}", self.absolute_path, path);
        self.table
            .lock()
            .unwrap()
            .trees
            .entry(method)
            .or_default()
            .insert(&absolute, route)
            .unwrap_or_else(|e| panic!("invalid route `{absolute}`: {e}"));
    }

    // ── Grouping ─────────────────────────────────────────────────────────────

    /// Returns a sub-scope rooted at this scope's prefix plus `path`, whose
    /// middleware list is this scope's list extended by `middleware`.
    ///
    /// The parent's list is copied, never mutated — creating a group has no
    /// effect on the parent or on sibling groups. Path parameters use
    /// `{name}` syntax and are read back with
    /// [`Context::param`](crate::Context::param).
    pub fn group<M>(&self, path: &str, middleware: impl IntoHandlers<M>) -> Router {
        let mut middlewares = (*self.middlewares).clone();
        middlewares.extend(middleware.into_handlers());
        Router {
            table: Arc::clone(&self.table),
            absolute_path: format!("{}{}", self.absolute_path, path),
            middlewares: Arc::new(middlewares),
        }
    }

    // ── Fallbacks ────────────────────────────────────────────────────────────

    /// Installs the handler invoked when no route matches the request path.
    pub fn set_not_found_handle(&self, handler: impl Handler) {
        self.table.lock().unwrap().not_found = handler.into_boxed_handler();
    }

    /// Installs the handler invoked when the path matches under a different
    /// method (or the method is not routable at all).
    pub fn set_method_not_allowed_handle(&self, handler: impl Handler) {
        self.table.lock().unwrap().method_not_allowed = handler.into_boxed_handler();
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Resolves one request against the table and runs the composed chain
    /// (or a fallback handler). The table lock covers only the lookup.
    pub(crate) async fn dispatch(&self, req: http::Request<Bytes>) -> ResponseParts {
        let (parts, body) = req.into_parts();
        let request = Request::from_parts(parts, body);

        let outcome = {
            let table = self.table.lock().unwrap();
            table.lookup(Method::from_http(request.method()), request.path())
        };

        match outcome {
            Lookup::Found(route, params) => route.run(request, params).await,
            Lookup::Fallback(handler) => Route::Direct(handler).run(request, Vec::new()).await,
        }
    }
}

fn validate_path(path: &str) {
    if path == "/" {
        return;
    }
    if path.is_empty() || !path.starts_with('/') || path.ends_with('/') {
        panic!("invalid path `{path}`, must begin with (not end with) /");
    }
}

// ── Route table ───────────────────────────────────────────────────────────────

pub(crate) struct RouteTable {
    trees: HashMap<Method, MatchitRouter<Route>>,
    not_found: BoxedHandler,
    method_not_allowed: BoxedHandler,
}

enum Lookup {
    Found(Route, Vec<(String, String)>),
    Fallback(BoxedHandler),
}

impl RouteTable {
    fn new() -> Self {
        Self {
            trees: HashMap::new(),
            not_found: default_not_found.into_boxed_handler(),
            method_not_allowed: default_method_not_allowed.into_boxed_handler(),
        }
    }

    fn lookup(&self, method: Option<Method>, path: &str) -> Lookup {
        let Some(method) = method else {
            return Lookup::Fallback(self.method_not_allowed.clone());
        };

        if let Some(tree) = self.trees.get(&method) {
            if let Ok(matched) = tree.at(path) {
                let params = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                return Lookup::Found(matched.value.clone(), params);
            }
        }

        // 405 only when the path exists under another method.
        let allowed_elsewhere = Method::ALL
            .into_iter()
            .filter(|m| *m != method)
            .filter_map(|m| self.trees.get(&m))
            .any(|tree| tree.at(path).is_ok());

        if allowed_elsewhere {
            Lookup::Fallback(self.method_not_allowed.clone())
        } else {
            Lookup::Fallback(self.not_found.clone())
        }
    }
}

async fn default_not_found(c: Context) {
    c.write_string(StatusCode::NOT_FOUND, "404 page not found");
}

async fn default_method_not_allowed(c: Context) {
    c.write_string(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
}
