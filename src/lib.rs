//! # arbor
//!
//! A minimal HTTP web framework: routing, middleware chains, route groups,
//! and a per-request [`Context`]. Nothing more. Nothing less.
//!
//! ## The model
//!
//! Every request is matched to a route and handed an ordered chain of
//! handlers: the app's global middleware first, then each enclosing group's
//! middleware (outer to inner), then the handlers registered on the route
//! itself. Each link receives the same per-request [`Context`] — response
//! sink, key/value store, path parameters, cookies — and either writes a
//! response or calls [`Context::invoke_next`] to pass control forward.
//!
//! Route tables are built once at startup and are read-only afterwards;
//! registration mistakes (bad path syntax, zero handlers) panic immediately
//! instead of surfacing as 404s in production. A baseline pipeline wraps
//! every request with structured logging and a recovery boundary, so a
//! panicking handler costs one 500, not the process.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use arbor::{App, Context};
//! use http::StatusCode;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = App::new();
//!
//!     app.get("/ping", |c: Context| async move {
//!         c.write_json(StatusCode::OK, &json!({ "code": "pong" }));
//!     });
//!
//!     let admin = app.group("/admin", require_auth);
//!     admin.get("/stats", |c: Context| async move {
//!         let user: String = c.must_get("user");
//!         c.write_string(StatusCode::OK, &format!("hello {user}"));
//!     });
//!
//!     app.run("0.0.0.0:3000").await.unwrap();
//! }
//!
//! async fn require_auth(c: Context) {
//!     match c.header("authorization") {
//!         Some(token) => {
//!             c.set("user", token);
//!             c.invoke_next().await;
//!         }
//!         None => c.write_string(http::StatusCode::UNAUTHORIZED, "unauthorized"),
//!     }
//! }
//! ```

mod app;
mod chain;
mod context;
mod error;
mod handler;
mod method;
mod render;
mod request;
mod response;
mod router;
mod server;
mod store;

pub use app::App;
pub use context::Context;
pub use error::Error;
pub use handler::{Handler, IntoHandlers};
#[doc(hidden)]
pub use handler::{ViaHandler, ViaList};
pub use method::Method;
pub use request::Request;
pub use router::Router;
pub use server::Server;
