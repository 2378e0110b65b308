//! Minimal arbor example — middleware, groups, context data, cookies.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/admin/stats                      # 401
//!   curl -H 'authorization: alice' http://localhost:3000/admin/stats
//!   curl http://localhost:3000/nope                             # custom 404

use arbor::{App, Context};
use http::StatusCode;
use serde_json::json;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Global middleware runs ahead of every route.
    let app = App::with_middleware(version("v1"));

    app.set_not_found_handle(|c: Context| async move {
        c.write_string(StatusCode::NOT_FOUND, "not found");
    });
    app.set_method_not_allowed_handle(|c: Context| async move {
        c.write_string(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    });

    app.get("/", |c: Context| async move {
        c.write_indented_json(
            StatusCode::OK,
            &json!({
                "code": "/",
                "session": c.cookie_or("session", "ss"),
            }),
        );
    });

    app.get("/users/{id}", |c: Context| async move {
        let id = c.param("id").unwrap_or("unknown").to_owned();
        c.write_json(StatusCode::OK, &json!({ "id": id, "name": "alice" }));
    });

    // Everything under /admin passes through require_auth first.
    let admin = app.group("/admin", require_auth);
    admin.get("/stats", |c: Context| async move {
        let user: String = c.must_get("user");
        c.write_json(StatusCode::OK, &json!({ "user": user, "uptime": "13d" }));
    });

    app.run("0.0.0.0:3000").await.expect("server error");
}

/// Middleware: stamp every response with a version header.
fn version(ver: &'static str) -> impl arbor::Handler {
    move |c: Context| async move {
        c.set_header("x-app-version", ver);
        c.invoke_next().await;
    }
}

/// Middleware: require an authorization header, expose the user to
/// downstream handlers via the context store.
async fn require_auth(c: Context) {
    match c.header("authorization") {
        Some(user) => {
            c.set("user", user);
            c.invoke_next().await;
        }
        None => c.write_string(StatusCode::UNAUTHORIZED, "unauthorized"),
    }
}
