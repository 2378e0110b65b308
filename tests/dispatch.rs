//! End-to-end dispatch tests, driven through `App::handle` with synthetic
//! requests — the full baseline pipeline runs, no sockets involved.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arbor::{App, Context, Handler, Request};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use serde_json::json;

type Trail = Arc<Mutex<Vec<&'static str>>>;

fn request(method: http::Method, path: &str) -> http::Request<Bytes> {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

async fn body_string(response: http::Response<Full<Bytes>>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Middleware that records its name and passes control forward.
fn passing(trail: Trail, name: &'static str) -> impl Handler {
    move |c: Context| {
        let trail = trail.clone();
        async move {
            trail.lock().unwrap().push(name);
            c.invoke_next().await;
        }
    }
}

/// Terminal link that records its name and writes a response.
fn terminal(trail: Trail, name: &'static str) -> impl Handler {
    move |c: Context| {
        let trail = trail.clone();
        async move {
            trail.lock().unwrap().push(name);
            c.write_string(StatusCode::OK, name);
        }
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ping_returns_json() {
    let app = App::new();
    app.get("/ping", |c: Context| async move {
        c.write_json(StatusCode::OK, &json!({ "code": "pong" }));
    });

    let response = app.handle(request(http::Method::GET, "/ping")).await;
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    let (status, body) = body_string(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"code":"pong"}"#);
}

#[tokio::test]
async fn path_params_reach_the_handler() {
    let app = App::new();
    app.get("/files/{dir}/{name}", |c: Context| async move {
        assert_eq!(
            c.params().to_vec(),
            vec![
                ("dir".to_owned(), "etc".to_owned()),
                ("name".to_owned(), "hosts".to_owned()),
            ]
        );
        let name = c.param("name").unwrap().to_owned();
        c.write_string(StatusCode::OK, &name);
    });

    let (status, body) = body_string(app.handle(request(http::Method::GET, "/files/etc/hosts")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hosts");
}

#[tokio::test]
async fn missing_route_invokes_not_found_handler() {
    let app = App::new();
    app.get("/ping", |c: Context| async move {
        c.write_string(StatusCode::OK, "pong");
    });
    app.set_not_found_handle(|c: Context| async move {
        c.write_string(StatusCode::NOT_FOUND, "nothing here");
    });

    let (status, body) = body_string(app.handle(request(http::Method::GET, "/missing")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "nothing here");
}

#[tokio::test]
async fn wrong_method_on_known_path_is_method_not_allowed() {
    let app = App::new();
    app.post("/submit", |c: Context| async move {
        c.write_string(StatusCode::OK, "ok");
    });

    let response = app.handle(request(http::Method::GET, "/submit")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unroutable_method_is_method_not_allowed() {
    let app = App::new();
    app.get("/ping", |c: Context| async move {
        c.write_string(StatusCode::OK, "pong");
    });
    app.set_method_not_allowed_handle(|c: Context| async move {
        c.write_string(StatusCode::METHOD_NOT_ALLOWED, "no trace");
    });

    let (status, body) = body_string(app.handle(request(http::Method::TRACE, "/ping")).await).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, "no trace");
}

// ── Chain composition and ordering ────────────────────────────────────────────

#[tokio::test]
async fn chain_runs_global_then_group_then_route_handlers() {
    let trail: Trail = Arc::default();
    let app = App::with_middleware(passing(trail.clone(), "global"));
    let api = app.group("/api", passing(trail.clone(), "group"));
    api.get(
        "/thing",
        (passing(trail.clone(), "route-mw"), terminal(trail.clone(), "handler")),
    );

    let (status, body) = body_string(app.handle(request(http::Method::GET, "/api/thing")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "handler");
    assert_eq!(*trail.lock().unwrap(), ["global", "group", "route-mw", "handler"]);
}

#[tokio::test]
async fn nested_groups_concatenate_prefixes_and_middleware() {
    let trail: Trail = Arc::default();
    let app = App::new();
    let g1 = app.group("/a", passing(trail.clone(), "a"));
    let g2 = g1.group("/b", passing(trail.clone(), "b"));
    g2.get("/c", terminal(trail.clone(), "handler"));

    let (status, _) = body_string(app.handle(request(http::Method::GET, "/a/b/c")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(*trail.lock().unwrap(), ["a", "b", "handler"]);
}

#[tokio::test]
async fn sibling_group_middleware_does_not_leak() {
    let trail: Trail = Arc::default();
    let app = App::new();
    let g1 = app.group("/a", passing(trail.clone(), "a"));
    // Creating a deeper group must not extend g1's own list.
    let g2 = g1.group("/b", passing(trail.clone(), "b"));
    g2.get("/deep", terminal(trail.clone(), "deep"));
    g1.get("/shallow", terminal(trail.clone(), "shallow"));

    body_string(app.handle(request(http::Method::GET, "/a/shallow")).await).await;
    assert_eq!(*trail.lock().unwrap(), ["a", "shallow"]);
}

#[tokio::test]
async fn writing_link_short_circuits_the_chain() {
    let trail: Trail = Arc::default();
    let app = App::new();
    let blocker = {
        let trail = trail.clone();
        move |c: Context| {
            let trail = trail.clone();
            async move {
                trail.lock().unwrap().push("blocker");
                c.write_string(StatusCode::FORBIDDEN, "stop");
                // No invoke_next: downstream links must never run.
            }
        }
    };
    app.get(
        "/guarded",
        (passing(trail.clone(), "first"), blocker, terminal(trail.clone(), "last")),
    );

    let (status, body) = body_string(app.handle(request(http::Method::GET, "/guarded")).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "stop");
    assert_eq!(*trail.lock().unwrap(), ["first", "blocker"]);
}

// ── Context data ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn middleware_data_reaches_downstream_links() {
    let app = App::new();
    let attach = |c: Context| async move {
        c.set("user", "alice".to_owned()).set("role", "admin".to_owned());
        c.invoke_next().await;
    };
    app.get(
        "/whoami",
        (attach, |c: Context| async move {
            let user: String = c.must_get("user");
            let role = c.get::<String>("role").unwrap();
            assert_eq!(c.get::<String>("unset"), None);
            c.write_string(StatusCode::OK, &format!("{user}:{role}"));
        }),
    );

    let (status, body) = body_string(app.handle(request(http::Method::GET, "/whoami")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "alice:admin");
}

#[tokio::test]
async fn concurrent_requests_have_isolated_stores() {
    let app = App::new();
    app.get("/echo", |c: Context| async move {
        let tag = c.header("x-tag").unwrap();
        c.set("tag", tag);
        // Yield so the other request interleaves before we read back.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let tag: String = c.must_get("tag");
        c.write_string(StatusCode::OK, &tag);
    });

    let req = |tag: &str| {
        http::Request::builder()
            .method(http::Method::GET)
            .uri("/echo")
            .header("x-tag", tag)
            .body(Bytes::new())
            .unwrap()
    };

    let (one, two) = tokio::join!(app.handle(req("one")), app.handle(req("two")));
    assert_eq!(body_string(one).await.1, "one");
    assert_eq!(body_string(two).await.1, "two");
}

#[tokio::test]
async fn substituted_request_is_observed_downstream() {
    let app = App::new();
    let rewrite = |c: Context| async move {
        let original = c.request();
        let mut rewritten = Request::new(
            original.method().clone(),
            original.uri().clone(),
            original.headers().clone(),
            original.body().clone(),
        );
        rewritten
            .headers_mut()
            .insert("x-injected", "yes".parse().unwrap());
        c.set_request(rewritten);
        c.invoke_next().await;
    };
    app.get(
        "/rewritten",
        (rewrite, |c: Context| async move {
            let injected = c.header("x-injected").unwrap_or_default();
            c.write_string(StatusCode::OK, &injected);
        }),
    );

    let (_, body) = body_string(app.handle(request(http::Method::GET, "/rewritten")).await).await;
    assert_eq!(body, "yes");
}

#[tokio::test]
async fn cookies_roundtrip() {
    let app = App::new();
    app.get("/session", |c: Context| async move {
        c.set_cookie("seen", "1");
        let session = c.cookie_or("session", "fresh");
        let missing = c.cookie_or("absent", "fallback");
        c.write_string(StatusCode::OK, &format!("{session}:{missing}"));
    });

    let req = http::Request::builder()
        .method(http::Method::GET)
        .uri("/session")
        .header("cookie", "other=x; session=abc123")
        .body(Bytes::new())
        .unwrap();

    let response = app.handle(req).await;
    assert_eq!(response.headers().get("set-cookie").unwrap(), "seen=1");
    let (_, body) = body_string(response).await;
    assert_eq!(body, "abc123:fallback");
}

// ── Recovery boundary ─────────────────────────────────────────────────────────

#[tokio::test]
async fn invoke_next_on_terminal_handler_is_a_contained_500() {
    let app = App::new();
    // Single handler, no middleware: direct-bound, no next link exists.
    app.get("/broken", |c: Context| async move {
        c.invoke_next().await;
    });
    app.get("/ok", |c: Context| async move {
        c.write_string(StatusCode::OK, "still serving");
    });

    let response = app.handle(request(http::Method::GET, "/broken")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The failure is scoped to that request.
    let (status, body) = body_string(app.handle(request(http::Method::GET, "/ok")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "still serving");
}

#[tokio::test]
async fn invoke_next_past_the_last_link_is_a_contained_500() {
    let app = App::new();
    let forward = |c: Context| async move { c.invoke_next().await };
    // The terminal link forwards too — there is nothing left to invoke.
    app.get("/over-eager", (forward, forward));

    let response = app.handle(request(http::Method::GET, "/over-eager")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn must_get_miss_is_a_contained_500() {
    let app = App::new();
    app.get("/strict", |c: Context| async move {
        let _: String = c.must_get("never-set");
    });

    let response = app.handle(request(http::Method::GET, "/strict")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
