//! HTTP listener loop and graceful shutdown.
//!
//! The server owns everything below the dispatch pipeline: accepting
//! connections, negotiating HTTP/1.1 or HTTP/2, buffering request bodies,
//! and draining in-flight connections on SIGTERM / Ctrl-C. Per-request
//! behaviour lives in [`App::handle`]; nothing here inspects routes.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app::App;
use crate::error::Error;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind `addr` when [`serve`](Server::serve) is
    /// called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string — a setup-time
    /// configuration error.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Accepts connections and dispatches every request through `app`.
    ///
    /// Returns only after a full graceful shutdown: a SIGTERM or Ctrl-C
    /// stops the accept loop immediately, then every in-flight connection
    /// runs to completion.
    pub async fn serve(self, app: App) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared across connection tasks; the route table inside is read-only
        // by the time we serve.
        let app = Arc::new(app);

        info!(addr = %self.addr, "arbor listening");

        // Track every connection task so shutdown can drain them.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown before the accept arm so a signal stops new
                // connections even when more are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { serve_request(app, req).await }
                        });

                        // Serves whichever of HTTP/1.1 / HTTP/2 the client
                        // negotiated.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("arbor stopped");
        Ok(())
    }
}

// ── Request adaptation ────────────────────────────────────────────────────────

/// Buffers the body and hands the request to the dispatch pipeline.
///
/// Infallible: every failure becomes a status response, so hyper never sees
/// an error from us.
async fn serve_request(
    app: Arc<App>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!("failed to read request body: {e}");
            let mut response = http::Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::BAD_REQUEST;
            return Ok(response);
        }
    };

    Ok(app.handle(http::Request::from_parts(parts, body)).await)
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal: SIGTERM or SIGINT (Ctrl-C) on
/// Unix, Ctrl-C only elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
