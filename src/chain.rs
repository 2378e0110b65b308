//! Middleware chain builder.
//!
//! Chains are composed once, at route-registration time, and reused for
//! every matching request. Execution order is fixed: inherited middleware
//! (global, then each group outer-to-inner — already flattened into one list
//! by [`Router::group`](crate::Router::group)) followed by the handlers
//! supplied at registration. A link either writes a response and stops the
//! chain, or calls [`Context::invoke_next`](crate::Context::invoke_next)
//! exactly once. A link that does neither leaves the default empty 200 in
//! the sink — that is the caller's contract to uphold, not the builder's.

use std::sync::Arc;

use crate::context::Context;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::ResponseParts;

/// A composed, dispatchable route target.
#[derive(Clone)]
pub(crate) enum Route {
    /// No middleware and a single handler: bound directly, no chain walk.
    /// The handler's context has no next link.
    Direct(BoxedHandler),
    /// Ordered links; dispatch starts at index 0.
    Chain(Arc<[BoxedHandler]>),
}

/// Concatenates inherited middleware and supplied handlers into a [`Route`].
///
/// The single-handler/no-middleware case skips chain construction entirely —
/// behaviourally a one-element chain, minus the allocation.
pub(crate) fn compose(middlewares: &[BoxedHandler], mut handlers: Vec<BoxedHandler>) -> Route {
    if middlewares.is_empty() && handlers.len() == 1 {
        return Route::Direct(handlers.remove(0));
    }
    let links: Vec<BoxedHandler> = middlewares.iter().cloned().chain(handlers).collect();
    Route::Chain(links.into())
}

impl Route {
    /// Runs the chain for one matched request: builds the [`Context`] with
    /// the matcher's resolved parameters, invokes the first link, and yields
    /// whatever the links left in the response sink.
    pub(crate) async fn run(&self, request: Request, params: Vec<(String, String)>) -> ResponseParts {
        match self {
            Route::Direct(handler) => {
                let ctx = Context::new(request, params, Arc::from(Vec::new()), 0);
                let done = ctx.clone();
                handler.call(ctx).await;
                done.finish()
            }
            Route::Chain(links) => {
                // The first link executes with the cursor already past it.
                let ctx = Context::new(request, params, Arc::clone(links), 1);
                let done = ctx.clone();
                links[0].call(ctx).await;
                done.finish()
            }
        }
    }
}
