//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The route table needs to hold handlers of *different* types in one
//! structure, so concrete handler types are hidden behind trait objects.
//! The chain from user code to vtable call:
//!
//! ```text
//! async fn ping(c: Context) { … }                ← user writes this
//!        ↓ app.get("/ping", ping)
//! ping.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(ping))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(ctx)  at request time             ← one vtable dispatch
//! ```
//!
//! Chain handlers take the [`Context`] by value (it is a cheap clone of
//! shared per-request state) and return `()` — everything they produce goes
//! into the context's response sink.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future. Boxing is what lets
/// [`Context::invoke_next`] recurse through links of arbitrary concrete types.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> BoxFuture;
}

/// A heap-allocated, type-erased chain link shared across concurrent
/// requests. `Arc` because the same link is invoked by every request that
/// matches its route.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid chain link — middleware and terminal handlers
/// share one shape.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(c: Context)
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype holding a concrete handler `F`, bridging the typed world to the
/// trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin((self.0)(ctx))
    }
}

// ── Variadic registration ─────────────────────────────────────────────────────

/// An ordered list of chain links, as accepted by the registration surface.
///
/// Implemented for a single [`Handler`], for tuples of handlers up to eight
/// links, and for `()` (the empty list — usable as a group's middleware,
/// rejected with a panic when registered as a route's handler list).
///
/// The `M` parameter is an inference marker distinguishing the
/// single-handler impl from the tuple impls; it never needs to be named.
///
/// ```rust,no_run
/// # use arbor::{App, Context};
/// # async fn authorize(c: Context) {}
/// # async fn audit(c: Context) {}
/// # async fn delete_user(c: Context) {}
/// # let app = App::new();
/// app.delete("/users/{id}", (authorize, audit, delete_user));
/// ```
pub trait IntoHandlers<M> {
    #[doc(hidden)]
    fn into_handlers(self) -> Vec<BoxedHandler>;
}

#[doc(hidden)]
pub struct ViaHandler;

#[doc(hidden)]
pub struct ViaList;

impl<H: Handler> IntoHandlers<ViaHandler> for H {
    fn into_handlers(self) -> Vec<BoxedHandler> {
        vec![self.into_boxed_handler()]
    }
}

impl IntoHandlers<ViaList> for () {
    fn into_handlers(self) -> Vec<BoxedHandler> {
        Vec::new()
    }
}

macro_rules! impl_into_handlers {
    ($($name:ident),+) => {
        impl<$($name: Handler),+> IntoHandlers<ViaList> for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_handlers(self) -> Vec<BoxedHandler> {
                let ($($name,)+) = self;
                vec![$($name.into_boxed_handler()),+]
            }
        }
    };
}

impl_into_handlers!(H1);
impl_into_handlers!(H1, H2);
impl_into_handlers!(H1, H2, H3);
impl_into_handlers!(H1, H2, H3, H4);
impl_into_handlers!(H1, H2, H3, H4, H5);
impl_into_handlers!(H1, H2, H3, H4, H5, H6);
impl_into_handlers!(H1, H2, H3, H4, H5, H6, H7);
impl_into_handlers!(H1, H2, H3, H4, H5, H6, H7, H8);
