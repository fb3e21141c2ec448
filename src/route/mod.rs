//! Route handle contract.
//!
//! A route handle accepts a request and produces a reply, possibly suspending
//! on network I/O while doing so. Handles form a tree; [`traverse`] walks the
//! children a request *would* be sent to without sending anything, which is
//! what route introspection is built on.
//!
//! - [`context`] - explicit per-request context for traversal bookkeeping
//! - [`null`] - leaf handle that answers without any I/O
//!
//! [`traverse`]: RouteHandle::traverse

pub mod context;
pub mod null;

use crate::request::Request;
use std::future::Future;
use std::pin::Pin;

pub use context::RequestContext;
pub use null::NullRoute;

/// Boxed future returned by [`RouteHandle::route`].
///
/// Uses the `Pin<Box<dyn Future>>` shape so handles stay dyn-compatible.
pub type RouteFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A node in the routing tree.
pub trait RouteHandle<R: Request>: Send + Sync {
    /// Short handle name for introspection.
    fn name(&self) -> &str;

    /// Route a request and return the reply.
    ///
    /// Failures are reported inside the reply, never as a panic or error.
    fn route(&self, req: R) -> RouteFuture<'_, R::Reply>;

    /// Visit every child handle `req` would be routed to.
    ///
    /// Leaf handles have no children and visit nothing; their parent visits
    /// them. Must not send anything.
    fn traverse(&self, req: &R, ctx: Option<&RequestContext>, t: &mut dyn Traverser<R>);
}

/// Visitor invoked by [`RouteHandle::traverse`].
pub trait Traverser<R: Request> {
    /// Called once per (child handle, request) pair.
    fn visit(&mut self, handle: &dyn RouteHandle<R>, req: &R);
}

impl<R, F> Traverser<R> for F
where
    R: Request,
    F: FnMut(&dyn RouteHandle<R>, &R),
{
    fn visit(&mut self, handle: &dyn RouteHandle<R>, req: &R) {
        self(handle, req)
    }
}

/// Collect the `(handle name, request)` pairs a traversal visits.
pub fn collect_targets<R: Request>(
    handle: &dyn RouteHandle<R>,
    req: &R,
    ctx: Option<&RequestContext>,
) -> Vec<(String, R)> {
    let mut targets = Vec::new();
    let mut visitor = |child: &dyn RouteHandle<R>, visited: &R| {
        targets.push((child.name().to_string(), visited.clone()));
    };
    handle.traverse(req, ctx, &mut visitor);
    targets
}
