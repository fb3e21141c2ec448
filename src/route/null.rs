//! Leaf route that answers every request locally.

use super::{RequestContext, RouteFuture, RouteHandle, Traverser};
use crate::request::{McReply, McRequest, McResult, OperationClass, Request};

/// Replies without touching any backend: misses for reads and deletes,
/// `NotStored` for everything else.
#[derive(Debug, Clone, Default)]
pub struct NullRoute;

impl NullRoute {
    /// Create a null route.
    pub fn new() -> Self {
        Self
    }

    fn reply_for(req: &McRequest) -> McReply {
        match req.operation() {
            OperationClass::Read | OperationClass::Delete => McReply::new(McResult::NotFound),
            OperationClass::Other => McReply::new(McResult::NotStored),
        }
    }
}

impl RouteHandle<McRequest> for NullRoute {
    fn name(&self) -> &str {
        "null"
    }

    fn route(&self, req: McRequest) -> RouteFuture<'_, McReply> {
        tracing::trace!(key = %req.key_str(), op = %req.mc_operation(), "null route");
        let reply = Self::reply_for(&req);
        Box::pin(async move { reply })
    }

    fn traverse(
        &self,
        _req: &McRequest,
        _ctx: Option<&RequestContext>,
        _t: &mut dyn Traverser<McRequest>,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_replies() {
        let route = NullRoute::new();

        let reply = route.route(McRequest::get("k")).await;
        assert_eq!(reply.result, McResult::NotFound);

        let reply = route.route(McRequest::delete("k")).await;
        assert_eq!(reply.result, McResult::NotFound);

        let reply = route.route(McRequest::set("k", "v")).await;
        assert_eq!(reply.result, McResult::NotStored);
    }
}
