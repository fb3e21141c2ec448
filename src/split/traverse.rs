//! Traversal for the shard split route.
//!
//! Visits exactly the legs [`route`](crate::route::RouteHandle::route) would
//! send, using the same leg resolution, without sending anything.

use super::decision::SplitTarget;
use super::route::{Leg, ShardSplitRoute};
use crate::request::Request;
use crate::route::{RequestContext, Traverser};
use std::sync::Arc;

impl<R: Request> ShardSplitRoute<R> {
    /// Record the split table with `ctx` and visit every downstream leg.
    pub(super) fn traverse_splits(
        &self,
        req: &R,
        ctx: Option<&RequestContext>,
        t: &mut dyn Traverser<R>,
    ) {
        if let Some(ctx) = ctx {
            ctx.record_shard_splitter(Arc::clone(&self.splitter));
        }

        let (_, legs) = self.legs(req);
        for leg in &legs {
            match leg {
                Leg::Primary => t.visit(self.rh.as_ref(), req),
                Leg::Split { request, .. } => t.visit(self.rh.as_ref(), request),
            }
        }
    }

    /// Targets a request would be dispatched to, in dispatch order.
    pub fn targets(&self, req: &R) -> Vec<SplitTarget> {
        self.legs(req).1.iter().map(Leg::target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::HostId;
    use crate::core::runtime::{DetachedTask, Scheduler};
    use crate::request::McRequest;
    use crate::route::{collect_targets, NullRoute, RouteHandle};
    use crate::split::lookup::ShardSplitter;
    use std::collections::HashMap;

    struct NoSpawn;

    impl Scheduler for NoSpawn {
        fn spawn_detached(&self, _task: DetachedTask) {
            panic!("traversal must not dispatch");
        }
    }

    fn split_route(host: u64) -> ShardSplitRoute<McRequest> {
        let splitter = ShardSplitter::new(HashMap::from([("123".to_string(), 4)])).unwrap();
        ShardSplitRoute::new(
            Arc::new(NullRoute::new()),
            Arc::new(splitter),
            HostId::new(host),
            Arc::new(NoSpawn),
        )
    }

    fn keys(route: &ShardSplitRoute<McRequest>, req: &McRequest) -> Vec<String> {
        collect_targets(route, req, None)
            .into_iter()
            .map(|(name, visited)| {
                assert_eq!(name, "null");
                visited.key_str()
            })
            .collect()
    }

    #[test]
    fn test_traverse_read() {
        let route = split_route(6); // 6 % 4 = 2 -> offset 1
        assert_eq!(
            keys(&route, &McRequest::get("/r/c/a:123:b")),
            vec!["/r/c/a:123ab:b"]
        );
        assert_eq!(
            route.targets(&McRequest::get("a:123:b")),
            vec![SplitTarget::Split(1)]
        );
    }

    #[test]
    fn test_traverse_delete() {
        let route = split_route(6);
        assert_eq!(
            keys(&route, &McRequest::delete("a:123:b")),
            vec!["a:123:b", "a:123aa:b", "a:123ab:b", "a:123ac:b"]
        );
    }

    #[test]
    fn test_traverse_other_and_unsplit() {
        let route = split_route(6);
        assert_eq!(
            keys(&route, &McRequest::set("a:123:b", "v")),
            vec!["a:123:b"]
        );
        assert_eq!(keys(&route, &McRequest::delete("a:9:b")), vec!["a:9:b"]);
    }

    #[test]
    fn test_traverse_records_splitter() {
        let route = split_route(6);
        let ctx = RequestContext::new(1);

        // Recorded even for requests that never consult the table.
        let mut ignore = |_: &dyn RouteHandle<McRequest>, _: &McRequest| {};
        route.traverse(&McRequest::set("a:9:b", "v"), Some(&ctx), &mut ignore);

        let recorded = ctx.shard_splitters();
        assert_eq!(recorded.len(), 1);
        assert!(Arc::ptr_eq(&recorded[0], route.shard_splitter()));
    }
}
