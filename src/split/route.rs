//! Shard split route: the dispatch executor.
//!
//! Wraps the downstream handle of a (possibly split) shard. Per request it
//! resolves a [`DispatchPlan`] and carries it out:
//!
//! - Passthrough: the original request goes downstream as-is.
//! - Redirect: a copy with the split key goes downstream; its reply is returned.
//! - Broadcast: every split copy is handed to the scheduler as a detached task
//!   whose reply is dropped, then the original goes to the primary and that
//!   reply is returned. Broadcast members are never awaited or retried.

use super::codec::create_split_key_at;
use super::decision::{decide, DispatchPlan, SplitTarget};
use super::lookup::{ShardSplit, SplitLookup};
use crate::core::host::HostId;
use crate::core::runtime::Scheduler;
use crate::request::{OperationClass, Request};
use crate::route::{RequestContext, RouteFuture, RouteHandle, Traverser};
use std::sync::Arc;

/// Route name used in introspection output.
pub const ROUTE_NAME: &str = "shard-split";

/// One resolved destination of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Leg<R> {
    /// The primary shard with the original request.
    Primary,
    /// A split with its rewritten copy of the request.
    Split { offset: usize, request: R },
}

impl<R> Leg<R> {
    pub(crate) fn target(&self) -> SplitTarget {
        match self {
            Self::Primary => SplitTarget::Primary,
            Self::Split { offset, .. } => SplitTarget::Split(*offset),
        }
    }
}

/// Routes requests for a shard across its splits.
pub struct ShardSplitRoute<R: Request> {
    /// Downstream handle every leg is sent to.
    pub(super) rh: Arc<dyn RouteHandle<R>>,

    /// Split table.
    pub(super) splitter: Arc<dyn SplitLookup>,

    /// Identity used to pick the split for reads.
    host_id: HostId,

    /// Runs broadcast legs.
    scheduler: Arc<dyn Scheduler>,
}

impl<R: Request> ShardSplitRoute<R> {
    /// Create a new shard split route.
    pub fn new(
        rh: Arc<dyn RouteHandle<R>>,
        splitter: Arc<dyn SplitLookup>,
        host_id: HostId,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            rh,
            splitter,
            host_id,
            scheduler,
        }
    }

    /// Get the host id this route selects read splits with.
    pub fn host_id(&self) -> HostId {
        self.host_id
    }

    /// Get the split table.
    pub fn shard_splitter(&self) -> &Arc<dyn SplitLookup> {
        &self.splitter
    }

    /// Get the downstream handle.
    pub fn downstream(&self) -> &Arc<dyn RouteHandle<R>> {
        &self.rh
    }

    /// Dispatch plan for a request.
    pub fn plan(&self, req: &R) -> DispatchPlan {
        self.resolve(req).0
    }

    /// Decide the plan and locate the shard id. The split table is not
    /// consulted for the Other class.
    fn resolve<'r>(&self, req: &'r R) -> (DispatchPlan, ShardSplit<'r>) {
        let op = req.operation();
        if op == OperationClass::Other {
            return (DispatchPlan::Passthrough, ShardSplit::unsplit());
        }

        let split = self.splitter.shard_split(req.routing_key());
        (decide(op, split.count, self.host_id), split)
    }

    /// Resolve the plan into concrete legs.
    ///
    /// Shared by routing and traversal so both always agree on targets. A
    /// split key that cannot be built (lookup reported a shard id that is not
    /// at its position in the full key) falls back to the primary for a redirect and drops the leg for a
    /// broadcast.
    pub(crate) fn legs(&self, req: &R) -> (DispatchPlan, Vec<Leg<R>>) {
        let (plan, split) = self.resolve(req);

        let legs = match plan {
            DispatchPlan::Passthrough => vec![Leg::Primary],
            DispatchPlan::Redirect { offset } => match split_request(req, offset, &split) {
                Some(request) => vec![Leg::Split { offset, request }],
                None => vec![Leg::Primary],
            },
            DispatchPlan::Broadcast { split_count } => {
                let mut legs = Vec::with_capacity(split_count);
                legs.push(Leg::Primary);
                legs.extend((0..split_count - 1).filter_map(|offset| {
                    split_request(req, offset, &split).map(|request| Leg::Split { offset, request })
                }));
                legs
            }
        };

        (plan, legs)
    }
}

/// Copy `req` with its key pointed at split `offset` of the looked-up shard.
///
/// The suffix is spliced at the shard's position in the routing key, shifted
/// by the routing key's offset in the full key. The shard text may also occur
/// in a decoration such as a `/region/cluster/` prefix.
fn split_request<R: Request>(req: &R, offset: usize, split: &ShardSplit<'_>) -> Option<R> {
    let full_key = req.full_key();
    let base = req.routing_key_offset();
    let range = split.shard_range();
    let range = base + range.start..base + range.end;

    let key = match full_key.get(range.clone()) {
        Some(found) if found == split.shard => create_split_key_at(full_key, range, offset),
        _ => None,
    };

    let Some(key) = key else {
        tracing::warn!(
            key = %String::from_utf8_lossy(full_key),
            shard = %String::from_utf8_lossy(split.shard),
            offset,
            "shard id not at its routing key position, cannot build split key"
        );
        return None;
    };

    let mut copy = req.clone();
    copy.set_key(key);
    Some(copy)
}

impl<R: Request> RouteHandle<R> for ShardSplitRoute<R> {
    fn name(&self) -> &str {
        ROUTE_NAME
    }

    fn route(&self, req: R) -> RouteFuture<'_, R::Reply> {
        let (plan, legs) = self.legs(&req);
        tracing::trace!(?plan, legs = legs.len(), "shard split dispatch");

        if let DispatchPlan::Broadcast { .. } = plan {
            for leg in legs {
                if let Leg::Split { offset, request } = leg {
                    let rh = Arc::clone(&self.rh);
                    tracing::trace!(offset, "broadcasting to split");
                    self.scheduler.spawn_detached(Box::pin(async move {
                        // Reply is discarded.
                        let _ = rh.route(request).await;
                    }));
                }
            }
            return self.rh.route(req);
        }

        match legs.into_iter().next() {
            Some(Leg::Split { request, .. }) => self.rh.route(request),
            _ => self.rh.route(req),
        }
    }

    fn traverse(&self, req: &R, ctx: Option<&RequestContext>, t: &mut dyn Traverser<R>) {
        self.traverse_splits(req, ctx, t);
    }
}

impl<R: Request> std::fmt::Debug for ShardSplitRoute<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardSplitRoute")
            .field("downstream", &self.rh.name())
            .field("splitter", &self.splitter)
            .field("host_id", &self.host_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runtime::DetachedTask;
    use crate::request::{McReply, McRequest, McResult};
    use crate::split::lookup::ShardSplitter;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Records every key it is asked to route.
    #[derive(Default)]
    struct Recorder {
        keys: Mutex<Vec<String>>,
    }

    impl RouteHandle<McRequest> for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn route(&self, req: McRequest) -> RouteFuture<'_, McReply> {
            self.keys.lock().push(req.key_str());
            Box::pin(async { McReply::new(McResult::Deleted) })
        }

        fn traverse(
            &self,
            _req: &McRequest,
            _ctx: Option<&RequestContext>,
            _t: &mut dyn Traverser<McRequest>,
        ) {
        }
    }

    /// Holds spawned tasks so tests decide when they run.
    #[derive(Default)]
    struct Deferred {
        tasks: Mutex<Vec<DetachedTask>>,
    }

    impl Scheduler for Deferred {
        fn spawn_detached(&self, task: DetachedTask) {
            self.tasks.lock().push(task);
        }
    }

    fn route(
        host: u64,
    ) -> (
        ShardSplitRoute<McRequest>,
        Arc<Recorder>,
        Arc<Deferred>,
    ) {
        let recorder = Arc::new(Recorder::default());
        let deferred = Arc::new(Deferred::default());
        let splitter =
            ShardSplitter::new(HashMap::from([("shard123".to_string(), 3)])).unwrap();
        let route = ShardSplitRoute::new(
            recorder.clone(),
            Arc::new(splitter),
            HostId::new(host),
            deferred.clone(),
        );
        (route, recorder, deferred)
    }

    #[tokio::test]
    async fn test_read_redirect_rewrites_key() {
        let (route, recorder, deferred) = route(7);

        route.route(McRequest::get("foo:shard123:bar")).await;

        assert_eq!(*recorder.keys.lock(), vec!["foo:shard123aa:bar"]);
        assert!(deferred.tasks.lock().is_empty());
    }

    #[tokio::test]
    async fn test_delete_broadcast_defers_splits() {
        let (route, recorder, deferred) = route(7);

        let reply = route.route(McRequest::delete("foo:shard123:bar")).await;
        assert_eq!(reply.result, McResult::Deleted);

        // Only the primary has been sent; splits wait on the scheduler.
        assert_eq!(*recorder.keys.lock(), vec!["foo:shard123:bar"]);
        let tasks: Vec<_> = deferred.tasks.lock().drain(..).collect();
        assert_eq!(tasks.len(), 2);

        for task in tasks {
            task.await;
        }
        assert_eq!(
            *recorder.keys.lock(),
            vec![
                "foo:shard123:bar",
                "foo:shard123aa:bar",
                "foo:shard123ab:bar"
            ]
        );
    }

    #[tokio::test]
    async fn test_split_key_ignores_shard_text_in_prefix() {
        let (route, recorder, deferred) = route(7);

        route.route(McRequest::get("/shard123/c/foo:shard123:bar")).await;
        assert_eq!(*recorder.keys.lock(), vec!["/shard123/c/foo:shard123aa:bar"]);

        route.route(McRequest::delete("/shard123/c/foo:shard123:bar")).await;
        let tasks: Vec<_> = deferred.tasks.lock().drain(..).collect();
        for task in tasks {
            task.await;
        }
        assert_eq!(
            recorder.keys.lock()[1..],
            [
                "/shard123/c/foo:shard123:bar",
                "/shard123/c/foo:shard123aa:bar",
                "/shard123/c/foo:shard123ab:bar"
            ]
        );
    }

    #[tokio::test]
    async fn test_set_skips_lookup() {
        let (route, recorder, _) = route(7);

        route.route(McRequest::set("foo:shard123:bar", "v")).await;
        assert_eq!(*recorder.keys.lock(), vec!["foo:shard123:bar"]);
    }

    #[test]
    fn test_legs_fallback_when_shard_missing() {
        #[derive(Debug)]
        struct Lying;
        impl SplitLookup for Lying {
            fn shard_split<'k>(&self, _key: &'k [u8]) -> crate::split::ShardSplit<'k> {
                crate::split::ShardSplit {
                    count: 3,
                    shard: b"999",
                    start: 4,
                }
            }
        }

        let recorder: Arc<dyn RouteHandle<McRequest>> = Arc::new(Recorder::default());
        let route = ShardSplitRoute::new(
            recorder,
            Arc::new(Lying),
            HostId::new(7),
            Arc::new(Deferred::default()),
        );

        let (plan, legs) = route.legs(&McRequest::get("foo:1:bar"));
        assert_eq!(plan, DispatchPlan::Redirect { offset: 0 });
        assert_eq!(legs, vec![Leg::Primary]);

        let (_, legs) = route.legs(&McRequest::delete("foo:1:bar"));
        assert_eq!(legs, vec![Leg::Primary]);
    }

    #[test]
    fn test_debug_and_name() {
        let (route, _, _) = route(1);
        assert_eq!(route.name(), ROUTE_NAME);
        assert!(format!("{route:?}").contains("recorder"));
    }
}
