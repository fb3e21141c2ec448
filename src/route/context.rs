//! Per-request context threaded explicitly through traversal.
//!
//! Route handles that consult shared tables register them here while a
//! request is being traversed, so statistics and admin commands can later
//! report which split tables a request touched.

use crate::split::lookup::SplitLookup;
use parking_lot::Mutex;
use std::sync::Arc;

/// Request-scoped bookkeeping.
#[derive(Debug)]
pub struct RequestContext {
    /// Request identifier.
    request_id: u64,

    /// Split tables recorded during traversal, deduplicated by identity.
    shard_splitters: Mutex<Vec<Arc<dyn SplitLookup>>>,
}

impl RequestContext {
    /// Create a new request context.
    pub fn new(request_id: u64) -> Self {
        Self {
            request_id,
            shard_splitters: Mutex::new(Vec::new()),
        }
    }

    /// Get the request id.
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Record that a split table was consulted for this request.
    pub fn record_shard_splitter(&self, splitter: Arc<dyn SplitLookup>) {
        let mut recorded = self.shard_splitters.lock();
        if !recorded.iter().any(|s| Arc::ptr_eq(s, &splitter)) {
            recorded.push(splitter);
        }
    }

    /// Split tables recorded so far.
    pub fn shard_splitters(&self) -> Vec<Arc<dyn SplitLookup>> {
        self.shard_splitters.lock().clone()
    }
}
