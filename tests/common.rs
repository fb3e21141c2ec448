//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

#![allow(dead_code)]

use parking_lot::Mutex;
use shardsplit::core::config::Config;
use shardsplit::core::host::HostId;
use shardsplit::core::runtime::{DetachedTask, Scheduler};
use shardsplit::request::{McReply, McRequest, McResult};
use shardsplit::route::{RequestContext, RouteFuture, RouteHandle, Traverser};
use shardsplit::split::{ShardSplit, ShardSplitRoute, ShardSplitter, SplitLookup};
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

/// Downstream handle that records every key routed through it.
///
/// Keys are also pushed to an optional channel so tests can wait on
/// detached deliveries.
pub struct RecordingRoute {
    keys: Mutex<Vec<String>>,
    notify: Option<mpsc::UnboundedSender<String>>,
    reply: McResult,
}

impl RecordingRoute {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(Vec::new()),
            notify: None,
            reply: McResult::Deleted,
        }
    }

    /// Recorder that also reports each routed key on the returned channel.
    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let route = Self {
            notify: Some(tx),
            ..Self::new()
        };
        (route, rx)
    }

    /// Keys routed so far, in arrival order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().clone()
    }
}

impl RouteHandle<McRequest> for RecordingRoute {
    fn name(&self) -> &str {
        "recorder"
    }

    fn route(&self, req: McRequest) -> RouteFuture<'_, McReply> {
        let key = req.key_str();
        self.keys.lock().push(key.clone());
        if let Some(ref tx) = self.notify {
            let _ = tx.send(key);
        }
        let result = self.reply;
        Box::pin(async move { McReply::new(result) })
    }

    fn traverse(
        &self,
        _req: &McRequest,
        _ctx: Option<&RequestContext>,
        _t: &mut dyn Traverser<McRequest>,
    ) {
    }
}

/// Split table wrapper that counts lookups.
#[derive(Debug)]
pub struct CountingLookup {
    inner: ShardSplitter,
    calls: AtomicUsize,
}

impl CountingLookup {
    pub fn new(inner: ShardSplitter) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SplitLookup for CountingLookup {
    fn shard_split<'k>(&self, routing_key: &'k [u8]) -> ShardSplit<'k> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.shard_split(routing_key)
    }
}

/// Scheduler that parks detached tasks until the test runs them.
#[derive(Default)]
pub struct DeferredScheduler {
    tasks: Mutex<Vec<DetachedTask>>,
}

impl DeferredScheduler {
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run every parked task to completion.
    pub async fn run_all(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            task.await;
        }
    }
}

impl Scheduler for DeferredScheduler {
    fn spawn_detached(&self, task: DetachedTask) {
        self.tasks.lock().push(task);
    }
}

/// Everything a split route test needs to observe.
pub struct Harness {
    pub route: ShardSplitRoute<McRequest>,
    pub downstream: Arc<RecordingRoute>,
    pub lookup: Arc<CountingLookup>,
    pub scheduler: Arc<DeferredScheduler>,
}

/// Build a split route over a recorder with a deferred scheduler.
pub fn harness(splits: &[(&str, u64)], host_id: u64) -> Harness {
    let downstream = Arc::new(RecordingRoute::new());
    let lookup = Arc::new(CountingLookup::new(splitter(splits)));
    let scheduler = Arc::new(DeferredScheduler::default());
    let route = ShardSplitRoute::new(
        downstream.clone(),
        lookup.clone(),
        HostId::new(host_id),
        scheduler.clone(),
    );

    Harness {
        route,
        downstream,
        lookup,
        scheduler,
    }
}

/// Build a split table from `(shard, count)` pairs.
pub fn splitter(splits: &[(&str, u64)]) -> ShardSplitter {
    let table: HashMap<String, u64> = splits
        .iter()
        .map(|(shard, count)| (shard.to_string(), *count))
        .collect();
    ShardSplitter::new(table).expect("Failed to build split table")
}

/// Write `content` to a temp file.
pub fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Create a minimal valid configuration file.
pub fn create_minimal_config() -> NamedTempFile {
    write_temp(
        r#"
[splits]
host_id = 7

[splits.shards]
"shard123" = 3
"#,
    )
}

/// Load a config from a temp file.
pub fn load_config(file: &NamedTempFile) -> Config {
    Config::from_file(file.path()).expect("Failed to load config")
}
