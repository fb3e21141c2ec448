//! Inspect command implementation.

use crate::core::config::Config;
use crate::core::runtime::TokioScheduler;
use crate::request::{McOperation, McRequest, Request};
use crate::route::{collect_targets, NullRoute, RequestContext, RouteHandle};
use crate::split::ShardSplitRoute;
use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

/// Show where a request would be routed.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Memcache operation (get, gets, delete, set, ...).
    #[arg(short, long, default_value = "get")]
    pub op: String,

    /// Full request key, e.g. /region/cluster/prefix:123:suffix.
    #[arg(short, long)]
    pub key: String,

    /// Host id to select read splits with, overriding the configuration.
    #[arg(long)]
    pub host_id: Option<u64>,

    /// Also dispatch the request through a null backend and print the reply.
    #[arg(long)]
    pub dispatch: bool,
}

/// Run the inspect command.
pub async fn run_inspect(args: InspectArgs, config: &Config) -> Result<()> {
    let operation = McOperation::from_name(&args.op)
        .with_context(|| format!("unknown operation: {}", args.op))?;

    let route = ShardSplitRoute::new(
        Arc::new(NullRoute::new()),
        Arc::new(config.shard_splitter()?),
        config.host_id(),
        Arc::new(TokioScheduler::current()?),
    );

    let req = McRequest::new(operation, args.key.clone());
    let ctx = RequestContext::new(1);

    println!("Route:     {} ({})", route.name(), route.host_id());
    println!("Operation: {} ({})", operation, req.operation());
    println!("Key:       {}", args.key);
    println!("Plan:      {:?}", route.plan(&req));
    println!();

    let targets = collect_targets(&route, &req, Some(&ctx));
    let kinds = route.targets(&req);
    println!("Targets ({}):", targets.len());
    for ((handle, visited), kind) in targets.iter().zip(kinds) {
        println!("  {:<10} {:<8} {}", kind.to_string(), handle, visited.key_str());
    }

    if args.dispatch {
        let reply = route.route(req).await;
        println!();
        println!("Reply:     {:?}", reply.result);
    }

    Ok(())
}
