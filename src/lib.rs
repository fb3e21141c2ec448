//! shardsplit - shard split routing for a memcache proxy.
//!
//! When a cache shard becomes overloaded it can be split into N sub-shards
//! without changing the shard id clients put in their keys. This crate is the
//! routing layer that sits in front of such a shard: for every request it
//! decides whether to pass it through, redirect it to one split, or broadcast
//! it to all splits, and rewrites keys so downstream routing lands on the
//! right physical split.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ShardSplitRoute                          │
//! │   classify → split lookup → decide → dispatch / traverse        │
//! └─────────────────────────────────────────────────────────────────┘
//!        │                 │                 │               │
//! ┌────────────┐   ┌──────────────┐   ┌────────────┐   ┌───────────┐
//! │ split      │   │ split        │   │ split      │   │ core      │
//! │ ::lookup   │   │ ::decision   │   │ ::codec    │   │ ::runtime │
//! │ shard id → │   │ class, count,│   │ key + "aa" │   │ detached  │
//! │ split count│   │ host → plan  │   │ suffix     │   │ tasks     │
//! └────────────┘   └──────────────┘   └────────────┘   └───────────┘
//!                                 │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Downstream RouteHandle                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::config`] - Configuration parsing and validation
//! - [`core::error`] - Error types
//! - [`core::host`] - Process-stable host identity
//! - [`core::runtime`] - Detached task scheduling
//!
//! ## Routing
//! - [`request`] - Request model and memcache request types
//! - [`route`] - Route handle contract, traversal, request context
//! - [`split`] - Split codec, lookup, decision engine, dispatch executor
//!
//! ## CLI
//! - [`cli::commands`] - CLI command implementations
//!
//! # Key Invariants
//!
//! - Reads for a split shard go to exactly one split, chosen by
//!   `host_id % split_count`, so a process stays affine to one split.
//! - Deletes reach the primary synchronously and every other split as a
//!   detached, unobserved task.
//! - Requests that are neither reads nor deletes never consult the split table.
//! - Traversal visits exactly the targets routing would dispatch to.

// Core infrastructure
pub mod core;

// Request model
pub mod request;

// Route handle contract
pub mod route;

// Shard splitting
pub mod split;

// CLI
pub mod cli;

// Re-exports for convenience
pub use self::core::{config, error, host, runtime};
pub use request::{McOperation, McReply, McRequest, McResult, OperationClass, Request};
pub use route::{RequestContext, RouteFuture, RouteHandle, Traverser};
pub use split::{DispatchPlan, ShardSplitRoute, ShardSplitter, SplitLookup, SplitTarget};
