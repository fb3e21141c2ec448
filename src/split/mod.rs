//! Shard splitting.
//!
//! An overloaded shard can be split into N sub-shards without changing the
//! shard id clients put in their keys. Requests for a split shard go through
//! [`ShardSplitRoute`], which:
//!
//! - sends reads to the one split this host is affine to,
//! - broadcasts deletes to every split so no stale copy survives,
//! - sends everything else to the primary shard untouched.
//!
//! Modules:
//! - [`codec`] - split key suffix encoding and key rewriting
//! - [`lookup`] - split table contract and the default [`ShardSplitter`]
//! - [`decision`] - pure dispatch plan selection
//! - [`route`] - dispatch executor
//! - [`traverse`] - introspection mirror of the dispatch executor

pub mod codec;
pub mod decision;
pub mod lookup;
pub mod route;
pub mod traverse;

pub use codec::{create_split_key, create_split_key_at, shard_split_suffix};
pub use decision::{decide, DispatchPlan, SplitTarget};
pub use lookup::{ShardSplit, ShardSplitter, SplitLookup, MAX_SPLITS};
pub use route::{ShardSplitRoute, ROUTE_NAME};
