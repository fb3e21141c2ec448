//! Split table lookup.
//!
//! Maps a routing key to the number of splits of its shard and the shard id
//! within the key. Lookups are read-only against an immutable table, so any
//! number of tasks may call them concurrently without synchronization.

use super::codec::MAX_SPLIT_OFFSETS;
use crate::core::error::{SplitError, SplitResult};
use std::collections::HashMap;
use std::ops::Range;

/// Maximum number of splits per shard: the primary plus every encodable offset.
pub const MAX_SPLITS: usize = MAX_SPLIT_OFFSETS + 1;

/// Result of a split lookup for one routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSplit<'k> {
    /// Number of splits, always >= 1. 1 means the shard is not split.
    pub count: usize,

    /// Shard id within the routing key. Empty when the key has none.
    pub shard: &'k [u8],

    /// Byte position of `shard` within the routing key.
    pub start: usize,
}

impl<'k> ShardSplit<'k> {
    /// Lookup result for a key whose shard is not split.
    pub const fn unsplit() -> Self {
        Self {
            count: 1,
            shard: &[],
            start: 0,
        }
    }

    /// Check if the shard is split.
    pub fn is_split(&self) -> bool {
        self.count > 1
    }

    /// Byte range of the shard id within the routing key.
    pub fn shard_range(&self) -> Range<usize> {
        self.start..self.start + self.shard.len()
    }
}

/// Split table lookup contract.
///
/// Implementations must be reentrant, must not block, and must return some
/// consistent snapshot of their table on every call.
pub trait SplitLookup: Send + Sync + std::fmt::Debug {
    /// Look up the split count and shard id for a routing key.
    fn shard_split<'k>(&self, routing_key: &'k [u8]) -> ShardSplit<'k>;
}

/// Extract the shard id from a routing key of the form `prefix:shard:suffix`.
///
/// The shard id is the text between the first and second `':'`. It must be
/// non-empty and end with an ASCII digit; a key whose shard already carries a
/// split suffix therefore has no shard id.
pub fn shard_id(routing_key: &[u8]) -> Option<&[u8]> {
    shard_id_range(routing_key).map(|range| &routing_key[range])
}

/// Byte range of the shard id within a routing key. See [`shard_id`].
pub fn shard_id_range(routing_key: &[u8]) -> Option<Range<usize>> {
    let start = routing_key.iter().position(|&b| b == b':')? + 1;
    let len = routing_key[start..].iter().position(|&b| b == b':')?;

    match routing_key[start..start + len].last() {
        Some(b) if b.is_ascii_digit() => Some(start..start + len),
        _ => None,
    }
}

/// Split table keyed by shard id.
#[derive(Debug, Clone, Default)]
pub struct ShardSplitter {
    /// Shard id → split count (>= 2; unsplit shards are not stored).
    splits: HashMap<Vec<u8>, usize>,
}

impl ShardSplitter {
    /// Build a split table.
    ///
    /// Counts above [`MAX_SPLITS`] are clamped. Shards configured with a
    /// single split are accepted and behave as unsplit.
    pub fn new(splits: HashMap<String, u64>) -> SplitResult<Self> {
        let mut table = HashMap::with_capacity(splits.len());

        for (shard, count) in splits {
            validate_shard_id(&shard)?;

            if count == 0 {
                return Err(SplitError::InvalidSplitCount { shard, count });
            }

            let count = if count > MAX_SPLITS as u64 {
                tracing::warn!(
                    shard = %shard,
                    count,
                    max = MAX_SPLITS,
                    "shard split count exceeds maximum, clamping"
                );
                MAX_SPLITS
            } else {
                count as usize
            };

            if count > 1 {
                table.insert(shard.into_bytes(), count);
            }
        }

        tracing::debug!(split_shards = table.len(), "built shard split table");
        Ok(Self { splits: table })
    }

    /// Build a split table from a JSON object of `{"shard": count}`.
    pub fn from_json(json: &str) -> SplitResult<Self> {
        Self::new(parse_split_table(json)?)
    }

    /// Split count for a shard id (1 if the shard is not split).
    pub fn split_count(&self, shard: &[u8]) -> usize {
        self.splits.get(shard).copied().unwrap_or(1)
    }

    /// Number of split shards.
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    /// Check if no shard is split.
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Split shards and their counts, sorted by shard id.
    pub fn splits(&self) -> Vec<(String, usize)> {
        let mut splits: Vec<_> = self
            .splits
            .iter()
            .map(|(shard, &count)| (String::from_utf8_lossy(shard).into_owned(), count))
            .collect();
        splits.sort();
        splits
    }
}

/// Parse a JSON object of `{"shard": count}` into a raw split table.
///
/// Counts are not validated here; [`ShardSplitter::new`] does that.
pub fn parse_split_table(json: &str) -> SplitResult<HashMap<String, u64>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| SplitError::invalid_config(format!("malformed JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| SplitError::invalid_config("shard splits must be a JSON object"))?;

    let mut splits = HashMap::with_capacity(object.len());
    for (shard, count) in object {
        let count = count.as_u64().ok_or_else(|| {
            SplitError::invalid_config(format!(
                "split count for shard '{shard}' must be a non-negative integer, got {count}"
            ))
        })?;
        splits.insert(shard.clone(), count);
    }

    Ok(splits)
}

impl SplitLookup for ShardSplitter {
    fn shard_split<'k>(&self, routing_key: &'k [u8]) -> ShardSplit<'k> {
        match shard_id_range(routing_key) {
            Some(range) => {
                let shard = &routing_key[range.clone()];
                ShardSplit {
                    count: self.split_count(shard),
                    shard,
                    start: range.start,
                }
            }
            None => ShardSplit::unsplit(),
        }
    }
}

fn validate_shard_id(shard: &str) -> SplitResult<()> {
    let reason = if shard.is_empty() {
        "shard id is empty"
    } else if shard.contains(':') {
        "shard id must not contain ':'"
    } else if !shard.ends_with(|c: char| c.is_ascii_digit()) {
        "shard id must end with a digit"
    } else {
        return Ok(());
    };

    Err(SplitError::InvalidShardId {
        shard: shard.to_string(),
        reason,
    })
}
