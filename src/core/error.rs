//! Error types for split-table construction and runtime wiring.
//!
//! The routing path itself never fails: downstream failures are carried as
//! ordinary reply values and returned verbatim. Errors here only surface while
//! building a [`ShardSplitter`](crate::split::lookup::ShardSplitter) or wiring
//! the scheduler, i.e. before any request is routed.

use thiserror::Error;

/// Errors raised while building the shard-split layer.
#[derive(Debug, Error)]
pub enum SplitError {
    /// A shard was configured with zero splits.
    #[error("invalid split count for shard '{shard}': {count} (must be >= 1)")]
    InvalidSplitCount { shard: String, count: u64 },

    /// A shard id in the split table is empty or malformed.
    #[error("invalid shard id '{shard}': {reason}")]
    InvalidShardId { shard: String, reason: &'static str },

    /// The split table could not be parsed.
    #[error("invalid split config: {message}")]
    InvalidConfig { message: String },

    /// No async runtime is available to run detached broadcast tasks.
    #[error("no tokio runtime available for detached tasks")]
    NoRuntime,
}

impl SplitError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error comes from the split table contents rather than
    /// the process environment.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSplitCount { .. } | Self::InvalidShardId { .. } | Self::InvalidConfig { .. }
        )
    }
}

/// Result type using SplitError.
pub type SplitResult<T> = Result<T, SplitError>;
