//! Memcache request and reply types.
//!
//! Keys follow the proxy's wire layout:
//!
//! ```text
//! /region/cluster/prefix:shard:suffix
//! └─routing prefix┘└──── routing key ────┘
//! ```
//!
//! The optional `/region/cluster/` routing prefix only steers the request to a
//! pool; it is excluded from the routing key used for split lookups but kept
//! in the full key sent downstream.

use super::{OperationClass, Request};
use bytes::Bytes;

/// Memcache operations understood by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McOperation {
    Get,
    Gets,
    Gat,
    Gats,
    MetaGet,
    Delete,
    Set,
    Add,
    Replace,
    Append,
    Prepend,
    Cas,
    Incr,
    Decr,
    Touch,
}

impl McOperation {
    /// All operations, in protocol order.
    pub const ALL: [McOperation; 15] = [
        Self::Get,
        Self::Gets,
        Self::Gat,
        Self::Gats,
        Self::MetaGet,
        Self::Delete,
        Self::Set,
        Self::Add,
        Self::Replace,
        Self::Append,
        Self::Prepend,
        Self::Cas,
        Self::Incr,
        Self::Decr,
        Self::Touch,
    ];

    /// Split-routing class of this operation.
    pub const fn class(self) -> OperationClass {
        match self {
            Self::Get | Self::Gets | Self::Gat | Self::Gats | Self::MetaGet => {
                OperationClass::Read
            }
            Self::Delete => OperationClass::Delete,
            Self::Set
            | Self::Add
            | Self::Replace
            | Self::Append
            | Self::Prepend
            | Self::Cas
            | Self::Incr
            | Self::Decr
            | Self::Touch => OperationClass::Other,
        }
    }

    /// Protocol command name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Gets => "gets",
            Self::Gat => "gat",
            Self::Gats => "gats",
            Self::MetaGet => "mg",
            Self::Delete => "delete",
            Self::Set => "set",
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Cas => "cas",
            Self::Incr => "incr",
            Self::Decr => "decr",
            Self::Touch => "touch",
        }
    }

    /// Parse a protocol command name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl std::fmt::Display for McOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A memcache request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McRequest {
    /// Operation.
    operation: McOperation,

    /// Full wire key.
    key: Bytes,

    /// Length of the `/region/cluster/` routing prefix (0 if absent).
    routing_prefix_len: usize,

    /// Value for storage operations.
    pub value: Option<Bytes>,

    /// Client flags.
    pub flags: u32,

    /// Expiration time.
    pub exptime: u32,
}

impl McRequest {
    /// Create a new request.
    pub fn new(operation: McOperation, key: impl Into<Bytes>) -> Self {
        let key = key.into();
        Self {
            operation,
            routing_prefix_len: routing_prefix_len(&key),
            key,
            value: None,
            flags: 0,
            exptime: 0,
        }
    }

    /// Create a get request.
    pub fn get(key: impl Into<Bytes>) -> Self {
        Self::new(McOperation::Get, key)
    }

    /// Create a delete request.
    pub fn delete(key: impl Into<Bytes>) -> Self {
        Self::new(McOperation::Delete, key)
    }

    /// Create a set request.
    pub fn set(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self::new(McOperation::Set, key).with_value(value)
    }

    /// Set the value.
    pub fn with_value(mut self, value: impl Into<Bytes>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set flags.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Set expiration time.
    pub fn with_exptime(mut self, exptime: u32) -> Self {
        self.exptime = exptime;
        self
    }

    /// Get the operation.
    pub fn mc_operation(&self) -> McOperation {
        self.operation
    }

    /// Get the key.
    pub fn key(&self) -> &Bytes {
        &self.key
    }

    /// Get the `/region/cluster/` routing prefix, if any.
    pub fn routing_prefix(&self) -> &[u8] {
        &self.key[..self.routing_prefix_len]
    }

    /// Get the key as a (lossy) string.
    pub fn key_str(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }
}

impl Request for McRequest {
    type Reply = McReply;

    fn operation(&self) -> OperationClass {
        self.operation.class()
    }

    fn routing_key(&self) -> &[u8] {
        &self.key[self.routing_prefix_len..]
    }

    fn full_key(&self) -> &[u8] {
        &self.key
    }

    fn routing_key_offset(&self) -> usize {
        self.routing_prefix_len
    }

    fn set_key(&mut self, key: Bytes) {
        self.routing_prefix_len = routing_prefix_len(&key);
        self.key = key;
    }
}

/// Length of a leading `/region/cluster/` prefix, or 0 if the key has none.
fn routing_prefix_len(key: &[u8]) -> usize {
    if key.first() != Some(&b'/') {
        return 0;
    }
    let mut slashes = key
        .iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, &b)| b == b'/')
        .map(|(i, _)| i);

    match (slashes.next(), slashes.next()) {
        // Both region and cluster must be non-empty.
        (Some(region_end), Some(cluster_end)) if region_end > 1 && cluster_end > region_end + 1 => {
            cluster_end + 1
        }
        _ => 0,
    }
}

/// Result carried by a memcache reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McResult {
    Found,
    NotFound,
    Stored,
    NotStored,
    Exists,
    Deleted,
    Touched,
    /// Downstream returned an error.
    RemoteError,
    /// Downstream did not reply in time.
    Timeout,
    /// Connection to the downstream failed.
    ConnectError,
}

impl McResult {
    /// Check if this result reports a downstream failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::RemoteError | Self::Timeout | Self::ConnectError
        )
    }
}

/// A memcache reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McReply {
    /// Result code.
    pub result: McResult,

    /// Value for hits.
    pub value: Option<Bytes>,
}

impl McReply {
    /// Create a reply without a value.
    pub fn new(result: McResult) -> Self {
        Self {
            result,
            value: None,
        }
    }

    /// Create a hit carrying a value.
    pub fn found(value: impl Into<Bytes>) -> Self {
        Self {
            result: McResult::Found,
            value: Some(value.into()),
        }
    }
}
