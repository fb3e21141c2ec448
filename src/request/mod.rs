//! Request model consumed by the split router.
//!
//! The router only needs four things from a request: its operation class,
//! the routing key used for the split lookup, the full wire key, and the
//! ability to clone it and replace its key. Everything else about the request
//! is opaque.
//!
//! - [`memcache`] - memcache request/reply types

pub mod memcache;

use bytes::Bytes;

pub use memcache::{McOperation, McReply, McRequest, McResult};

/// Operation class of a request.
///
/// The class is a property of the request's shape (its operation), never of
/// its contents, so every request of a given operation is classified the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// Get-like operations: served by exactly one split.
    Read,
    /// Delete-like operations: broadcast to every split.
    Delete,
    /// Everything else: always sent to the primary shard.
    Other,
}

impl OperationClass {
    /// Check if this is a get-like class.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read)
    }

    /// Check if this is a delete-like class.
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }

    /// Check if requests of this class need a split lookup at all.
    pub fn consults_splits(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl std::fmt::Display for OperationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Delete => write!(f, "delete"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A routable request.
///
/// `Clone` must produce an independent copy: mutating the key of a clone must
/// never be observable through the original.
pub trait Request: Clone + Send + Sync + 'static {
    /// Reply type returned by downstream handles.
    type Reply: Send + 'static;

    /// Operation class of this request.
    fn operation(&self) -> OperationClass;

    /// Key used for the split lookup. May exclude decorations present in
    /// [`full_key`](Request::full_key).
    fn routing_key(&self) -> &[u8];

    /// Complete wire key, including the shard portion.
    fn full_key(&self) -> &[u8];

    /// Byte position of [`routing_key`](Request::routing_key) within
    /// [`full_key`](Request::full_key).
    ///
    /// The routing key is a suffix of the full key, so by default this is the
    /// length of whatever decoration precedes it.
    fn routing_key_offset(&self) -> usize {
        self.full_key().len().saturating_sub(self.routing_key().len())
    }

    /// Replace the key in place.
    fn set_key(&mut self, key: Bytes);
}
