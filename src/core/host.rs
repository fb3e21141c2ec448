//! Process-stable host identity.
//!
//! The host identity is only ever used as `host_id % split_count` to pick the
//! split a process reads from. It must stay fixed for the lifetime of the
//! process so that repeated reads for a key stay affine to one split; it does
//! not need to be unique across hosts, only reasonably uniform.

use std::hash::Hasher;
use twox_hash::XxHash64;

/// Seed used when deriving a host id from a hostname.
const HOST_ID_SEED: u64 = 0x5348_4152_4453_504c;

/// Path consulted when `HOSTNAME` is not set.
const HOSTNAME_PATH: &str = "/proc/sys/kernel/hostname";

/// Stable integer identity of this proxy process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(u64);

impl HostId {
    /// Create a host id from a raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Derive a host id from a hostname.
    ///
    /// Uses xxHash64 so the same hostname maps to the same id across restarts.
    pub fn from_hostname(hostname: &str) -> Self {
        let mut hasher = XxHash64::with_seed(HOST_ID_SEED);
        hasher.write(hostname.trim().as_bytes());
        Self(hasher.finish())
    }

    /// Detect the host id from the local hostname.
    pub fn detect() -> Self {
        let hostname = std::env::var("HOSTNAME")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .or_else(|| std::fs::read_to_string(HOSTNAME_PATH).ok())
            .unwrap_or_else(|| "localhost".to_string());

        let id = Self::from_hostname(&hostname);
        tracing::debug!(hostname = %hostname.trim(), host_id = id.0, "detected host id");
        id
    }

    /// Resolve the host id, preferring an explicitly configured value.
    pub fn resolve(configured: Option<u64>) -> Self {
        match configured {
            Some(id) => Self(id),
            None => Self::detect(),
        }
    }

    /// Pick the split index `[0, split_count)` this host reads from.
    ///
    /// Index 0 is the primary shard.
    pub fn split_index(self, split_count: usize) -> usize {
        debug_assert!(split_count > 0, "split count must be >= 1");
        (self.0 % split_count.max(1) as u64) as usize
    }
}

impl From<u64> for HostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "host-{}", self.0)
    }
}
