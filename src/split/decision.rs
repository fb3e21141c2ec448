//! Split decision engine.
//!
//! Decides, from the operation class, the split count, and the host identity
//! alone, where a request goes:
//!
//! | Class  | split count | Plan                                      |
//! |--------|-------------|-------------------------------------------|
//! | any    | 1           | Passthrough                               |
//! | Other  | any         | Passthrough                               |
//! | Read   | N > 1       | `host_id % N == 0` ? Passthrough : Redirect |
//! | Delete | N > 1       | Broadcast to primary and all N-1 splits   |

use crate::core::host::HostId;
use crate::request::OperationClass;

/// One downstream destination of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitTarget {
    /// The primary shard, original key.
    Primary,
    /// Split at the given offset, rewritten key.
    Split(usize),
}

impl std::fmt::Display for SplitTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Split(offset) => write!(f, "split[{offset}]"),
        }
    }
}

/// How a request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPlan {
    /// Send the original request to the primary shard.
    Passthrough,
    /// Send a rewritten copy to exactly one split.
    Redirect {
        /// Split offset, in `[0, split_count - 2]`.
        offset: usize,
    },
    /// Send the original to the primary and a rewritten copy to every split.
    Broadcast {
        /// Total number of splits, including the primary.
        split_count: usize,
    },
}

impl DispatchPlan {
    /// Every target of this plan, primary first.
    pub fn targets(&self) -> Vec<SplitTarget> {
        match *self {
            Self::Passthrough => vec![SplitTarget::Primary],
            Self::Redirect { offset } => vec![SplitTarget::Split(offset)],
            Self::Broadcast { split_count } => std::iter::once(SplitTarget::Primary)
                .chain((0..split_count.saturating_sub(1)).map(SplitTarget::Split))
                .collect(),
        }
    }

    /// Number of downstream dispatches this plan issues.
    pub fn dispatch_count(&self) -> usize {
        match *self {
            Self::Passthrough | Self::Redirect { .. } => 1,
            Self::Broadcast { split_count } => split_count.max(1),
        }
    }

    /// Check if the original request is sent unmodified.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough)
    }
}

/// Decide the dispatch plan for one request.
pub fn decide(op: OperationClass, split_count: usize, host_id: HostId) -> DispatchPlan {
    if split_count <= 1 {
        return DispatchPlan::Passthrough;
    }

    match op {
        OperationClass::Other => DispatchPlan::Passthrough,
        OperationClass::Read => match host_id.split_index(split_count) {
            0 => DispatchPlan::Passthrough,
            index => DispatchPlan::Redirect { offset: index - 1 },
        },
        OperationClass::Delete => DispatchPlan::Broadcast { split_count },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsplit_is_passthrough() {
        for op in [
            OperationClass::Read,
            OperationClass::Delete,
            OperationClass::Other,
        ] {
            let plan = decide(op, 1, HostId::new(5));
            assert_eq!(plan, DispatchPlan::Passthrough);
            assert_eq!(plan.targets(), vec![SplitTarget::Primary]);
        }
    }

    #[test]
    fn test_other_is_passthrough() {
        assert_eq!(
            decide(OperationClass::Other, 8, HostId::new(5)),
            DispatchPlan::Passthrough
        );
    }

    #[test]
    fn test_read_redirect() {
        assert_eq!(
            decide(OperationClass::Read, 3, HostId::new(7)),
            DispatchPlan::Redirect { offset: 0 }
        );
        assert_eq!(
            decide(OperationClass::Read, 3, HostId::new(8)),
            DispatchPlan::Redirect { offset: 1 }
        );
        assert_eq!(
            decide(OperationClass::Read, 3, HostId::new(9)),
            DispatchPlan::Passthrough
        );
    }

    #[test]
    fn test_read_deterministic() {
        let host = HostId::new(123_456_789);
        let first = decide(OperationClass::Read, 5, host);
        for _ in 0..10 {
            assert_eq!(decide(OperationClass::Read, 5, host), first);
        }
    }

    #[test]
    fn test_delete_broadcast() {
        let plan = decide(OperationClass::Delete, 3, HostId::new(7));
        assert_eq!(plan, DispatchPlan::Broadcast { split_count: 3 });
        assert_eq!(
            plan.targets(),
            vec![
                SplitTarget::Primary,
                SplitTarget::Split(0),
                SplitTarget::Split(1)
            ]
        );
        assert_eq!(plan.dispatch_count(), 3);
    }

    #[test]
    fn test_target_display() {
        assert_eq!(SplitTarget::Primary.to_string(), "primary");
        assert_eq!(SplitTarget::Split(4).to_string(), "split[4]");
    }
}
