//! Failure-monitor configuration.

use chrono::TimeDelta;

/// Tuning for per-service failure tracking on a node.
///
/// Passed to [`NodeInfo`](crate::NodeInfo) at construction; these are
/// process-wide values owned by whoever wires up the scheduler, not by
/// the ledger itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureMonitorConfig {
    /// Failure count at which ranking is expected to down-rank the node
    /// for a service.
    pub max_failures: usize,

    /// Sliding lookback window over which failures stay relevant.
    pub window: TimeDelta,
}

impl Default for FailureMonitorConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: TimeDelta::minutes(5),
        }
    }
}
