//! Runtime configuration for a [`Network`](crate::network::Network).

use serde::{Deserialize, Serialize};

/// Tunables for a network instance.
///
/// Beliefs are append-only: a retracted belief is an `out` node that
/// still occupies memory until [`Network::compact`] sweeps it. The
/// horizon below bounds how eagerly that sweep may reclaim.
///
/// All quantities are measured in *fixpoint generations* (a counter
/// bumped once per public mutating call), never in wall-clock time; the
/// kernel has no timers.
///
/// [`Network::compact`]: crate::network::Network::compact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of generations a belief must have been continuously `out`
    /// before [`Network::compact`] may discard it. Beliefs whose nodes
    /// still appear in other nodes' justifications are never discarded,
    /// regardless of age.
    ///
    /// Default: 64.
    ///
    /// [`Network::compact`]: crate::network::Network::compact
    pub compaction_horizon: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            compaction_horizon: 64,
        }
    }
}
