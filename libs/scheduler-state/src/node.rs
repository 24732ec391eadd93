//! Node descriptors as reported by the cluster.

use std::collections::BTreeMap;

use flotilla_id::NodeId;
use serde::{Deserialize, Serialize};

use crate::resources::Resources;

/// A machine in the cluster capable of running tasks.
///
/// Immutable from the ledger's point of view: identity and capacity
/// come from the cluster store, and the store replaces the whole
/// descriptor when they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    #[serde(default)]
    pub hostname: String,

    /// Operator-assigned labels, used by placement constraints.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Total capacity. The generic portion is the reclaim baseline for
    /// the generic-resource allocator.
    pub capacity: Resources,
}

impl Node {
    /// Creates a node descriptor with no hostname or labels.
    pub fn new(id: NodeId, capacity: Resources) -> Self {
        Self {
            id,
            hostname: String::new(),
            labels: BTreeMap::new(),
            capacity,
        }
    }
}
