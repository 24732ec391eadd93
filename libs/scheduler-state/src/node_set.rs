//! Collection of per-node ledgers, keyed by node ID.

use std::collections::HashMap;

use flotilla_id::NodeId;

use crate::node_info::NodeInfo;

/// The scheduler's view of the fleet: one [`NodeInfo`] per known node.
///
/// Pure container. Nodes enter when the store first reports them and
/// leave when their membership ends; placement logic lives elsewhere.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: HashMap<NodeId, NodeInfo>,
}

impl NodeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node's ledger, replacing any previous ledger for the
    /// same node ID. Returns the replaced ledger, if any.
    pub fn add_or_update(&mut self, info: NodeInfo) -> Option<NodeInfo> {
        self.nodes.insert(info.node_id().clone(), info)
    }

    /// Removes a node's ledger when the node leaves the cluster.
    pub fn remove(&mut self, node_id: &NodeId) -> Option<NodeInfo> {
        self.nodes.remove(node_id)
    }

    /// The ledger for a node.
    pub fn get(&self, node_id: &NodeId) -> Option<&NodeInfo> {
        self.nodes.get(node_id)
    }

    /// Mutable access to a node's ledger, for routing task events.
    pub fn get_mut(&mut self, node_id: &NodeId) -> Option<&mut NodeInfo> {
        self.nodes.get_mut(node_id)
    }

    /// Number of known nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no nodes are known.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All ledgers, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeInfo> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use flotilla_id::{ServiceId, TaskId};

    use super::*;
    use crate::config::FailureMonitorConfig;
    use crate::node::Node;
    use crate::resources::Resources;
    use crate::task::{Task, TaskState};

    fn info(node_id: &str) -> NodeInfo {
        let node = Node::new(NodeId::new(node_id), Resources::new(1024, 1000));
        let available = node.capacity.clone();
        NodeInfo::new(node, [], available, FailureMonitorConfig::default())
    }

    #[test]
    fn test_add_get_remove() {
        let mut set = NodeSet::new();
        assert!(set.is_empty());

        assert!(set.add_or_update(info("node-1")).is_none());
        assert!(set.add_or_update(info("node-2")).is_none());
        assert_eq!(set.len(), 2);

        assert!(set.get(&NodeId::new("node-1")).is_some());
        assert!(set.get(&NodeId::new("node-3")).is_none());

        assert!(set.remove(&NodeId::new("node-1")).is_some());
        assert!(set.remove(&NodeId::new("node-1")).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_replacing_ledger_returns_old_one() {
        let mut set = NodeSet::new();
        let mut first = info("node-1");
        let _ = first.add_task(Task::new(
            TaskId::new("task-1"),
            ServiceId::new("svc-a"),
            TaskState::Running,
        ));
        set.add_or_update(first);

        let replaced = set.add_or_update(info("node-1")).unwrap();
        assert_eq!(replaced.task_count(), 1);
        assert_eq!(set.get(&NodeId::new("node-1")).unwrap().task_count(), 0);
    }

    #[test]
    fn test_events_route_through_get_mut() {
        let mut set = NodeSet::new();
        set.add_or_update(info("node-1"));

        let ledger = set.get_mut(&NodeId::new("node-1")).unwrap();
        let outcome = ledger.add_task(Task::new(
            TaskId::new("task-1"),
            ServiceId::new("svc-a"),
            TaskState::Running,
        ));
        assert!(outcome.changed());
        assert_eq!(set.get(&NodeId::new("node-1")).unwrap().active_task_count(), 1);
    }
}
