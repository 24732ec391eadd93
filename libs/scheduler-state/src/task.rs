//! Task descriptors as observed from the cluster state store.

use flotilla_id::{ServiceId, TaskId};
use serde::{Deserialize, Serialize};

use crate::generic_resource::GenericResource;
use crate::resources::ResourceSpec;

/// Desired lifecycle state of a task.
///
/// The variants are ordered: everything up to and including `Running`
/// means the task is meant to be active on its node, everything after
/// means it has been instructed to stop or has terminated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    New,
    Pending,
    Assigned,
    Accepted,
    Preparing,
    Ready,
    Starting,
    Running,
    Complete,
    Shutdown,
    Failed,
    Rejected,
    Remove,
    Orphaned,
}

impl TaskState {
    /// True if a task with this desired state is intended to be active
    /// (not yet instructed to stop).
    pub fn is_active(self) -> bool {
        self <= TaskState::Running
    }
}

/// Transport protocol of a published port.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PortProtocol {
    Tcp,
    Udp,
    Sctp,
}

/// How a port is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    /// Published through the cluster's ingress mesh; no node-level
    /// uniqueness required.
    Ingress,

    /// Bound directly on the node's host interface; at most one task
    /// per node may hold a given (protocol, port) pair.
    Host,
}

/// One published port of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    #[serde(default)]
    pub name: String,
    pub protocol: PortProtocol,
    pub target_port: u32,
    /// Zero means "not yet allocated".
    #[serde(default)]
    pub published_port: u32,
    pub publish_mode: PublishMode,
}

/// Endpoint information carried on a task once its ports are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub ports: Vec<PortConfig>,
}

/// A (protocol, published port) pair occupied on the node's host interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPort {
    pub protocol: PortProtocol,
    pub published_port: u32,
}

/// A unit of work assigned to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub service_id: ServiceId,
    pub desired_state: TaskState,

    /// Resource reservation from the task spec, if any.
    #[serde(default)]
    pub reservations: Option<ResourceSpec>,

    /// Endpoint information, present once ports are resolved.
    #[serde(default)]
    pub endpoint: Option<Endpoint>,

    /// Concrete generic resources claimed for this task. Written by the
    /// node ledger when the task is first tracked; empty until then.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_generic_resources: Vec<GenericResource>,
}

impl Task {
    /// Creates a task with no reservations or endpoint.
    pub fn new(id: TaskId, service_id: ServiceId, desired_state: TaskState) -> Self {
        Self {
            id,
            service_id,
            desired_state,
            reservations: None,
            endpoint: None,
            assigned_generic_resources: Vec::new(),
        }
    }

    /// Host-mode published ports with nonzero port numbers.
    pub fn host_ports(&self) -> impl Iterator<Item = HostPort> + '_ {
        self.endpoint
            .iter()
            .flat_map(|ep| ep.ports.iter())
            .filter(|p| p.publish_mode == PublishMode::Host && p.published_port != 0)
            .map(|p| HostPort {
                protocol: p.protocol,
                published_port: p.published_port,
            })
    }
}
