//! # flotilla-scheduler-state
//!
//! In-memory per-node bookkeeping for the cluster scheduler.
//!
//! For every node in the fleet this crate tracks which tasks are
//! assigned to it, how much capacity remains after their reservations,
//! which host ports they occupy, and a sliding window of recent
//! failures per service. Placement and ranking read this state on
//! every scheduling decision; the scheduler's event loop mutates it as
//! task events arrive from the cluster state store.
//!
//! # Invariants
//!
//! - Resources are reserved exactly once when a task is first tracked
//!   and released exactly once when it is removed
//! - Active counts always equal the number of tracked tasks whose
//!   desired state is at or before running
//! - The host-port set is a derived cache of the tracked tasks'
//!   host-mode published ports
//!
//! # Concurrency
//!
//! Single writer, no internal locking. All operations are synchronous
//! in-memory bookkeeping; the caller (the scheduler's control loop)
//! provides mutual exclusion.

pub mod config;
pub mod generic_resource;
pub mod node;
pub mod node_info;
pub mod node_set;
pub mod resources;
pub mod task;

pub use config::FailureMonitorConfig;
pub use generic_resource::{ClaimError, GenericDemand, GenericResource};
pub use node::Node;
pub use node_info::{AddTaskOutcome, NodeInfo};
pub use node_set::NodeSet;
pub use resources::{ResourceSpec, Resources};
pub use task::{
    Endpoint, HostPort, PortConfig, PortProtocol, PublishMode, Task, TaskState,
};
