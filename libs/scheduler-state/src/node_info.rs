//! Per-node bookkeeping ledger read by placement and ranking.
//!
//! `NodeInfo` tracks the tasks currently assigned to one node, the
//! capacity left after their reservations, the host ports they occupy,
//! and a sliding window of recent failures per service. The scheduler's
//! control loop owns one `NodeInfo` per node, feeds it one mutation per
//! task event, and reads it while scoring candidate nodes. Nothing here
//! locks, blocks, or performs I/O.
//!
//! Accounting discipline: a task's reservations, generic-resource claim,
//! and host ports are recorded exactly once, when the task is first
//! tracked, and released exactly once, when it is removed. In-place
//! updates that do not cross the active/inactive boundary touch nothing.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use flotilla_id::{NodeId, ServiceId, TaskId};
use tracing::warn;

use crate::config::FailureMonitorConfig;
use crate::generic_resource;
use crate::node::Node;
use crate::resources::{ResourceSpec, Resources};
use crate::task::{HostPort, PortProtocol, Task};

/// Outcome of [`NodeInfo::add_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AddTaskOutcome {
    /// The task was not tracked before. Its reservations were deducted,
    /// generic resources claimed, and host ports registered.
    Tracked,

    /// A known task crossed from inactive to active desired state. The
    /// stored descriptor was replaced and active counts incremented.
    Activated,

    /// A known task crossed from active to inactive desired state. The
    /// stored descriptor was replaced and active counts decremented.
    Deactivated,

    /// A known task did not cross the running threshold. The stored
    /// descriptor was **not** replaced; callers must not assume their
    /// copy of the task is now reflected in the ledger.
    Unchanged,
}

impl AddTaskOutcome {
    /// True if the ledger was modified.
    pub fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// All mutable scheduling state for one node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    node: Node,
    tasks: HashMap<TaskId, Task>,
    active_task_count: usize,
    active_per_service: HashMap<ServiceId, usize>,
    available: Resources,
    used_host_ports: HashSet<HostPort>,

    /// Per-service failure timestamps, ascending, pruned to the
    /// configured window on the write path.
    recent_failures: HashMap<ServiceId, Vec<DateTime<Utc>>>,
    failure_monitor: FailureMonitorConfig,
}

impl NodeInfo {
    /// Creates a ledger for `node`, seeded with the tasks the store
    /// already reports for it.
    ///
    /// Each seed task is replayed through [`add_task`](Self::add_task),
    /// so post-construction state is identical to the tasks having
    /// arrived one at a time. Construction cannot fail.
    pub fn new(
        node: Node,
        seed_tasks: impl IntoIterator<Item = Task>,
        available: Resources,
        failure_monitor: FailureMonitorConfig,
    ) -> Self {
        let mut info = Self {
            node,
            tasks: HashMap::new(),
            active_task_count: 0,
            active_per_service: HashMap::new(),
            available,
            used_host_ports: HashSet::new(),
            recent_failures: HashMap::new(),
            failure_monitor,
        };

        for task in seed_tasks {
            let _ = info.add_task(task);
        }

        info
    }

    /// The node this ledger belongs to.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The node's ID.
    pub fn node_id(&self) -> &NodeId {
        &self.node.id
    }

    /// Capacity remaining after all tracked reservations.
    pub fn available_resources(&self) -> &Resources {
        &self.available
    }

    /// Number of tracked tasks whose desired state is at or before running.
    pub fn active_task_count(&self) -> usize {
        self.active_task_count
    }

    /// Active task count restricted to one service.
    pub fn active_task_count_for_service(&self, service_id: &ServiceId) -> usize {
        self.active_per_service.get(service_id).copied().unwrap_or(0)
    }

    /// The stored descriptor for a tracked task.
    ///
    /// This is the authoritative copy, including any generic-resource
    /// assignment written at tracking time.
    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// All tracked tasks, in no particular order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Number of tracked tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// True if a host-mode published port is occupied on this node.
    pub fn host_port_in_use(&self, protocol: PortProtocol, published_port: u32) -> bool {
        self.used_host_ports.contains(&HostPort {
            protocol,
            published_port,
        })
    }

    /// All occupied host ports.
    pub fn used_host_ports(&self) -> impl ExactSizeIterator<Item = &HostPort> {
        self.used_host_ports.iter()
    }

    /// Adds a task to the ledger, or updates a task already tracked
    /// under the same ID.
    ///
    /// On first sighting the task's reservations are deducted from the
    /// available pool, its generic demand is claimed (the resulting
    /// assignment is written onto the stored descriptor), and its
    /// host-mode ports are registered. On updates, only a crossing of
    /// the active/inactive boundary changes anything; see
    /// [`AddTaskOutcome`].
    pub fn add_task(&mut self, mut task: Task) -> AddTaskOutcome {
        if let Some(stored) = self.tasks.get_mut(&task.id) {
            let was_active = stored.desired_state.is_active();
            let now_active = task.desired_state.is_active();

            if now_active && !was_active {
                let service_id = task.service_id.clone();
                *stored = task;
                self.active_task_count += 1;
                *self.active_per_service.entry(service_id).or_insert(0) += 1;
                return AddTaskOutcome::Activated;
            }

            if !now_active && was_active {
                let service_id = stored.service_id.clone();
                *stored = task;
                self.active_task_count = self.active_task_count.saturating_sub(1);
                self.decrement_service_count(&service_id);
                return AddTaskOutcome::Deactivated;
            }

            return AddTaskOutcome::Unchanged;
        }

        let reservations = task_reservations(&task);
        self.available.memory_bytes -= reservations.memory_bytes;
        self.available.nano_cpus -= reservations.nano_cpus;

        match generic_resource::claim(&mut self.available.generic, &reservations.generic) {
            Ok(assignment) => task.assigned_generic_resources = assignment,
            Err(error) => {
                // Upstream constraint filtering is expected to have
                // ruled this node out before capacity ran short; track
                // the task with no assignment rather than reject it.
                warn!(
                    node_id = %self.node.id,
                    task_id = %task.id,
                    service_id = %task.service_id,
                    error = %error,
                    "generic resource claim failed, tracking task without an assignment"
                );
                task.assigned_generic_resources.clear();
            }
        }

        for port in task.host_ports() {
            self.used_host_ports.insert(port);
        }

        if task.desired_state.is_active() {
            self.active_task_count += 1;
            *self
                .active_per_service
                .entry(task.service_id.clone())
                .or_insert(0) += 1;
        }

        self.tasks.insert(task.id.clone(), task);
        AddTaskOutcome::Tracked
    }

    /// Removes a tracked task, releasing everything recorded for it.
    ///
    /// Release amounts come from the **stored** descriptor, never the
    /// caller's argument, so reserve and release always match even if
    /// the caller's snapshot has drifted. The argument contributes only
    /// the task ID. Returns false if the ID was not tracked.
    pub fn remove_task(&mut self, task: &Task) -> bool {
        let Some(stored) = self.tasks.remove(&task.id) else {
            return false;
        };

        if stored.desired_state.is_active() {
            self.active_task_count = self.active_task_count.saturating_sub(1);
            self.decrement_service_count(&stored.service_id);
        }

        let reservations = task_reservations(&stored);
        self.available.memory_bytes += reservations.memory_bytes;
        self.available.nano_cpus += reservations.nano_cpus;

        generic_resource::reclaim(
            &mut self.available.generic,
            &stored.assigned_generic_resources,
            &self.node.capacity.generic,
        );

        for port in stored.host_ports() {
            self.used_host_ports.remove(&port);
        }

        true
    }

    /// Records a failure or rejection attributable to `service_id` on
    /// this node at time `now`.
    ///
    /// The expired prefix of the service's failure history is dropped
    /// and `now` appended. When the live count reaches one below the
    /// configured maximum, a warning is emitted: the next failure will
    /// push the node past the threshold ranking applies. The warning is
    /// purely informational; excluding the node is the ranking stage's
    /// decision, made via [`count_recent_failures`](Self::count_recent_failures).
    pub fn task_failed(&mut self, now: DateTime<Utc>, service_id: &ServiceId) {
        let window = self.failure_monitor.window;
        let failures = self.recent_failures.entry(service_id.clone()).or_default();

        // Entries are ascending, so expiry is a prefix.
        let expired = failures
            .iter()
            .take_while(|ts| now.signed_duration_since(**ts) > window)
            .count();
        failures.drain(..expired);
        failures.push(now);

        let live = failures.len();
        if crosses_warning_threshold(live, self.failure_monitor.max_failures) {
            warn!(
                node_id = %self.node.id,
                service_id = %service_id,
                failure_count = live,
                window_secs = window.num_seconds(),
                max_failures = self.failure_monitor.max_failures,
                "node is about to be underweighted for service after repeated failures"
            );
        }
    }

    /// Number of failures recorded for `service_id` within the window
    /// ending at `now`. Non-mutating; the stored history is not pruned.
    pub fn count_recent_failures(&self, now: DateTime<Utc>, service_id: &ServiceId) -> usize {
        let Some(failures) = self.recent_failures.get(service_id) else {
            return 0;
        };

        let window = self.failure_monitor.window;
        failures
            .iter()
            .rev()
            .take_while(|ts| now.signed_duration_since(**ts) <= window)
            .count()
    }

    fn decrement_service_count(&mut self, service_id: &ServiceId) {
        if let Some(count) = self.active_per_service.get_mut(service_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.active_per_service.remove(service_id);
            }
        }
    }
}

/// The task's reservation, or an empty one if unspecified.
fn task_reservations(task: &Task) -> ResourceSpec {
    task.reservations.clone().unwrap_or_default()
}

/// True exactly when this failure brings the live count to one below
/// the configured maximum, i.e. the node is one more failure away from
/// being down-ranked for the service.
fn crosses_warning_threshold(live_failures: usize, max_failures: usize) -> bool {
    live_failures + 1 == max_failures
}
