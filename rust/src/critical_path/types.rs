//! Types for the critical path dependency graph.

use crate::models::Task;

/// Index of a node in the graph's node arena.
pub type NodeId = u32;

/// Index of an edge in the graph's edge arena (equal to the task's position).
pub type EdgeId = u32;

/// The root node is always created first.
pub const ROOT: NodeId = 0;

/// A scheduling milestone where tasks converge or diverge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Creation-order id, for diagnostics only.
    pub id: NodeId,
    /// Edges ending at this node.
    pub incoming: Vec<EdgeId>,
    /// Edges starting at this node.
    pub outgoing: Vec<EdgeId>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }
}

/// A task placed in the graph, running from `previous` to `next`.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge<'a> {
    pub task: &'a Task,
    pub previous: NodeId,
    pub next: NodeId,
}

impl Edge<'_> {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.task.duration_days
    }
}

/// Earliest and latest start of a node (from the forward and backward passes).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeTiming {
    pub earliest_start: f64,
    pub latest_start: f64,
}

/// Per-task timing derived from the node timings of its edge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskTiming {
    pub task_id: String,
    pub duration_days: f64,
    /// Earliest possible start time (from forward pass).
    pub earliest_start: f64,
    /// Earliest possible finish time (from forward pass).
    pub earliest_finish: f64,
    /// Latest allowable start time (from backward pass).
    pub latest_start: f64,
    /// Latest allowable finish time (from backward pass).
    pub latest_finish: f64,
    /// Slack = latest_finish - earliest_start - duration.
    pub slack: f64,
    /// Zero slack (within the configured epsilon).
    pub critical: bool,
}
