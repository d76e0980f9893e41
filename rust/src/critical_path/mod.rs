//! Critical Path Method engine.
//!
//! Tasks are turned into the edges of a milestone graph, a forward pass
//! computes the earliest start of every milestone, a backward pass from the
//! project end computes the latest start, and tasks whose slack is zero form
//! the critical path.

mod calculation;
mod error;
mod graph;
mod scheduler;
mod types;

pub use calculation::{
    backward_pass, calculate_node_timings, calculate_task_timings, critical_tasks, forward_pass,
};
pub use error::{CriticalPathError, EdgeEnd, GraphDefect};
pub use graph::DependencyGraph;
pub use scheduler::{compute_critical_path, CriticalPathResult, CriticalPathScheduler};
pub use types::{Edge, EdgeId, Node, NodeId, NodeTiming, TaskTiming, ROOT};
