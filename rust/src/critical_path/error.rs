//! Error types for critical path computation.

use thiserror::Error;

/// Which end of an edge was never attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    Previous,
    Next,
}

impl std::fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeEnd::Previous => write!(f, "previous"),
            EdgeEnd::Next => write!(f, "next"),
        }
    }
}

/// Structural problem found when validating a freshly built dependency graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphDefect {
    #[error("task {task:?} has no {missing} node")]
    DanglingEdge { task: String, missing: EdgeEnd },
    #[error("nodes {nodes:?} have no incoming tasks but are not the root")]
    MultipleRoots { nodes: Vec<u32> },
    /// Tasks on a cycle, or downstream of one.
    #[error("circular dependency, cannot order tasks {tasks:?}")]
    Cycle { tasks: Vec<String> },
    /// A join reused the node a task starts at as the node it ends at.
    #[error("task {task:?} starts and ends at the same node")]
    LoopedEdge { task: String },
    /// Node joins form a loop although the tasks themselves are acyclic.
    #[error("node joins form a loop, cannot order tasks {tasks:?}")]
    UnorderableNodes { tasks: Vec<String> },
}

/// Errors that abort a critical path computation.
///
/// No partial result is ever returned alongside one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriticalPathError {
    #[error("Task {task:?} depends on unknown task {predecessor:?}")]
    UnresolvedPredecessor { task: String, predecessor: String },
    #[error("Malformed dependency graph: {0}")]
    MalformedDependencyGraph(GraphDefect),
    #[error("Task {task:?} has negative slack {slack}")]
    NegativeSlack { task: String, slack: f64 },
    #[error("Duplicate task id: {task:?}")]
    DuplicateTask { task: String },
    #[error("Task {task:?} has invalid duration {duration}")]
    InvalidDuration { task: String, duration: f64 },
    #[error("Task {task:?} cannot be placed on the calendar")]
    DateOutOfRange { task: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<GraphDefect> for CriticalPathError {
    fn from(defect: GraphDefect) -> Self {
        CriticalPathError::MalformedDependencyGraph(defect)
    }
}
