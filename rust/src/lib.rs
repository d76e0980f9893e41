//! Critical Path Method (CPM) engine.
//!
//! Given tasks with durations and named predecessors, builds a milestone
//! dependency graph, computes earliest and latest start times for every
//! milestone, and extracts the tasks with zero slack (the critical path).
//!
//! ```
//! use cpm_rust::{compute_critical_path, Task};
//!
//! let tasks = vec![
//!     Task::new("a", 3.0, Vec::<String>::new()),
//!     Task::new("b", 2.0, ["a"]),
//!     Task::new("c", 5.0, ["a"]),
//!     Task::new("d", 1.0, ["b", "c"]),
//! ];
//! assert_eq!(compute_critical_path(&tasks).unwrap(), vec!["a", "c", "d"]);
//! ```

mod config;
pub mod critical_path;
mod interner;
pub mod logging;
mod models;
#[cfg(feature = "python")]
mod python;

pub use config::{CpmConfig, DEFAULT_SLACK_EPSILON};
pub use critical_path::{
    compute_critical_path, CriticalPathError, CriticalPathResult, CriticalPathScheduler,
    DependencyGraph, GraphDefect, NodeTiming, TaskTiming,
};
pub use interner::{TaskIdInt, TaskIdInterner};
pub use models::{ScheduledTask, Task};
