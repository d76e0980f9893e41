//! Critical path scheduler: graph construction, both passes and extraction.

use chrono::{Days, NaiveDate};

use crate::config::CpmConfig;
use crate::log_changes;
use crate::models::{ScheduledTask, Task};

use super::calculation::{calculate_node_timings, calculate_task_timings, critical_tasks};
use super::error::CriticalPathError;
use super::graph::DependencyGraph;
use super::types::{NodeTiming, TaskTiming};

/// Result of a critical path computation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriticalPathResult {
    /// Zero-slack task ids, in task order.
    pub critical_path: Vec<String>,
    /// Timing for every task, in task order.
    pub task_timings: Vec<TaskTiming>,
    /// Earliest/latest start of every milestone node, indexed by node id.
    pub node_timings: Vec<NodeTiming>,
    /// Earliest start of the sink, i.e. the minimum project duration.
    pub project_length: f64,
}

impl CriticalPathResult {
    pub fn timing(&self, task_id: &str) -> Option<&TaskTiming> {
        self.task_timings.iter().find(|t| t.task_id == task_id)
    }

    pub fn is_critical(&self, task_id: &str) -> bool {
        self.timing(task_id).is_some_and(|t| t.critical)
    }

    /// Place every task on the calendar at its earliest start.
    ///
    /// Offsets are plain day counts from `project_start`; fractional days
    /// round up to whole days.
    pub fn scheduled_tasks(
        &self,
        project_start: NaiveDate,
    ) -> Result<Vec<ScheduledTask>, CriticalPathError> {
        self.task_timings
            .iter()
            .map(|timing| -> Result<ScheduledTask, CriticalPathError> {
                let out_of_range = || CriticalPathError::DateOutOfRange {
                    task: timing.task_id.clone(),
                };
                let start_date =
                    offset_date(project_start, timing.earliest_start).ok_or_else(out_of_range)?;
                let end_date =
                    offset_date(project_start, timing.earliest_finish).ok_or_else(out_of_range)?;

                Ok(ScheduledTask {
                    task_id: timing.task_id.clone(),
                    start_date,
                    end_date,
                    duration_days: timing.duration_days,
                    slack_days: timing.slack,
                    critical: timing.critical,
                })
            })
            .collect()
    }
}

fn offset_date(start: NaiveDate, days: f64) -> Option<NaiveDate> {
    let whole_days = days.ceil();
    if !(0.0..=u32::MAX as f64).contains(&whole_days) {
        return None;
    }
    start.checked_add_days(Days::new(whole_days as u64))
}

/// Computes the critical path of a task collection.
///
/// Each call builds a private graph from the given snapshot, so a scheduler
/// can be shared and reused freely.
#[derive(Clone, Debug, Default)]
pub struct CriticalPathScheduler {
    config: CpmConfig,
}

impl CriticalPathScheduler {
    pub fn new(config: CpmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CpmConfig {
        &self.config
    }

    /// Run the full computation.
    ///
    /// Fails without a partial result if the tasks reference unknown
    /// predecessors, do not form a DAG, or produce negative slack.
    pub fn schedule(&self, tasks: &[Task]) -> Result<CriticalPathResult, CriticalPathError> {
        self.config.validate()?;
        let verbosity = self.config.verbosity;

        let graph = DependencyGraph::build(tasks, verbosity)?;
        let node_timings = calculate_node_timings(&graph, verbosity);
        let task_timings =
            calculate_task_timings(&graph, &node_timings, self.config.slack_epsilon, verbosity)?;

        let critical_path = critical_tasks(&task_timings);
        let project_length = node_timings[graph.sink() as usize].earliest_start;

        log_changes!(
            verbosity,
            "[cpm] Project length {}, critical path {:?}",
            project_length,
            critical_path
        );

        Ok(CriticalPathResult {
            critical_path,
            task_timings,
            node_timings,
            project_length,
        })
    }
}

/// Compute the critical path of `tasks` with the default configuration.
///
/// Returns the ids of the zero-slack tasks in task order.
pub fn compute_critical_path(tasks: &[Task]) -> Result<Vec<String>, CriticalPathError> {
    CriticalPathScheduler::default()
        .schedule(tasks)
        .map(|result| result.critical_path)
}
