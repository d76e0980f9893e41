//! Core data types exchanged with callers of the critical path engine.

use chrono::NaiveDate;

/// A unit of project work.
///
/// Tasks are owned by the caller; the engine only borrows them.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    /// Identifier, unique within one task collection.
    pub id: String,
    /// Duration in days. Must be finite and non-negative.
    pub duration_days: f64,
    /// Identifiers of the tasks that must finish before this one can start.
    pub predecessors: Vec<String>,
}

impl Task {
    pub fn new<I, S>(id: impl Into<String>, duration_days: f64, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            duration_days,
            predecessors: predecessors.into_iter().map(Into::into).collect(),
        }
    }

    /// A start task has no predecessors and begins at the project root.
    pub fn is_start_task(&self) -> bool {
        self.predecessors.is_empty()
    }
}

/// A task anchored onto the calendar at its earliest start.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledTask {
    pub task_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: f64,
    /// Total float of the task in days.
    pub slack_days: f64,
    /// Whether the task lies on the critical path.
    pub critical: bool,
}
