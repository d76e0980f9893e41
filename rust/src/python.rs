//! Python bindings, built with the `python` feature.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;

use crate::config::CpmConfig;
use crate::critical_path::{CriticalPathResult, CriticalPathScheduler, TaskTiming};
use crate::models::{ScheduledTask, Task};

/// A task to be analysed (PyO3 wrapper).
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub duration_days: f64,
    #[pyo3(get, set)]
    pub predecessors: Vec<String>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (id, duration_days, predecessors=None))]
    fn new(id: String, duration_days: f64, predecessors: Option<Vec<String>>) -> Self {
        Self {
            id,
            duration_days,
            predecessors: predecessors.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={:?}, duration_days={}, predecessors={:?})",
            self.id, self.duration_days, self.predecessors
        )
    }
}

impl From<PyTask> for Task {
    fn from(task: PyTask) -> Self {
        Task {
            id: task.id,
            duration_days: task.duration_days,
            predecessors: task.predecessors,
        }
    }
}

/// Timing of one task (PyO3 wrapper).
#[pyclass(name = "TaskTiming")]
#[derive(Clone, Debug)]
pub struct PyTaskTiming {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub duration_days: f64,
    #[pyo3(get)]
    pub earliest_start: f64,
    #[pyo3(get)]
    pub earliest_finish: f64,
    #[pyo3(get)]
    pub latest_start: f64,
    #[pyo3(get)]
    pub latest_finish: f64,
    #[pyo3(get)]
    pub slack: f64,
    #[pyo3(get)]
    pub critical: bool,
}

#[pymethods]
impl PyTaskTiming {
    fn __repr__(&self) -> String {
        format!(
            "TaskTiming(task_id={:?}, earliest_start={}, slack={}, critical={})",
            self.task_id, self.earliest_start, self.slack, self.critical
        )
    }
}

impl From<TaskTiming> for PyTaskTiming {
    fn from(timing: TaskTiming) -> Self {
        Self {
            task_id: timing.task_id,
            duration_days: timing.duration_days,
            earliest_start: timing.earliest_start,
            earliest_finish: timing.earliest_finish,
            latest_start: timing.latest_start,
            latest_finish: timing.latest_finish,
            slack: timing.slack,
            critical: timing.critical,
        }
    }
}

/// Result of a critical path computation (PyO3 wrapper).
#[pyclass(name = "CriticalPathResult")]
#[derive(Clone, Debug)]
pub struct PyCriticalPathResult {
    #[pyo3(get)]
    pub critical_path: Vec<String>,
    #[pyo3(get)]
    pub task_timings: Vec<PyTaskTiming>,
    #[pyo3(get)]
    pub project_length: f64,
}

#[pymethods]
impl PyCriticalPathResult {
    fn __repr__(&self) -> String {
        format!(
            "CriticalPathResult(critical_path={:?}, project_length={})",
            self.critical_path, self.project_length
        )
    }
}

impl From<CriticalPathResult> for PyCriticalPathResult {
    fn from(result: CriticalPathResult) -> Self {
        Self {
            critical_path: result.critical_path,
            task_timings: result.task_timings.into_iter().map(Into::into).collect(),
            project_length: result.project_length,
        }
    }
}

/// A task placed on the calendar (PyO3 wrapper).
#[pyclass(name = "ScheduledTask")]
#[derive(Clone, Debug)]
pub struct PyScheduledTask {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub start_date: NaiveDate,
    #[pyo3(get)]
    pub end_date: NaiveDate,
    #[pyo3(get)]
    pub duration_days: f64,
    #[pyo3(get)]
    pub slack_days: f64,
    #[pyo3(get)]
    pub critical: bool,
}

#[pymethods]
impl PyScheduledTask {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledTask(task_id={:?}, start={}, end={}, critical={})",
            self.task_id, self.start_date, self.end_date, self.critical
        )
    }
}

impl From<ScheduledTask> for PyScheduledTask {
    fn from(task: ScheduledTask) -> Self {
        Self {
            task_id: task.task_id,
            start_date: task.start_date,
            end_date: task.end_date,
            duration_days: task.duration_days,
            slack_days: task.slack_days,
            critical: task.critical,
        }
    }
}

fn run(tasks: Vec<PyTask>, verbosity: u8) -> PyResult<CriticalPathResult> {
    let tasks: Vec<Task> = tasks.into_iter().map(Into::into).collect();
    CriticalPathScheduler::new(CpmConfig::with_verbosity(verbosity))
        .schedule(&tasks)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Compute the critical path of a list of tasks.
///
/// # Returns
/// * List of critical task IDs, in input order
///
/// # Raises
/// * ValueError for unknown predecessors, cycles, duplicate IDs or invalid durations
#[pyfunction]
#[pyo3(name = "compute_critical_path", signature = (tasks, verbosity=0))]
fn py_compute_critical_path(tasks: Vec<PyTask>, verbosity: u8) -> PyResult<Vec<String>> {
    Ok(run(tasks, verbosity)?.critical_path)
}

/// Compute the critical path together with per-task timings.
#[pyfunction]
#[pyo3(signature = (tasks, verbosity=0))]
fn run_critical_path(tasks: Vec<PyTask>, verbosity: u8) -> PyResult<PyCriticalPathResult> {
    Ok(run(tasks, verbosity)?.into())
}

/// Place every task on the calendar at its earliest start, counted from `project_start`.
#[pyfunction]
#[pyo3(signature = (tasks, project_start, verbosity=0))]
fn schedule_tasks(
    tasks: Vec<PyTask>,
    project_start: NaiveDate,
    verbosity: u8,
) -> PyResult<Vec<PyScheduledTask>> {
    let scheduled = run(tasks, verbosity)?
        .scheduled_tasks(project_start)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
    Ok(scheduled.into_iter().map(Into::into).collect())
}

/// The cpm_rust Python module.
#[pymodule]
fn cpm_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<PyTask>()?;
    m.add_class::<PyTaskTiming>()?;
    m.add_class::<PyCriticalPathResult>()?;
    m.add_class::<PyScheduledTask>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_compute_critical_path, m)?)?;
    m.add_function(wrap_pyfunction!(run_critical_path, m)?)?;
    m.add_function(wrap_pyfunction!(schedule_tasks, m)?)?;

    Ok(())
}
