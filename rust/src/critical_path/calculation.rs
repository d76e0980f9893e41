//! Critical path calculation using forward and backward passes over the
//! milestone nodes of a [`DependencyGraph`].

use crate::log_debug;

use super::error::CriticalPathError;
use super::graph::DependencyGraph;
use super::types::{NodeTiming, TaskTiming, ROOT};

/// Forward pass: earliest start of every node, indexed by node id.
///
/// A node's earliest start is the latest finish among its incoming tasks;
/// the root (no incoming tasks) starts at 0.
pub fn forward_pass(graph: &DependencyGraph<'_>, verbosity: u8) -> Vec<f64> {
    let mut earliest = vec![0.0; graph.node_count()];

    for &node_id in graph.topological_order() {
        let mut earliest_start = 0.0;
        for &edge_id in &graph.node(node_id).incoming {
            let edge = graph.edge(edge_id);
            let finish = earliest[edge.previous as usize] + edge.duration();
            if finish > earliest_start {
                earliest_start = finish;
            }
        }

        earliest[node_id as usize] = earliest_start;
        log_debug!(
            verbosity,
            "[cpm] forward: node {} earliest_start={}",
            node_id,
            earliest_start
        );
    }

    earliest
}

/// Backward pass: latest start of every node, indexed by node id.
///
/// Seeded with the project length (the sink's earliest start). A node's
/// latest start is the tightest requirement among its outgoing tasks; the
/// root is pinned to 0 afterwards.
pub fn backward_pass(graph: &DependencyGraph<'_>, earliest: &[f64], verbosity: u8) -> Vec<f64> {
    let project_length = earliest[graph.sink() as usize];
    let mut latest = vec![project_length; graph.node_count()];

    for &node_id in graph.topological_order().iter().rev() {
        let mut latest_start = project_length;
        for &edge_id in &graph.node(node_id).outgoing {
            let edge = graph.edge(edge_id);
            let required = latest[edge.next as usize] - edge.duration();
            if required < latest_start {
                latest_start = required;
            }
        }

        latest[node_id as usize] = latest_start;
        log_debug!(
            verbosity,
            "[cpm] backward: node {} latest_start={}",
            node_id,
            latest_start
        );
    }

    // The project cannot start before time 0
    latest[ROOT as usize] = 0.0;
    latest
}

/// Run both passes and pair the results per node.
pub fn calculate_node_timings(graph: &DependencyGraph<'_>, verbosity: u8) -> Vec<NodeTiming> {
    let earliest = forward_pass(graph, verbosity);
    let latest = backward_pass(graph, &earliest, verbosity);

    earliest
        .into_iter()
        .zip(latest)
        .map(|(earliest_start, latest_start)| NodeTiming {
            earliest_start,
            latest_start,
        })
        .collect()
}

/// Compute the timing and slack of every task, in task order.
///
/// Slack within `slack_epsilon` of zero marks a task as critical. Slack below
/// `-slack_epsilon` means the node timings are inconsistent with the graph
/// and aborts with [`CriticalPathError::NegativeSlack`].
pub fn calculate_task_timings(
    graph: &DependencyGraph<'_>,
    node_timings: &[NodeTiming],
    slack_epsilon: f64,
    verbosity: u8,
) -> Result<Vec<TaskTiming>, CriticalPathError> {
    let mut timings = Vec::with_capacity(graph.edge_count());

    for edge in graph.edges() {
        let duration = edge.duration();
        let earliest_start = node_timings[edge.previous as usize].earliest_start;
        let latest_finish = node_timings[edge.next as usize].latest_start;
        let slack = latest_finish - earliest_start - duration;

        log_debug!(verbosity, "[cpm] slack: {:?} = {}", edge.task.id, slack);

        if slack < -slack_epsilon {
            return Err(CriticalPathError::NegativeSlack {
                task: edge.task.id.clone(),
                slack,
            });
        }

        timings.push(TaskTiming {
            task_id: edge.task.id.clone(),
            duration_days: duration,
            earliest_start,
            earliest_finish: earliest_start + duration,
            latest_start: latest_finish - duration,
            latest_finish,
            slack,
            critical: slack.abs() <= slack_epsilon,
        });
    }

    Ok(timings)
}

/// Identifiers of the zero-slack tasks, in task order.
pub fn critical_tasks(task_timings: &[TaskTiming]) -> Vec<String> {
    task_timings
        .iter()
        .filter(|timing| timing.critical)
        .map(|timing| timing.task_id.clone())
        .collect()
}
