//! Dependency graph construction.
//!
//! Every task becomes an edge. Nodes are scheduling milestones inferred purely
//! from predecessor relationships: a node is created the first time two edges
//! need to meet, and reused when one side of a predecessor pair is already
//! attached somewhere. Nodes and edges live in two arenas owned by the graph
//! and refer to each other by index.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use crate::interner::{TaskIdInt, TaskIdInterner};
use crate::models::Task;
use crate::{log_changes, log_checks};

use super::error::{CriticalPathError, EdgeEnd, GraphDefect};
use super::types::{Edge, EdgeId, Node, NodeId, ROOT};

/// Edge under construction; its ends are attached as predecessors are wired.
struct PendingEdge<'a> {
    task: &'a Task,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

/// A validated task dependency graph. Read-only once built.
#[derive(Clone, Debug)]
pub struct DependencyGraph<'a> {
    nodes: Vec<Node>,
    edges: Vec<Edge<'a>>,
    sink: NodeId,
    /// Every node appears after all nodes feeding into it.
    order: Vec<NodeId>,
}

impl<'a> DependencyGraph<'a> {
    /// Build and validate the graph for a task collection.
    ///
    /// Edge `i` corresponds to `tasks[i]`. Node 0 is the root and the last
    /// node is the sink.
    pub fn build(tasks: &'a [Task], verbosity: u8) -> Result<Self, CriticalPathError> {
        let index = index_tasks(tasks)?;
        check_task_order(tasks, &index)?;

        let mut builder = GraphBuilder::new(tasks);
        builder.attach_start_tasks();
        builder.connect_predecessors(&index, verbosity);
        let sink = builder.attach_sink();
        let graph = builder.finish(sink)?;

        log_changes!(
            verbosity,
            "[cpm] Built dependency graph: {} tasks, {} nodes",
            graph.edges.len(),
            graph.nodes.len()
        );
        Ok(graph)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge<'a>] {
        &self.edges
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge<'a> {
        &self.edges[id as usize]
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn sink(&self) -> NodeId {
        self.sink
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in dependency order (root first, sink last).
    pub fn topological_order(&self) -> &[NodeId] {
        &self.order
    }
}

/// Check durations and identifiers, and index tasks by id.
fn index_tasks(tasks: &[Task]) -> Result<TaskIdInterner, CriticalPathError> {
    let mut index = TaskIdInterner::with_capacity(tasks.len());

    for task in tasks {
        if !task.duration_days.is_finite() || task.duration_days < 0.0 {
            return Err(CriticalPathError::InvalidDuration {
                task: task.id.clone(),
                duration: task.duration_days,
            });
        }
        if index.try_insert(&task.id).is_err() {
            return Err(CriticalPathError::DuplicateTask {
                task: task.id.clone(),
            });
        }
    }

    for task in tasks {
        for predecessor in &task.predecessors {
            if index.get(predecessor).is_none() {
                return Err(CriticalPathError::UnresolvedPredecessor {
                    task: task.id.clone(),
                    predecessor: predecessor.clone(),
                });
            }
        }
    }

    Ok(index)
}

/// Order tasks by their predecessor lists with Kahn's algorithm.
///
/// Fails with the tasks that cannot be ordered: those on a cycle (a task
/// listing itself included) and those downstream of one.
fn check_task_order(tasks: &[Task], index: &TaskIdInterner) -> Result<(), GraphDefect> {
    let mut in_degree = vec![0usize; tasks.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    let mut seen: FxHashSet<TaskIdInt> = FxHashSet::default();

    for (i, task) in tasks.iter().enumerate() {
        seen.clear();
        for predecessor in &task.predecessors {
            let Some(pred) = index.get(predecessor) else {
                continue;
            };
            if seen.insert(pred) {
                dependents[pred as usize].push(i);
                in_degree[i] += 1;
            }
        }
    }

    let mut queue: VecDeque<usize> = (0..tasks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered = 0;

    while let Some(i) = queue.pop_front() {
        ordered += 1;
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if ordered != tasks.len() {
        let tasks = tasks
            .iter()
            .zip(&in_degree)
            .filter(|(_, degree)| **degree > 0)
            .map(|(task, _)| task.id.clone())
            .collect();
        return Err(GraphDefect::Cycle { tasks });
    }

    Ok(())
}

struct GraphBuilder<'a> {
    nodes: Vec<Node>,
    edges: Vec<PendingEdge<'a>>,
}

impl<'a> GraphBuilder<'a> {
    fn new(tasks: &'a [Task]) -> Self {
        let edges = tasks
            .iter()
            .map(|task| PendingEdge {
                task,
                previous: None,
                next: None,
            })
            .collect();

        Self {
            nodes: vec![Node::new(ROOT)],
            edges,
        }
    }

    fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(id));
        id
    }

    /// Start `edge` at `node`.
    fn set_previous(&mut self, edge: EdgeId, node: NodeId) {
        self.edges[edge as usize].previous = Some(node);
        self.nodes[node as usize].outgoing.push(edge);
    }

    /// End `edge` at `node`.
    fn set_next(&mut self, edge: EdgeId, node: NodeId) {
        self.edges[edge as usize].next = Some(node);
        self.nodes[node as usize].incoming.push(edge);
    }

    fn task_id(&self, edge: EdgeId) -> &'a str {
        self.edges[edge as usize].task.id.as_str()
    }

    fn attach_start_tasks(&mut self) {
        for edge in 0..self.edges.len() as EdgeId {
            if self.edges[edge as usize].task.is_start_task() {
                self.set_previous(edge, ROOT);
            }
        }
    }

    fn connect_predecessors(&mut self, index: &TaskIdInterner, verbosity: u8) {
        let mut seen: FxHashSet<EdgeId> = FxHashSet::default();

        for edge in 0..self.edges.len() as EdgeId {
            let task = self.edges[edge as usize].task;
            seen.clear();

            for predecessor in &task.predecessors {
                // Unknown ids were rejected in index_tasks
                let Some(pred_edge) = index.get(predecessor) else {
                    continue;
                };
                // Repeated predecessor ids would register the same join twice
                if !seen.insert(pred_edge) {
                    continue;
                }
                self.join(pred_edge, edge, verbosity);
            }
        }
    }

    /// Make `pred` end where `succ` starts.
    fn join(&mut self, pred: EdgeId, succ: EdgeId, verbosity: u8) {
        let pred_next = self.edges[pred as usize].next;
        let succ_previous = self.edges[succ as usize].previous;

        match (pred_next, succ_previous) {
            (None, None) => {
                let node = self.add_node();
                self.set_next(pred, node);
                self.set_previous(succ, node);
                log_checks!(
                    verbosity,
                    "[cpm] Created node {} between {:?} and {:?}",
                    node,
                    self.task_id(pred),
                    self.task_id(succ)
                );
            }
            (Some(node), None) => {
                self.set_previous(succ, node);
                log_checks!(
                    verbosity,
                    "[cpm] {:?} starts at node {} where {:?} ends",
                    self.task_id(succ),
                    node,
                    self.task_id(pred)
                );
            }
            (None, Some(node)) => {
                self.set_next(pred, node);
                log_checks!(
                    verbosity,
                    "[cpm] {:?} ends at node {} where {:?} starts",
                    self.task_id(pred),
                    node,
                    self.task_id(succ)
                );
            }
            (Some(end), Some(start)) => {
                // First writer wins: both ends are already placed
                if end != start {
                    log_checks!(
                        verbosity,
                        "[cpm] {:?} ends at node {} but {:?} starts at node {}; left unchanged",
                        self.task_id(pred),
                        end,
                        self.task_id(succ),
                        start
                    );
                }
            }
        }
    }

    /// Create the sink and end every edge without a successor there.
    fn attach_sink(&mut self) -> NodeId {
        let sink = self.add_node();
        for edge in 0..self.edges.len() as EdgeId {
            if self.edges[edge as usize].next.is_none() {
                self.set_next(edge, sink);
            }
        }
        sink
    }

    /// Resolve pending edges and validate the node structure.
    ///
    /// `DependencyGraph::build` only calls this on builders whose edges are all
    /// attached, so dangling edges and extra roots indicate a builder bug.
    fn finish(self, sink: NodeId) -> Result<DependencyGraph<'a>, GraphDefect> {
        let edges = self
            .edges
            .into_iter()
            .map(|pending| match (pending.previous, pending.next) {
                // A redundant transitive predecessor listed before the direct
                // one can end a task at its own start node
                (Some(previous), Some(next)) if previous == next => {
                    Err(GraphDefect::LoopedEdge {
                        task: pending.task.id.clone(),
                    })
                }
                (Some(previous), Some(next)) => Ok(Edge {
                    task: pending.task,
                    previous,
                    next,
                }),
                (None, _) => Err(GraphDefect::DanglingEdge {
                    task: pending.task.id.clone(),
                    missing: EdgeEnd::Previous,
                }),
                (_, None) => Err(GraphDefect::DanglingEdge {
                    task: pending.task.id.clone(),
                    missing: EdgeEnd::Next,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let order = topological_order(&self.nodes, &edges)?;

        // With no tasks at all the sink is legitimately unreachable
        if !edges.is_empty() {
            let extra_roots: Vec<NodeId> = self
                .nodes
                .iter()
                .filter(|node| node.id != ROOT && node.incoming.is_empty())
                .map(|node| node.id)
                .collect();
            if !extra_roots.is_empty() {
                return Err(GraphDefect::MultipleRoots { nodes: extra_roots });
            }
        }

        Ok(DependencyGraph {
            nodes: self.nodes,
            edges,
            sink,
            order,
        })
    }
}

/// Order nodes with Kahn's algorithm.
///
/// Fails with the tasks that could not be placed if node joins form a loop.
fn topological_order(nodes: &[Node], edges: &[Edge<'_>]) -> Result<Vec<NodeId>, GraphDefect> {
    let mut in_degree: Vec<usize> = nodes.iter().map(|node| node.incoming.len()).collect();

    let mut queue: VecDeque<NodeId> = nodes
        .iter()
        .filter(|node| node.incoming.is_empty())
        .map(|node| node.id)
        .collect();

    let mut order: Vec<NodeId> = Vec::with_capacity(nodes.len());

    while let Some(node_id) = queue.pop_front() {
        order.push(node_id);

        for &edge_id in &nodes[node_id as usize].outgoing {
            let next = edges[edge_id as usize].next as usize;
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next as NodeId);
            }
        }
    }

    if order.len() != nodes.len() {
        let mut placed = vec![false; nodes.len()];
        for &node_id in &order {
            placed[node_id as usize] = true;
        }
        let tasks = edges
            .iter()
            .filter(|edge| !placed[edge.previous as usize])
            .map(|edge| edge.task.id.clone())
            .collect();
        return Err(GraphDefect::UnorderableNodes { tasks });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(id: &str, duration: f64, preds: Vec<&str>) -> Task {
        Task::new(id, duration, preds)
    }

    fn position(order: &[NodeId], node: NodeId) -> usize {
        order.iter().position(|&n| n == node).unwrap()
    }

    #[test]
    fn test_empty_task_set() {
        let tasks: Vec<Task> = vec![];
        let graph = DependencyGraph::build(&tasks, 0).unwrap();

        assert_eq!(graph.node_count(), 2); // root + sink
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.sink(), 1);
    }

    #[test]
    fn test_single_task() {
        let tasks = vec![make_task("a", 5.0, vec![])];
        let graph = DependencyGraph::build(&tasks, 0).unwrap();

        assert_eq!(graph.node_count(), 2);
        let edge = graph.edge(0);
        assert_eq!(edge.previous, graph.root());
        assert_eq!(edge.next, graph.sink());
        assert_eq!(graph.node(graph.root()).outgoing, vec![0]);
        assert_eq!(graph.node(graph.sink()).incoming, vec![0]);
    }

    #[test]
    fn test_diamond_structure() {
        // a -> {b, c} -> d
        let tasks = vec![
            make_task("a", 3.0, vec![]),
            make_task("b", 2.0, vec!["a"]),
            make_task("c", 5.0, vec!["a"]),
            make_task("d", 1.0, vec!["b", "c"]),
        ];
        let graph = DependencyGraph::build(&tasks, 0).unwrap();

        // root, a->{b,c}, {b,c}->d, sink
        assert_eq!(graph.node_count(), 4);

        let (a, b, c, d) = (graph.edge(0), graph.edge(1), graph.edge(2), graph.edge(3));
        assert_eq!(a.previous, ROOT);
        assert_eq!(a.next, b.previous);
        assert_eq!(b.previous, c.previous);
        assert_eq!(b.next, d.previous);
        assert_eq!(c.next, d.previous);
        assert_eq!(d.next, graph.sink());

        let merge = graph.node(d.previous);
        assert_eq!(merge.incoming, vec![1, 2]);
        assert_eq!(merge.outgoing, vec![3]);
    }

    #[test]
    fn test_parallel_start_tasks_share_root_and_sink() {
        let tasks = vec![
            make_task("a", 1.0, vec![]),
            make_task("b", 2.0, vec![]),
            make_task("c", 3.0, vec![]),
        ];
        let graph = DependencyGraph::build(&tasks, 0).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node(ROOT).outgoing, vec![0, 1, 2]);
        assert_eq!(graph.node(graph.sink()).incoming, vec![0, 1, 2]);
    }

    #[test]
    fn test_order_respects_dependencies_not_input_order() {
        // Dependents listed before their predecessors
        let tasks = vec![
            make_task("d", 1.0, vec!["b", "c"]),
            make_task("b", 2.0, vec!["a"]),
            make_task("c", 5.0, vec!["a"]),
            make_task("a", 3.0, vec![]),
        ];
        let graph = DependencyGraph::build(&tasks, 0).unwrap();
        let order = graph.topological_order();

        assert_eq!(order.len(), graph.node_count());
        assert_eq!(order[0], ROOT);
        assert_eq!(*order.last().unwrap(), graph.sink());
        for edge in graph.edges() {
            assert!(
                position(order, edge.previous) < position(order, edge.next),
                "edge {:?} runs backwards in the order",
                edge.task.id
            );
        }
    }

    #[test]
    fn test_repeated_predecessor_registered_once() {
        let tasks = vec![
            make_task("a", 1.0, vec![]),
            make_task("b", 1.0, vec!["a", "a"]),
        ];
        let graph = DependencyGraph::build(&tasks, 0).unwrap();

        let between = graph.edge(1).previous;
        assert_eq!(graph.node(between).incoming, vec![0]);
        assert_eq!(graph.node(between).outgoing, vec![1]);
    }

    #[test]
    fn test_already_connected_pair_is_left_alone() {
        // e depends on a and b, but a and b already end at different nodes
        // (via c and d). The join for b is a no-op, so e hangs off a's node only.
        let tasks = vec![
            make_task("a", 1.0, vec![]),
            make_task("b", 1.0, vec![]),
            make_task("c", 1.0, vec!["a"]),
            make_task("d", 1.0, vec!["b"]),
            make_task("e", 1.0, vec!["a", "b"]),
        ];
        let graph = DependencyGraph::build(&tasks, 0).unwrap();

        let (a, b, c, d, e) = (
            graph.edge(0),
            graph.edge(1),
            graph.edge(2),
            graph.edge(3),
            graph.edge(4),
        );
        assert_eq!(e.previous, a.next);
        assert_eq!(e.previous, c.previous);
        assert_eq!(b.next, d.previous);
        assert_ne!(b.next, e.previous);
    }

    #[test]
    fn test_unresolved_predecessor() {
        let tasks = vec![
            make_task("a", 1.0, vec![]),
            make_task("b", 1.0, vec!["a", "ghost"]),
        ];
        let err = DependencyGraph::build(&tasks, 0).unwrap_err();

        assert_eq!(
            err,
            CriticalPathError::UnresolvedPredecessor {
                task: "b".to_string(),
                predecessor: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_task_id() {
        let tasks = vec![make_task("a", 1.0, vec![]), make_task("a", 2.0, vec![])];
        let err = DependencyGraph::build(&tasks, 0).unwrap_err();

        assert_eq!(
            err,
            CriticalPathError::DuplicateTask {
                task: "a".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_durations() {
        for duration in [-1.0, f64::NAN, f64::INFINITY] {
            let tasks = vec![make_task("a", duration, vec![])];
            let err = DependencyGraph::build(&tasks, 0).unwrap_err();
            assert!(
                matches!(err, CriticalPathError::InvalidDuration { ref task, .. } if task == "a"),
                "unexpected error for duration {}: {:?}",
                duration,
                err
            );
        }
    }

    #[test]
    fn test_zero_duration_is_valid() {
        let tasks = vec![make_task("milestone", 0.0, vec![])];
        assert!(DependencyGraph::build(&tasks, 0).is_ok());
    }

    #[test]
    fn test_two_task_cycle() {
        let tasks = vec![
            make_task("start", 1.0, vec![]),
            make_task("a", 1.0, vec!["b"]),
            make_task("b", 1.0, vec!["a"]),
        ];
        let err = DependencyGraph::build(&tasks, 0).unwrap_err();

        assert_eq!(
            err,
            CriticalPathError::MalformedDependencyGraph(GraphDefect::Cycle {
                tasks: vec!["a".to_string(), "b".to_string()],
            })
        );
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let tasks = vec![make_task("a", 1.0, vec!["a"])];
        let err = DependencyGraph::build(&tasks, 0).unwrap_err();

        assert!(matches!(
            err,
            CriticalPathError::MalformedDependencyGraph(GraphDefect::Cycle { .. })
        ));
    }

    #[test]
    fn test_cycle_reports_downstream_tasks() {
        let tasks = vec![
            make_task("a", 1.0, vec!["c"]),
            make_task("b", 1.0, vec!["a"]),
            make_task("c", 1.0, vec!["b"]),
            make_task("d", 1.0, vec!["c"]),
            make_task("e", 1.0, vec![]),
        ];
        let err = DependencyGraph::build(&tasks, 0).unwrap_err();

        assert_eq!(
            err,
            CriticalPathError::MalformedDependencyGraph(GraphDefect::Cycle {
                tasks: vec![
                    "a".to_string(),
                    "b".to_string(),
                    "c".to_string(),
                    "d".to_string()
                ],
            })
        );
    }

    #[test]
    fn test_transitive_predecessor_listed_first_loops_an_edge() {
        // c depends on a directly and through b. Joining a first puts c's start
        // on a's end node, then joining b ends b at that same node.
        let tasks = vec![
            make_task("a", 2.0, vec![]),
            make_task("b", 3.0, vec!["a"]),
            make_task("c", 1.0, vec!["a", "b"]),
        ];
        let err = DependencyGraph::build(&tasks, 0).unwrap_err();

        assert_eq!(
            err,
            CriticalPathError::MalformedDependencyGraph(GraphDefect::LoopedEdge {
                task: "b".to_string(),
            })
        );
    }

    #[test]
    fn test_transitive_predecessor_listed_last_builds() {
        let tasks = vec![
            make_task("a", 2.0, vec![]),
            make_task("b", 3.0, vec!["a"]),
            make_task("c", 1.0, vec!["b", "a"]),
        ];
        let graph = DependencyGraph::build(&tasks, 0).unwrap();

        let (a, b, c) = (graph.edge(0), graph.edge(1), graph.edge(2));
        assert_eq!(a.previous, ROOT);
        assert_eq!(a.next, b.previous);
        assert_eq!(b.next, c.previous);
        assert_eq!(c.next, graph.sink());
        for edge in graph.edges() {
            assert_ne!(edge.previous, edge.next);
        }
    }

    // The checks below guard invariants that `build` already establishes, so
    // they are reached through hand-assembled builders.

    #[test]
    fn test_finish_rejects_dangling_edges() {
        let tasks = vec![
            make_task("a", 1.0, vec![]),
            make_task("b", 1.0, vec!["a"]),
        ];

        let mut builder = GraphBuilder::new(&tasks);
        builder.attach_start_tasks();
        let sink = builder.attach_sink();
        let err = builder.finish(sink).unwrap_err();
        assert_eq!(
            err,
            GraphDefect::DanglingEdge {
                task: "b".to_string(),
                missing: EdgeEnd::Previous,
            }
        );

        let mut builder = GraphBuilder::new(&tasks);
        builder.attach_start_tasks();
        let orphan = builder.add_node();
        builder.set_previous(1, orphan);
        let err = builder.finish(orphan).unwrap_err();
        assert_eq!(
            err,
            GraphDefect::DanglingEdge {
                task: "a".to_string(),
                missing: EdgeEnd::Next,
            }
        );
    }

    #[test]
    fn test_finish_rejects_extra_roots() {
        let tasks = vec![make_task("a", 1.0, vec![]), make_task("b", 1.0, vec![])];

        let mut builder = GraphBuilder::new(&tasks);
        builder.set_previous(0, ROOT);
        let orphan = builder.add_node();
        builder.set_previous(1, orphan);
        let sink = builder.attach_sink();
        let err = builder.finish(sink).unwrap_err();

        assert_eq!(err, GraphDefect::MultipleRoots { nodes: vec![orphan] });
    }

    #[test]
    fn test_finish_rejects_node_loop() {
        // a: root -> n1, b: n1 -> n2, c: n2 -> n1
        let tasks = vec![
            make_task("a", 1.0, vec![]),
            make_task("b", 1.0, vec![]),
            make_task("c", 1.0, vec![]),
        ];

        let mut builder = GraphBuilder::new(&tasks);
        let n1 = builder.add_node();
        let n2 = builder.add_node();
        builder.set_previous(0, ROOT);
        builder.set_next(0, n1);
        builder.set_previous(1, n1);
        builder.set_next(1, n2);
        builder.set_previous(2, n2);
        builder.set_next(2, n1);
        let sink = builder.attach_sink();
        let err = builder.finish(sink).unwrap_err();

        assert_eq!(
            err,
            GraphDefect::UnorderableNodes {
                tasks: vec!["b".to_string(), "c".to_string()],
            }
        );
    }

    #[test]
    fn test_build_with_logging_enabled() {
        let tasks = vec![
            make_task("a", 1.0, vec![]),
            make_task("b", 1.0, vec!["a"]),
        ];
        let graph = DependencyGraph::build(&tasks, crate::logging::VERBOSITY_DEBUG).unwrap();
        assert_eq!(graph.node_count(), 3);
    }
}
