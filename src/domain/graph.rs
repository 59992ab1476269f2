//! Relation graph for tasks
//!
//! Manages predecessor links with cycle detection and topological ordering.
//! Uses petgraph for graph operations.

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use thiserror::Error;

use super::id::TaskKey;
use super::relation::{Relation, RelationType};

#[derive(Debug, Error, PartialEq)]
pub enum RelationError {
    #[error("Adding relation would create a cycle: {0} -> {1}")]
    CycleDetected(TaskKey, TaskKey),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskKey),

    #[error("Self-relation not allowed: {0}")]
    SelfRelation(TaskKey),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Link {
    kind: RelationType,
    lag_minutes: i64,
}

/// A relation graph for tasks
///
/// Edge direction is predecessor -> successor.
#[derive(Debug, Default, Clone)]
pub struct RelationGraph {
    /// The underlying directed graph
    graph: DiGraph<TaskKey, Link>,

    /// Map from task handle to node index
    node_map: HashMap<TaskKey, NodeIndex>,
}

impl RelationGraph {
    /// Creates an empty relation graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Adds a task to the graph
    pub fn add_task(&mut self, task: TaskKey) {
        if !self.node_map.contains_key(&task) {
            let idx = self.graph.add_node(task);
            self.node_map.insert(task, idx);
        }
    }

    /// Removes a task from the graph (and all its relations)
    pub fn remove_task(&mut self, task: TaskKey) -> bool {
        if let Some(idx) = self.node_map.remove(&task) {
            self.graph.remove_node(idx);
            // petgraph moves the last node into the freed index
            self.rebuild_node_map();
            true
        } else {
            false
        }
    }

    fn rebuild_node_map(&mut self) {
        self.node_map.clear();
        for idx in self.graph.node_indices() {
            if let Some(task) = self.graph.node_weight(idx) {
                self.node_map.insert(*task, idx);
            }
        }
    }

    /// Adds a relation, replacing any existing link between the same pair
    pub fn add_relation(&mut self, relation: Relation) -> Result<(), RelationError> {
        let Relation {
            predecessor,
            successor,
            kind,
            lag_minutes,
        } = relation;

        if predecessor == successor {
            return Err(RelationError::SelfRelation(predecessor));
        }

        let pred_idx = *self
            .node_map
            .get(&predecessor)
            .ok_or(RelationError::TaskNotFound(predecessor))?;

        let succ_idx = *self
            .node_map
            .get(&successor)
            .ok_or(RelationError::TaskNotFound(successor))?;

        let link = Link { kind, lag_minutes };
        if let Some(edge) = self.graph.find_edge(pred_idx, succ_idx) {
            self.graph[edge] = link;
            return Ok(());
        }

        let edge = self.graph.add_edge(pred_idx, succ_idx, link);

        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            return Err(RelationError::CycleDetected(predecessor, successor));
        }

        Ok(())
    }

    /// Removes the relation between two tasks
    pub fn remove_relation(&mut self, predecessor: TaskKey, successor: TaskKey) -> bool {
        let (Some(pred_idx), Some(succ_idx)) = (
            self.node_map.get(&predecessor),
            self.node_map.get(&successor),
        ) else {
            return false;
        };

        match self.graph.find_edge(*pred_idx, *succ_idx) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                true
            }
            None => false,
        }
    }

    /// Returns relations where the task is the successor
    pub fn predecessors(&self, task: TaskKey) -> Vec<Relation> {
        self.edges(task, Direction::Incoming)
    }

    /// Returns relations where the task is the predecessor
    pub fn successors(&self, task: TaskKey) -> Vec<Relation> {
        self.edges(task, Direction::Outgoing)
    }

    fn edges(&self, task: TaskKey, direction: Direction) -> Vec<Relation> {
        let Some(idx) = self.node_map.get(&task) else {
            return vec![];
        };

        self.graph
            .edges_directed(*idx, direction)
            .map(|edge| self.relation(edge.source(), edge.target(), *edge.weight()))
            .collect()
    }

    fn relation(&self, source: NodeIndex, target: NodeIndex, link: Link) -> Relation {
        Relation {
            predecessor: self.graph[source],
            successor: self.graph[target],
            kind: link.kind,
            lag_minutes: link.lag_minutes,
        }
    }

    /// Returns every relation in the graph
    pub fn relations(&self) -> Vec<Relation> {
        self.graph
            .edge_references()
            .map(|edge| self.relation(edge.source(), edge.target(), *edge.weight()))
            .collect()
    }

    /// Returns all tasks in topological order (predecessors before successors)
    pub fn topological_order(&self) -> Result<Vec<TaskKey>, RelationError> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).copied())
                .collect()),
            Err(cycle) => {
                let task = self.graph[cycle.node_id()];
                Err(RelationError::CycleDetected(task, task))
            }
        }
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task: TaskKey) -> bool {
        self.node_map.contains_key(&task)
    }

    /// Returns the number of relations
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if there are no relations
    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}
