//! Materialization of the learned graph into a directed acyclic structure.
//!
//! The final graph should contain only arcs after completion; the one
//! sanctioned exception is the skeleton-consistency variant, which
//! reinstates undirected edges after completion. Undirected edges are
//! undetermined adjacencies and are not materialized. A directed cycle is
//! a reported failure, never a silently invalid structure: the greedy
//! completion heuristic can legitimately (if rarely) leave one.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::engine::errors::LearnError;
use crate::engine::graph::{MixedGraph, NodeId};

/// A directed acyclic structure over the learned variables, each carrying
/// its cardinality (number of discrete values).
///
/// Construction is the acyclicity boundary: a `BayesianStructure` that
/// exists is guaranteed cycle-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BayesianStructure {
    cardinalities: BTreeMap<NodeId, u32>,
    arcs: BTreeSet<(NodeId, NodeId)>,
}

impl BayesianStructure {
    /// Materializes a mixed graph: one variable per node with the given
    /// cardinality, one structure arc per graph arc.
    ///
    /// Fails with [`LearnError::LearningFailed`] if the arcs contain a
    /// directed cycle. Pure in its input, so materializing the same graph
    /// twice yields identical structures.
    pub fn from_graph(graph: &MixedGraph, nb_values: u32) -> Result<Self, LearnError> {
        let mut structure = Self {
            cardinalities: graph.nodes().map(|node| (node, nb_values)).collect(),
            arcs: BTreeSet::new(),
        };
        for (x, y) in graph.arcs() {
            structure.add_arc(x, y)?;
        }
        Ok(structure)
    }

    /// Adds an arc, rejecting one that would close a directed cycle.
    fn add_arc(&mut self, x: NodeId, y: NodeId) -> Result<(), LearnError> {
        if x == y || self.has_directed_path(y, x) {
            return Err(LearnError::LearningFailed(
                "learned structure contains a cycle".into(),
            ));
        }
        self.arcs.insert((x, y));
        Ok(())
    }

    fn has_directed_path(&self, from: NodeId, to: NodeId) -> bool {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([from]);
        seen.insert(from);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            for &(src, dst) in &self.arcs {
                if src == current && seen.insert(dst) {
                    queue.push_back(dst);
                }
            }
        }
        false
    }

    /// Variables in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.cardinalities.keys().copied()
    }

    /// Cardinality of a variable, if present.
    pub fn cardinality(&self, node: NodeId) -> Option<u32> {
        self.cardinalities.get(&node).copied()
    }

    /// Arcs in canonical order.
    pub fn arcs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.arcs.iter().copied()
    }

    /// Parents of a variable, in ascending id order.
    pub fn parents(&self, node: NodeId) -> Vec<NodeId> {
        self.arcs
            .iter()
            .filter(|&&(_, dst)| dst == node)
            .map(|&(src, _)| src)
            .collect()
    }

    /// True iff the structure has the arc x→y.
    pub fn exists_arc(&self, x: NodeId, y: NodeId) -> bool {
        self.arcs.contains(&(x, y))
    }
}
