//! Comparison of a learned structure against a ground truth.
//!
//! Reporting-side helpers only: nothing in the learning pipeline consumes
//! these. `compare` is a pure function of the two structures.

use std::collections::BTreeSet;

use crate::engine::graph::{NodeId, NodePair};
use crate::engine::structure::BayesianStructure;

/// Hamming decomposition and skeleton scores for a learned structure
/// against a ground-truth structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Skeleton differences: adjacent pairs present in exactly one of the
    /// two structures.
    pub hamming: usize,
    /// Differences counting orientation: skeleton differences plus shared
    /// adjacencies whose arc direction disagrees.
    pub structural_hamming: usize,
    /// Fraction of learned adjacencies that are true adjacencies.
    pub precision: f64,
    /// Fraction of true adjacencies that were learned.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub fscore: f64,
    /// Euclidean distance to the optimum in precision/recall space.
    pub dist2opt: f64,
}

fn skeleton(structure: &BayesianStructure) -> BTreeSet<NodePair> {
    structure
        .arcs()
        .map(|(x, y)| NodePair::new(x, y))
        .collect()
}

/// Compares a learned structure to the ground truth.
///
/// Precision and recall are over skeleton adjacencies; an empty learned
/// (resp. true) skeleton gives a precision (resp. recall) of 1.0, so two
/// empty structures compare as a perfect match.
pub fn compare(learned: &BayesianStructure, truth: &BayesianStructure) -> ComparisonResult {
    let learned_skel = skeleton(learned);
    let truth_skel = skeleton(truth);

    let shared: Vec<&NodePair> = learned_skel.intersection(&truth_skel).collect();
    let hamming = learned_skel.len() + truth_skel.len() - 2 * shared.len();

    let disoriented = shared
        .iter()
        .filter(|pair| {
            let (x, y) = (pair.first(), pair.second());
            learned.exists_arc(x, y) != truth.exists_arc(x, y)
        })
        .count();
    let structural_hamming = hamming + disoriented;

    let precision = if learned_skel.is_empty() {
        1.0
    } else {
        shared.len() as f64 / learned_skel.len() as f64
    };
    let recall = if truth_skel.is_empty() {
        1.0
    } else {
        shared.len() as f64 / truth_skel.len() as f64
    };
    let fscore = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    let dist2opt = ((1.0 - precision).powi(2) + (1.0 - recall).powi(2)).sqrt();

    ComparisonResult {
        hamming,
        structural_hamming,
        precision,
        recall,
        fscore,
        dist2opt,
    }
}

/// Convenience for tests and reporting: builds a structure from explicit
/// arcs over `0..n` binary variables. Panics are avoided by construction
/// order; callers supply acyclic arc lists.
pub fn structure_from_arcs(
    n: u32,
    arcs: &[(u32, u32)],
) -> Result<BayesianStructure, crate::engine::errors::LearnError> {
    let mut graph = crate::engine::graph::MixedGraph::new();
    for id in 0..n {
        graph.add_node(NodeId(id));
    }
    for &(x, y) in arcs {
        graph.add_arc(NodeId(x), NodeId(y));
    }
    BayesianStructure::from_graph(&graph, 2)
}
