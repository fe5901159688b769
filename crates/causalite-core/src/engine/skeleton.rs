//! # Skeleton learning (phase 1)
//!
//! Starting from a complete graph, progressively removes edges between
//! conditionally-independent pairs and records the separating conditioning
//! set for each removal.
//!
//! ## Stable vs classic mode
//!
//! The classic mode recomputes neighbour sets live, so an edge removed
//! early in a d-round changes the candidate conditioning sets of pairs
//! tested later in the same round. This order dependence is the documented
//! behaviour of the original PC algorithm, not a bug. The stable mode
//! (PC-stable) snapshots every node's neighbour set at the start of each
//! d-round, so all tests within a round see pre-round adjacency and the
//! result is independent of pair ordering. Both modes are supported and
//! tested against each other.
//!
//! ## Restriction
//!
//! The consistency variants pass a guide graph: candidate conditioning
//! nodes for a pair (X, Y) are then intersected with the consistent set of
//! (X, Y) in the guide. See [`crate::engine::consistency`].

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::engine::consistency::consistent_set;
use crate::engine::errors::LearnError;
use crate::engine::graph::{MixedGraph, NodeId};
use crate::engine::oracle::IndependenceOracle;
use crate::engine::sepset::{ConditioningSet, SepsetTable};

/// How neighbour sets are computed within a d-round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonMode {
    /// Live neighbour recomputation: removals within a round affect later
    /// tests in the same round (original PC, order dependent).
    Classic,
    /// Per-round neighbour snapshots: all tests in a round see pre-round
    /// adjacency (PC-stable, order independent).
    Stable,
}

/// Parameters for one skeleton-learning pass.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonOptions<'a> {
    /// Neighbour-set evaluation mode.
    pub mode: SkeletonMode,
    /// Significance threshold handed to the oracle.
    pub alpha: f64,
    /// Optional guide graph restricting eligible conditioning nodes to the
    /// consistent set of each pair.
    pub guide: Option<&'a MixedGraph>,
}

/// Learns the skeleton of `graph` by the PC edge-removal procedure.
///
/// Takes the graph by value and returns it with conditionally-independent
/// pairs disconnected, together with the sepset table justifying every
/// removal. The table has an entry for every node pair, so the orientation
/// phase can distinguish "no separating set found" from "never tested".
///
/// Terminates after at most `max_degree + 1` d-rounds: `d` grows by one
/// per round while degrees only shrink.
pub fn learn_skeleton(
    mut graph: MixedGraph,
    oracle: &dyn IndependenceOracle,
    options: &SkeletonOptions<'_>,
) -> Result<(MixedGraph, SepsetTable), LearnError> {
    let mut sepsets = SepsetTable::for_graph(&graph);
    let mut d = 0usize;

    while graph.nodes().any(|x| graph.degree(x) > d) {
        let round_edges: Vec<_> = graph.edges().collect();
        // Stable mode freezes adjacency for the whole round.
        let snapshot: Option<BTreeMap<NodeId, BTreeSet<NodeId>>> = match options.mode {
            SkeletonMode::Stable => Some(
                graph
                    .nodes()
                    .map(|node| (node, graph.neighbours(node)))
                    .collect(),
            ),
            SkeletonMode::Classic => None,
        };

        for pair in round_edges {
            let (x, y) = (pair.first(), pair.second());
            if !graph.exists_edge(x, y) {
                // Classic mode can have erased this edge earlier in the round.
                continue;
            }

            let mut candidates: BTreeSet<NodeId> = match &snapshot {
                Some(frozen) => frozen.get(&x).cloned().unwrap_or_default(),
                None => graph.neighbours(x),
            };
            candidates.remove(&y);

            if let Some(guide) = options.guide {
                let consistent = consistent_set(guide, x, y);
                candidates.retain(|z| consistent.contains(z));
            }

            if candidates.len() < d {
                continue;
            }

            let candidates: Vec<NodeId> = candidates.into_iter().collect();
            for subset in Combinations::new(&candidates, d) {
                if oracle.is_independent(x, y, &subset, options.alpha)? {
                    trace!(?x, ?y, conditioning = ?subset, "edge removed");
                    graph.erase_edge(x, y);
                    sepsets.record(x, y, subset);
                    break;
                }
            }
        }
        d += 1;
    }

    debug!(
        rounds = d,
        remaining_edges = graph.edge_count(),
        "skeleton learned"
    );
    Ok((graph, sepsets))
}

/// Lexicographic enumeration of the size-`d` subsets of a slice.
///
/// Index-vector walk over the (already deterministically ordered)
/// candidate slice; yields each subset as a sorted `ConditioningSet`.
struct Combinations<'a> {
    items: &'a [NodeId],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    fn new(items: &'a [NodeId], d: usize) -> Self {
        Self {
            items,
            indices: (0..d).collect(),
            done: d > items.len(),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = ConditioningSet;

    fn next(&mut self) -> Option<ConditioningSet> {
        if self.done {
            return None;
        }
        let subset: ConditioningSet = self.indices.iter().map(|&i| self.items[i]).collect();

        // Advance: find the rightmost index that can still move right.
        let d = self.indices.len();
        let mut i = d;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] != i + self.items.len() - d {
                self.indices[i] += 1;
                for j in i + 1..d {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }
        Some(subset)
    }
}
