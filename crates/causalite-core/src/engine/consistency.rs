//! # Consistency iteration (CCS variants)
//!
//! PC and PC-stable fix the skeleton before orientation runs, so the
//! sepsets that justified edge removals can end up inconsistent with the
//! final oriented graph. The consistent-sepset (CCS) approach re-learns
//! the skeleton repeatedly, each time restricting eligible conditioning
//! nodes for a pair (X, Y) to its *consistent set* in the previous
//! iteration's graph: nodes reachable from both endpoints through the
//! graph ignoring arrowheads.
//!
//! The iteration keeps a snapshot of every oriented graph it produces and
//! stops as soon as a new graph structurally equals an earlier one (a
//! fixed point, or the start of a cycle through several graphs). The arc
//! sets of the snapshots inside that cycle are then merged: a pair with
//! arcs in both directions across the cycle is a genuine conflict and both
//! directions are discarded; every other arc is applied to the live
//! skeleton with conflict replacement.
//!
//! Snapshots accumulate until a repeat is found, which is the dominant
//! memory-growth hazard of the approach; the iteration is therefore capped
//! and reports [`LearnError::ResourceExhausted`] instead of growing
//! unbounded.

use std::collections::BTreeSet;

use tracing::debug;

use crate::engine::errors::LearnError;
use crate::engine::graph::{MixedGraph, NodeId};
use crate::engine::oracle::IndependenceOracle;
use crate::engine::orientation::{
    complete_orientations, orient_v_structures, propagate_orientations,
};
use crate::engine::sepset::SepsetTable;
use crate::engine::skeleton::{learn_skeleton, SkeletonMode, SkeletonOptions};

/// The consistent set of a pair (x, y) in a graph: every neighbour z of x
/// (other than y) such that a mixed, orientation-agnostic path leads from
/// z to y without passing back through x.
///
/// A conditioning node outside this set cannot lie on any connecting path
/// between the endpoints in the graph, so a separation attributed to it is
/// suspect; the CCS skeleton passes only condition on consistent nodes.
pub fn consistent_set(graph: &MixedGraph, x: NodeId, y: NodeId) -> BTreeSet<NodeId> {
    graph
        .neighbours(x)
        .into_iter()
        .filter(|&z| z != y)
        .filter(|&z| graph.has_mixed_path(z, y, Some(x)))
        .collect()
}

/// Result of the consistency iteration, before final completion.
#[derive(Debug, Clone)]
pub struct ConsistencyOutcome {
    /// The unrestricted skeleton with the resolved arcs applied. Pairs
    /// whose orientation conflicted across the cycle keep their undirected
    /// edge.
    pub graph: MixedGraph,
    /// Sepsets from the initial, unrestricted skeleton pass.
    pub initial_sepsets: SepsetTable,
    /// Sepsets from the last restricted pass.
    pub final_sepsets: SepsetTable,
    /// Number of restricted iterations performed.
    pub iterations: usize,
}

/// Runs the consistent-sepset iteration on a starting (complete) graph.
///
/// `on_iteration` is invoked with each oriented iteration graph as it is
/// produced, before fixed-point detection.
pub fn run_consistency(
    start: MixedGraph,
    oracle: &dyn IndependenceOracle,
    alpha: f64,
    max_iterations: usize,
    mut on_iteration: Option<&mut dyn FnMut(usize, &MixedGraph)>,
) -> Result<ConsistencyOutcome, LearnError> {
    let unrestricted = SkeletonOptions {
        mode: SkeletonMode::Stable,
        alpha,
        guide: None,
    };
    let (g0, initial_sepsets) = learn_skeleton(start, oracle, &unrestricted)?;

    let mut snapshots: Vec<MixedGraph> = vec![g0.clone()];
    let mut guide = g0.clone();
    let mut final_sepsets = initial_sepsets.clone();

    loop {
        let k = snapshots.len();
        if k > max_iterations {
            return Err(LearnError::ResourceExhausted {
                iterations: max_iterations,
            });
        }

        let restricted = SkeletonOptions {
            mode: SkeletonMode::Stable,
            alpha,
            guide: Some(&guide),
        };
        let (gk, sepsets_k) = learn_skeleton(g0.clone(), oracle, &restricted)?;
        let gk = complete_orientations(propagate_orientations(orient_v_structures(
            gk, &sepsets_k,
        )));
        final_sepsets = sepsets_k;

        if let Some(cb) = on_iteration.as_deref_mut() {
            cb(k, &gk);
        }

        if let Some(j) = snapshots.iter().position(|g| *g == gk) {
            debug!(iterations = k, cycle_start = j, "consistency iteration repeated");
            let graph = resolve_orientations(g0, &snapshots[j..]);
            return Ok(ConsistencyOutcome {
                graph,
                initial_sepsets,
                final_sepsets,
                iterations: k,
            });
        }

        guide = gk.clone();
        snapshots.push(gk);
    }
}

/// Merges the arc sets of the cycle's graphs into the live skeleton.
///
/// Arcs present in both directions across the cycle are conflicts: neither
/// direction is applied and the pair stays an undirected edge. Every other
/// arc overwrites the live state via `edge_to_arc` with conflict
/// replacement, so a later-resolved direction replaces an earlier
/// tentative one instead of coexisting with it.
fn resolve_orientations(mut live: MixedGraph, cycle: &[MixedGraph]) -> MixedGraph {
    let mut union: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
    for graph in cycle {
        union.extend(graph.arcs());
    }

    let mut conflicts = 0usize;
    for &(x, y) in &union {
        if union.contains(&(y, x)) {
            conflicts += 1;
            continue;
        }
        live.edge_to_arc(x, y, true);
    }
    debug!(
        applied = union.len() - conflicts,
        conflicting_pairs = conflicts / 2,
        "orientation conflicts resolved"
    );
    live
}

/// Skeleton-consistency correction: reinstates removed edges whose
/// recorded separation is not itself consistent in the final graph.
///
/// A removal is justified if some recorded separating set for the pair
/// lies entirely inside the consistent set of the pair, in either endpoint
/// ordering. Unjustified removals get their edge back rather than being
/// silently lost: a recall-improving correction at the cost of
/// re-introducing some edges.
pub fn reinstate_inconsistent_removals(
    mut graph: MixedGraph,
    final_sepsets: &SepsetTable,
) -> MixedGraph {
    let missing = graph.missing_edges();
    let mut reinstated = 0usize;

    for pair in missing {
        let (x, y) = (pair.first(), pair.second());
        let forward = consistent_set(&graph, x, y);
        let backward = consistent_set(&graph, y, x);
        let justified = final_sepsets.sepsets(x, y).iter().any(|sep| {
            sep.iter().all(|z| forward.contains(z)) || sep.iter().all(|z| backward.contains(z))
        });
        if !justified {
            graph.add_edge(x, y);
            reinstated += 1;
        }
    }

    debug!(reinstated, "skeleton consistency applied");
    graph
}
