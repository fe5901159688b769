//! # Edge orientation (phases 2 and 3)
//!
//! Phase 2 turns the learned skeleton into a partially directed graph:
//! rule R1 orients colliders from the sepset table, then rules R2 and R3
//! propagate orientations to a fixed point without creating new
//! v-structures or cycles. Phase 3 greedily converts whatever edges remain
//! into arcs, preferring the direction that does not introduce a collider.
//!
//! R1 works from a fixed snapshot of the skeleton: all collider
//! orientations are collected before any is applied, so an early
//! orientation cannot suppress detection of a later one. Where two
//! colliders disagree on the direction of a shared edge, the first one in
//! deterministic order wins and the loser is skipped (the pair is already
//! an arc by then).

use tracing::{debug, trace};

use crate::engine::graph::{MixedGraph, NodeId};
use crate::engine::sepset::SepsetTable;

/// Rule R1: orients unshielded triples X—Z—Y with Z outside sepset(X, Y)
/// as colliders X→Z←Y.
///
/// Detection runs entirely on the incoming graph; orientations are applied
/// afterwards, and only where the pair is still an undirected edge.
pub fn orient_v_structures(mut graph: MixedGraph, sepsets: &SepsetTable) -> MixedGraph {
    let mut into_z: Vec<(NodeId, NodeId)> = Vec::new();

    for z in graph.nodes().collect::<Vec<_>>() {
        let nbrs: Vec<NodeId> = graph.neighbours(z).into_iter().collect();
        for (i, &x) in nbrs.iter().enumerate() {
            for &y in &nbrs[i + 1..] {
                if graph.adjacent(x, y) {
                    continue;
                }
                if !sepsets.separates_via(x, y, z) {
                    trace!(?x, ?y, collider = ?z, "v-structure detected");
                    into_z.push((x, z));
                    into_z.push((y, z));
                }
            }
        }
    }

    let count = into_z.len() / 2;
    for (x, z) in into_z {
        if graph.exists_edge(x, z) {
            graph.edge_to_arc(x, z, false);
        }
    }
    debug!(v_structures = count, "collider orientation applied");
    graph
}

/// Rules R2 and R3, applied repeatedly until a full pass fires neither.
///
/// R2: for non-adjacent X, Y with a common neighbour Z where X→Z is an arc
/// and Z—Y is still an edge, orient Z→Y (the alternative would create a
/// new v-structure at Z).
///
/// R3: for X, Y still joined by an edge with a directed path X⇝Y, orient
/// X→Y (the alternative would close a cycle).
///
/// Every firing converts one edge into an arc, so the pass count is
/// bounded by the number of remaining edges; the loop also exits early
/// once no edges remain.
pub fn propagate_orientations(mut graph: MixedGraph) -> MixedGraph {
    let pairs: Vec<(NodeId, NodeId)> = {
        let ids: Vec<NodeId> = graph.nodes().collect();
        let mut out = Vec::new();
        for (i, &x) in ids.iter().enumerate() {
            for &y in &ids[i + 1..] {
                out.push((x, y));
            }
        }
        out
    };

    loop {
        let mut was_oriented = false;

        for &(x, y) in &pairs {
            if !graph.adjacent(x, y) {
                let shared: Vec<NodeId> = graph
                    .neighbours(x)
                    .intersection(&graph.neighbours(y))
                    .copied()
                    .collect();
                for z in shared {
                    if graph.exists_arc(x, z) && graph.exists_edge(z, y) {
                        trace!(from = ?z, to = ?y, "R2 fired");
                        graph.edge_to_arc(z, y, false);
                        was_oriented = true;
                    } else if graph.exists_arc(y, z) && graph.exists_edge(z, x) {
                        trace!(from = ?z, to = ?x, "R2 fired");
                        graph.edge_to_arc(z, x, false);
                        was_oriented = true;
                    }
                }
            } else if graph.exists_edge(x, y) && graph.has_directed_path(x, y) {
                trace!(from = ?x, to = ?y, "R3 fired");
                graph.edge_to_arc(x, y, false);
                was_oriented = true;
            } else if graph.exists_edge(x, y) && graph.has_directed_path(y, x) {
                trace!(from = ?y, to = ?x, "R3 fired");
                graph.edge_to_arc(y, x, false);
                was_oriented = true;
            }
        }

        if !was_oriented || graph.edge_count() == 0 {
            break;
        }
    }

    debug!(remaining_edges = graph.edge_count(), "propagation reached fixed point");
    graph
}

/// Phase 3: greedy completion of the remaining edges.
///
/// For each remaining edge (x, y) in deterministic order, tentatively
/// orient y→x; if some other neighbour z of y carries an arc z→y and is
/// not adjacent to x, orienting x→y would have created the new v-structure
/// z→y←x, so y→x is kept; otherwise the orientation falls back to x→y.
///
/// The processing order over edges affects the specific DAG produced
/// (though not typically its Markov-equivalence class); downstream
/// structural-Hamming comparisons are sensitive to it, which is why the
/// try-one-direction-then-fall-back logic is preserved exactly.
pub fn complete_orientations(mut graph: MixedGraph) -> MixedGraph {
    let remaining: Vec<_> = graph.edges().collect();
    let count = remaining.len();

    for pair in remaining {
        let (x, y) = (pair.first(), pair.second());
        graph.erase_edge(x, y);

        let keeps_reverse = graph
            .neighbours(y)
            .into_iter()
            .any(|z| z != x && graph.exists_arc(z, y) && !graph.adjacent(z, x));
        if keeps_reverse {
            graph.add_arc(y, x);
        } else {
            graph.add_arc(x, y);
        }
    }

    debug!(completed_edges = count, "orientation completed");
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sepset::ConditioningSet;

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    /// Skeleton 0—2—1 with sepset(0, 1) = {} (empty: removal at d = 0).
    fn collider_skeleton() -> (MixedGraph, SepsetTable) {
        let mut g = MixedGraph::complete((0..3).map(NodeId));
        g.erase_edge(n(0), n(1));
        let mut sepsets = SepsetTable::for_graph(&g);
        sepsets.record(n(0), n(1), ConditioningSet::new());
        (g, sepsets)
    }

    #[test]
    fn r1_orients_collider_when_z_outside_sepset() {
        let (g, sepsets) = collider_skeleton();
        let g = orient_v_structures(g, &sepsets);

        assert!(g.exists_arc(n(0), n(2)));
        assert!(g.exists_arc(n(1), n(2)));
        assert!(!g.exists_edge(n(0), n(2)));
        assert!(!g.exists_edge(n(1), n(2)));
    }

    #[test]
    fn r1_leaves_triple_alone_when_z_in_sepset() {
        let mut g = MixedGraph::complete((0..3).map(NodeId));
        g.erase_edge(n(0), n(1));
        let mut sepsets = SepsetTable::for_graph(&g);
        let mut sep = ConditioningSet::new();
        sep.push(n(2));
        sepsets.record(n(0), n(1), sep);

        let g = orient_v_structures(g, &sepsets);
        assert!(g.exists_edge(n(0), n(2)));
        assert!(g.exists_edge(n(1), n(2)));
        assert_eq!(g.arcs().count(), 0);
    }

    #[test]
    fn r1_skips_shielded_triples() {
        // Complete triangle: no unshielded triple, nothing to orient.
        let g = MixedGraph::complete((0..3).map(NodeId));
        let sepsets = SepsetTable::for_graph(&g);

        let g = orient_v_structures(g, &sepsets);
        assert_eq!(g.arcs().count(), 0);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn r1_detection_uses_fixed_snapshot() {
        // Two overlapping unshielded triples around 2: 0—2—1 and 0—2—3,
        // with both (0,1) and (0,3) separated without 2. Applying the first
        // collider must not hide the second from detection.
        let mut g = MixedGraph::new();
        for id in 0..4 {
            g.add_node(n(id));
        }
        g.add_edge(n(0), n(2));
        g.add_edge(n(1), n(2));
        g.add_edge(n(3), n(2));
        let mut sepsets = SepsetTable::for_graph(&g);
        sepsets.record(n(0), n(1), ConditioningSet::new());
        sepsets.record(n(0), n(3), ConditioningSet::new());
        sepsets.record(n(1), n(3), ConditioningSet::new());

        let g = orient_v_structures(g, &sepsets);
        for id in [0, 1, 3] {
            assert!(g.exists_arc(n(id), n(2)), "expected arc {id}->2");
        }
    }

    #[test]
    fn r2_orients_to_avoid_new_v_structure() {
        // 0→2 arc, 2—1 edge, 0 and 1 non-adjacent: R2 must orient 2→1.
        let mut g = MixedGraph::new();
        for id in 0..3 {
            g.add_node(n(id));
        }
        g.add_arc(n(0), n(2));
        g.add_edge(n(2), n(1));

        let g = propagate_orientations(g);
        assert!(g.exists_arc(n(2), n(1)));
        assert!(!g.exists_edge(n(2), n(1)));
    }

    #[test]
    fn r3_orients_to_avoid_cycle() {
        // Arcs 0→1→2 and an edge 0—2: orienting 2→0 would close a cycle.
        let mut g = MixedGraph::new();
        for id in 0..3 {
            g.add_node(n(id));
        }
        g.add_arc(n(0), n(1));
        g.add_arc(n(1), n(2));
        g.add_edge(n(0), n(2));

        let g = propagate_orientations(g);
        assert!(g.exists_arc(n(0), n(2)));
        assert!(!g.exists_edge(n(0), n(2)));
    }

    #[test]
    fn propagation_cascades_r2_through_a_chain() {
        // 0→1, then edges 1—2—3 with non-adjacent antecedents: R2 should
        // ripple the orientation down the chain across passes.
        let mut g = MixedGraph::new();
        for id in 0..4 {
            g.add_node(n(id));
        }
        g.add_arc(n(0), n(1));
        g.add_edge(n(1), n(2));
        g.add_edge(n(2), n(3));

        let g = propagate_orientations(g);
        assert!(g.exists_arc(n(1), n(2)));
        assert!(g.exists_arc(n(2), n(3)));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn propagation_terminates_when_no_rule_applies() {
        // A lone edge with no arcs anywhere: neither rule can fire.
        let mut g = MixedGraph::new();
        g.add_node(n(0));
        g.add_node(n(1));
        g.add_edge(n(0), n(1));

        let g = propagate_orientations(g);
        assert!(g.exists_edge(n(0), n(1)));
    }

    #[test]
    fn completion_keeps_reverse_when_forward_would_create_collider() {
        // 2→1 arc, 0—1 edge, 2 and 0 non-adjacent. Trying 1→0 first: z=2
        // has an arc into 1 and no adjacency with 0, so orienting 0→1
        // would create the collider 2→1←0; keep 1→0.
        let mut g = MixedGraph::new();
        for id in 0..3 {
            g.add_node(n(id));
        }
        g.add_arc(n(2), n(1));
        g.add_edge(n(0), n(1));

        let g = complete_orientations(g);
        assert!(g.exists_arc(n(1), n(0)));
        assert!(!g.exists_arc(n(0), n(1)));
    }

    #[test]
    fn completion_falls_back_to_forward_direction() {
        // No arcs into 1: the tentative 1→0 is reverted to 0→1.
        let mut g = MixedGraph::new();
        g.add_node(n(0));
        g.add_node(n(1));
        g.add_edge(n(0), n(1));

        let g = complete_orientations(g);
        assert!(g.exists_arc(n(0), n(1)));
        assert!(!g.exists_arc(n(1), n(0)));
    }

    #[test]
    fn completion_leaves_no_edges() {
        let g = MixedGraph::complete((0..5).map(NodeId));
        let g = complete_orientations(g);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.arcs().count(), 10);
    }
}
