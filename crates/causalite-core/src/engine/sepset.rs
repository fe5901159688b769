//! Sepset bookkeeping for skeleton learning.
//!
//! When an edge X—Y is erased because X ⟂ Y | Z for some conditioning set
//! Z, the skeleton learner records Z here. The orientation phase reads the
//! table to decide colliders (rule R1), and the skeleton-consistency
//! variant re-reads it when deciding whether a removed edge should be
//! reinstated.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::engine::graph::{MixedGraph, NodeId, NodePair};

/// A conditioning set, kept sorted so two enumerations of the same subset
/// compare equal. Inline capacity of 4 covers the conditioning-set sizes
/// seen in practice (d rarely exceeds 3).
pub type ConditioningSet = SmallVec<[NodeId; 4]>;

/// Mapping from unordered node pair to the conditioning sets found to
/// separate that pair.
///
/// Every pair of the starting graph gets an entry up front: an empty list
/// means "tested, no separating set found", which is distinct from "pair
/// never initialized", a state the orientation phase must never observe.
#[derive(Debug, Clone, Default)]
pub struct SepsetTable {
    table: FxHashMap<NodePair, Vec<ConditioningSet>>,
}

impl SepsetTable {
    /// Creates a table with an empty entry for every pair of nodes in the
    /// given graph.
    pub fn for_graph(graph: &MixedGraph) -> Self {
        let ids: Vec<NodeId> = graph.nodes().collect();
        let mut table = FxHashMap::default();
        for (i, &x) in ids.iter().enumerate() {
            for &y in &ids[i + 1..] {
                table.insert(NodePair::new(x, y), Vec::new());
            }
        }
        Self { table }
    }

    /// Records a separating set for a pair. The set is sorted on insertion
    /// so membership and equality checks are representation-independent.
    pub fn record(&mut self, x: NodeId, y: NodeId, mut sepset: ConditioningSet) {
        sepset.sort_unstable();
        self.table.entry(NodePair::new(x, y)).or_default().push(sepset);
    }

    /// The separating sets recorded for a pair, in discovery order.
    pub fn sepsets(&self, x: NodeId, y: NodeId) -> &[ConditioningSet] {
        self.table
            .get(&NodePair::new(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True iff `z` appears in at least one separating set recorded for the
    /// pair (x, y). Rule R1 orients a collider at z exactly when this is
    /// false for an unshielded triple x—z—y.
    pub fn separates_via(&self, x: NodeId, y: NodeId, z: NodeId) -> bool {
        self.sepsets(x, y).iter().any(|s| s.contains(&z))
    }

    /// True iff at least one separating set was recorded for the pair.
    pub fn has_sepset(&self, x: NodeId, y: NodeId) -> bool {
        !self.sepsets(x, y).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    #[test]
    fn every_pair_initialized_empty() {
        let g = MixedGraph::complete((0..3).map(NodeId));
        let t = SepsetTable::for_graph(&g);
        assert!(t.sepsets(n(0), n(1)).is_empty());
        assert!(t.sepsets(n(2), n(0)).is_empty());
        assert!(!t.has_sepset(n(1), n(2)));
    }

    #[test]
    fn record_is_order_insensitive() {
        let g = MixedGraph::complete((0..4).map(NodeId));
        let mut t = SepsetTable::for_graph(&g);
        t.record(n(1), n(0), smallvec![n(3), n(2)]);

        assert!(t.separates_via(n(0), n(1), n(2)));
        assert!(t.separates_via(n(1), n(0), n(3)));
        assert!(!t.separates_via(n(0), n(1), n(0)));
        assert_eq!(t.sepsets(n(0), n(1))[0].as_slice(), &[n(2), n(3)]);
    }

    #[test]
    fn empty_sepset_is_recorded_not_missing() {
        let g = MixedGraph::complete((0..2).map(NodeId));
        let mut t = SepsetTable::for_graph(&g);
        t.record(n(0), n(1), ConditioningSet::new());

        assert!(t.has_sepset(n(0), n(1)));
        assert!(!t.separates_via(n(0), n(1), n(0)));
    }
}
