//! # Mixed graph
//!
//! This module implements the mixed graph the PC family operates on: a set
//! of nodes connected by undirected edges (undetermined relationships) and
//! directed arcs (causal influences) at the same time.
//!
//! ## Key components
//!
//! - **NodeId**: stable, ordered node identifier
//! - **NodePair**: canonical unordered pair, the key type for edges and
//!   sepset lookups
//! - **MixedGraph**: the graph itself, with adjacency and path queries and
//!   the `edge_to_arc` orientation primitive
//!
//! ## Design
//!
//! Edge and arc sets are `BTreeSet`s so that iteration order is stable and
//! structural equality is plain set equality. Deterministic iteration is
//! part of the contract: the skeleton and completion phases are
//! order-sensitive, and the same input must always produce the same learned
//! graph.
//!
//! ## Invariant
//!
//! A pair of nodes is connected by at most one of {edge, arc u→v, arc v→u}
//! at any time. Mutation methods keep this invariant locally; the only
//! sanctioned transient violation is during conflict resolution in the
//! consistency iterator, which uses `edge_to_arc` with conflict replacement
//! to resolve it immediately.

use std::collections::BTreeSet;
use std::collections::VecDeque;

use rustc_hash::FxHashSet;

/// A unique identifier for a node (random variable) in the mixed graph.
///
/// NodeId implements Ord/PartialOrd for stable, deterministic iteration.
/// Uses u32 internally for efficient storage and indexing.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

/// A canonical unordered pair of nodes.
///
/// The constructor sorts its endpoints, so `NodePair::new(x, y)` and
/// `NodePair::new(y, x)` are the same key. Used for edges and for sepset
/// table lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct NodePair(NodeId, NodeId);

impl NodePair {
    /// Creates a canonical pair from two distinct nodes.
    pub fn new(x: NodeId, y: NodeId) -> Self {
        debug_assert_ne!(x, y, "self-pairs are not valid graph pairs");
        if x <= y { NodePair(x, y) } else { NodePair(y, x) }
    }

    /// The smaller endpoint.
    pub fn first(&self) -> NodeId {
        self.0
    }

    /// The larger endpoint.
    pub fn second(&self) -> NodeId {
        self.1
    }

    /// Given one endpoint, returns the other.
    pub fn other(&self, node: NodeId) -> NodeId {
        if node == self.0 { self.1 } else { self.0 }
    }
}

/// A graph holding undirected edges and directed arcs simultaneously.
///
/// Lifecycle over one `learn` call: created complete (every pair joined by
/// an edge), edges progressively erased during skeleton learning, then
/// progressively converted to arcs during orientation. The
/// skeleton-consistency variant is the one place an erased edge can be
/// reinstated.
///
/// Structural equality (`==`) compares node, edge and arc sets; the
/// consistency iterator relies on it for fixed-point detection, so
/// snapshots must be owned clones, never aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MixedGraph {
    nodes: BTreeSet<NodeId>,
    edges: BTreeSet<NodePair>,
    arcs: BTreeSet<(NodeId, NodeId)>,
}

impl MixedGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a complete graph: every pair of the given nodes joined by an
    /// undirected edge. This is the starting point of every learn call.
    pub fn complete(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        let ids: Vec<NodeId> = graph.nodes.iter().copied().collect();
        for (i, &x) in ids.iter().enumerate() {
            for &y in &ids[i + 1..] {
                graph.add_edge(x, y);
            }
        }
        graph
    }

    /// Adds a node. Idempotent.
    pub fn add_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// Adds an undirected edge between two existing nodes. Idempotent.
    pub fn add_edge(&mut self, x: NodeId, y: NodeId) {
        debug_assert!(self.nodes.contains(&x) && self.nodes.contains(&y));
        self.edges.insert(NodePair::new(x, y));
    }

    /// Adds a directed arc x→y. Idempotent.
    pub fn add_arc(&mut self, x: NodeId, y: NodeId) {
        debug_assert!(self.nodes.contains(&x) && self.nodes.contains(&y));
        self.arcs.insert((x, y));
    }

    /// Removes the edge between x and y, if present.
    pub fn erase_edge(&mut self, x: NodeId, y: NodeId) {
        self.edges.remove(&NodePair::new(x, y));
    }

    /// Removes the arc x→y, if present.
    pub fn erase_arc(&mut self, x: NodeId, y: NodeId) {
        self.arcs.remove(&(x, y));
    }

    /// True iff an undirected edge joins x and y.
    pub fn exists_edge(&self, x: NodeId, y: NodeId) -> bool {
        self.edges.contains(&NodePair::new(x, y))
    }

    /// True iff the directed arc x→y exists.
    pub fn exists_arc(&self, x: NodeId, y: NodeId) -> bool {
        self.arcs.contains(&(x, y))
    }

    /// True iff x and y are adjacent: joined by an edge or by an arc in
    /// either direction.
    pub fn adjacent(&self, x: NodeId, y: NodeId) -> bool {
        self.exists_edge(x, y) || self.exists_arc(x, y) || self.exists_arc(y, x)
    }

    /// The adjacent set of a node: every node connected to it by an edge or
    /// by an arc in either direction, in ascending id order.
    pub fn neighbours(&self, node: NodeId) -> BTreeSet<NodeId> {
        let mut out = BTreeSet::new();
        for pair in &self.edges {
            if pair.first() == node || pair.second() == node {
                out.insert(pair.other(node));
            }
        }
        for &(src, dst) in &self.arcs {
            if src == node {
                out.insert(dst);
            } else if dst == node {
                out.insert(src);
            }
        }
        out
    }

    /// Number of adjacent nodes.
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbours(node).len()
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Undirected edges in canonical order.
    pub fn edges(&self) -> impl Iterator<Item = NodePair> + '_ {
        self.edges.iter().copied()
    }

    /// Directed arcs in canonical order.
    pub fn arcs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.arcs.iter().copied()
    }

    /// Number of remaining undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Pairs of nodes that are present in the complete graph over this
    /// graph's nodes but carry neither an edge nor an arc here.
    pub fn missing_edges(&self) -> Vec<NodePair> {
        let ids: Vec<NodeId> = self.nodes.iter().copied().collect();
        let mut out = Vec::new();
        for (i, &x) in ids.iter().enumerate() {
            for &y in &ids[i + 1..] {
                if !self.adjacent(x, y) {
                    out.push(NodePair::new(x, y));
                }
            }
        }
        out
    }

    /// Atomically replaces the edge x—y with the arc x→y.
    ///
    /// With `replace_conflicts`, an existing opposing arc y→x is erased
    /// first; this mode is used when merging consistency-iteration results
    /// that may disagree on direction, so a later-resolved orientation
    /// overwrites an earlier tentative one instead of coexisting with it.
    pub fn edge_to_arc(&mut self, x: NodeId, y: NodeId, replace_conflicts: bool) {
        if replace_conflicts {
            self.erase_arc(y, x);
        }
        self.erase_edge(x, y);
        self.add_arc(x, y);
    }

    /// True iff a directed path of arcs leads from `from` to `to`.
    ///
    /// Used to keep orientation from closing a cycle (rule R3) and by the
    /// materializer's acyclicity check.
    pub fn has_directed_path(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return false;
        }
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([from]);
        seen.insert(from);
        while let Some(current) = queue.pop_front() {
            for &(src, dst) in &self.arcs {
                if src != current || !seen.insert(dst) {
                    continue;
                }
                if dst == to {
                    return true;
                }
                queue.push_back(dst);
            }
        }
        false
    }

    /// True iff a path of edges and/or arcs, ignoring arc direction,
    /// connects `from` to `to` without passing through `avoid`.
    ///
    /// This is the orientation-agnostic reachability the consistency checks
    /// are built on; `avoid` lets the consistent-set computation exclude an
    /// endpoint without cloning the graph.
    pub fn has_mixed_path(&self, from: NodeId, to: NodeId, avoid: Option<NodeId>) -> bool {
        if from == to {
            return false;
        }
        if Some(from) == avoid || Some(to) == avoid {
            return false;
        }
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([from]);
        seen.insert(from);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbours(current) {
                if Some(next) == avoid || !seen.insert(next) {
                    continue;
                }
                if next == to {
                    return true;
                }
                queue.push_back(next);
            }
        }
        false
    }
}
