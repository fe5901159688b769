//! # The learning pipeline
//!
//! One `CausalLearner` runs the whole PC pipeline for a chosen variant:
//!
//! - `Pc`: classic skeleton, orientation, completion
//! - `PcStable`: order-independent skeleton, otherwise identical
//! - `CcsOrientation`: consistency iteration, then completion
//! - `CcsSkeleton`: consistency iteration, re-orientation, completion,
//!   then sepset-justified edge re-insertion
//!
//! Variants are selected by configuration, not by subtyping: each phase is
//! a free function over graph values and the pipeline merely sequences
//! them. A learner owns its graph, sepset table and learned structure;
//! `reset` reinitializes all of it from the construction parameters, so a
//! single instance can be reused across thousands of learn calls without
//! cross-contamination.
//!
//! `learn` is the error boundary: internal phases always leave the graph
//! well-defined, and only materialization converts structural trouble into
//! a reported [`LearnError::LearningFailed`].

use tracing::debug;

use crate::engine::consistency::{reinstate_inconsistent_removals, run_consistency};
use crate::engine::errors::LearnError;
use crate::engine::graph::{MixedGraph, NodeId};
use crate::engine::oracle::IndependenceOracle;
use crate::engine::orientation::{
    complete_orientations, orient_v_structures, propagate_orientations,
};
use crate::engine::sepset::SepsetTable;
use crate::engine::skeleton::{learn_skeleton, SkeletonMode, SkeletonOptions};
use crate::engine::structure::BayesianStructure;

/// Which member of the PC family to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Original PC: live neighbour sets, order-dependent skeleton.
    Pc,
    /// PC-stable: per-round neighbour snapshots.
    PcStable,
    /// Consistent-sepset iteration resolving orientation conflicts.
    CcsOrientation,
    /// `CcsOrientation` plus sepset-justified edge re-insertion.
    CcsSkeleton,
}

/// Construction parameters for a learner.
#[derive(Debug, Clone)]
pub struct LearnerConfig {
    /// Significance threshold handed to the independence oracle.
    pub alpha: f64,
    /// Cardinality attached to every materialized variable.
    pub nb_values: u32,
    /// Label used in reporting.
    pub name: String,
    /// Cap on consistency iterations before `ResourceExhausted`.
    pub max_iterations: usize,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            nb_values: 2,
            name: "PC".into(),
            max_iterations: 64,
        }
    }
}

/// Named checkpoints at which the optional observer is invoked with the
/// current graph. Replaces ad-hoc side effects (image dumps, progress
/// prints) embedded in the algorithm's control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// The complete starting graph has been built.
    Initialized,
    /// Phase 1 finished.
    SkeletonLearned,
    /// Rule R1 applied.
    VStructuresOriented,
    /// Rules R2/R3 reached their fixed point.
    Propagated,
    /// Phase 3 finished; no undirected edges remain (re-insertion aside).
    Completed,
    /// One consistency iteration produced an oriented graph.
    ConsistencyIteration(usize),
    /// The graph handed to the materializer.
    Final,
}

/// Observer callback type; see [`Checkpoint`].
pub type GraphObserver = Box<dyn FnMut(Checkpoint, &MixedGraph)>;

/// A reusable PC-family learner instance.
pub struct CausalLearner {
    variant: Variant,
    config: LearnerConfig,
    graph: MixedGraph,
    sepsets: SepsetTable,
    learned: Option<BayesianStructure>,
    observer: Option<GraphObserver>,
}

impl CausalLearner {
    /// Creates a learner for the given variant and parameters.
    pub fn new(variant: Variant, config: LearnerConfig) -> Self {
        Self {
            variant,
            config,
            graph: MixedGraph::new(),
            sepsets: SepsetTable::default(),
            learned: None,
            observer: None,
        }
    }

    /// Installs an observer invoked at named checkpoints.
    pub fn with_observer(mut self, observer: GraphObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The variant this learner runs.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The reporting label.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The graph as left by the last learn call.
    pub fn graph(&self) -> &MixedGraph {
        &self.graph
    }

    /// The sepset table of the last learn call.
    pub fn sepsets(&self) -> &SepsetTable {
        &self.sepsets
    }

    /// The structure learned by the last successful learn call.
    pub fn learned(&self) -> Option<&BayesianStructure> {
        self.learned.as_ref()
    }

    /// Reinitializes all owned state from the construction parameters.
    /// Configuration and observer survive; graph, sepsets and learned
    /// structure are dropped.
    pub fn reset(&mut self) {
        self.graph = MixedGraph::new();
        self.sepsets = SepsetTable::default();
        self.learned = None;
    }

    /// Runs the configured pipeline over the given variables.
    ///
    /// On success the learned structure is stored on the instance and
    /// returned by reference. On failure the graph holds the state of the
    /// most recent checkpoint (the complete starting graph, the last
    /// consistency iteration, or the completed graph that failed to
    /// materialize), which callers can inspect for diagnostics.
    pub fn learn(
        &mut self,
        nodes: impl IntoIterator<Item = NodeId>,
        oracle: &dyn IndependenceOracle,
    ) -> Result<&BayesianStructure, LearnError> {
        self.reset();

        self.graph = MixedGraph::complete(nodes);
        notify(&mut self.observer, Checkpoint::Initialized, &self.graph);
        debug!(
            name = %self.config.name,
            variant = ?self.variant,
            nodes = self.graph.nodes().count(),
            "learning started"
        );

        match self.variant {
            Variant::Pc | Variant::PcStable => self.run_linear(oracle)?,
            Variant::CcsOrientation => {
                let outcome = self.run_iterated(oracle)?;
                self.sepsets = outcome.initial_sepsets;
                self.graph = complete_orientations(outcome.graph);
                notify(&mut self.observer, Checkpoint::Completed, &self.graph);
            }
            Variant::CcsSkeleton => {
                let outcome = self.run_iterated(oracle)?;
                let graph = orient_v_structures(outcome.graph, &outcome.initial_sepsets);
                notify(&mut self.observer, Checkpoint::VStructuresOriented, &graph);
                let graph = propagate_orientations(graph);
                notify(&mut self.observer, Checkpoint::Propagated, &graph);
                let graph = complete_orientations(graph);
                notify(&mut self.observer, Checkpoint::Completed, &graph);
                self.graph = reinstate_inconsistent_removals(graph, &outcome.final_sepsets);
                self.sepsets = outcome.initial_sepsets;
            }
        };

        notify(&mut self.observer, Checkpoint::Final, &self.graph);
        let structure = BayesianStructure::from_graph(&self.graph, self.config.nb_values)?;
        debug!(name = %self.config.name, "learning finished");
        Ok(self.learned.insert(structure))
    }

    /// The linear PC / PC-stable pipeline.
    fn run_linear(&mut self, oracle: &dyn IndependenceOracle) -> Result<(), LearnError> {
        let mode = match self.variant {
            Variant::Pc => SkeletonMode::Classic,
            _ => SkeletonMode::Stable,
        };
        let options = SkeletonOptions {
            mode,
            alpha: self.config.alpha,
            guide: None,
        };

        let (graph, sepsets) = learn_skeleton(self.graph.clone(), oracle, &options)?;
        notify(&mut self.observer, Checkpoint::SkeletonLearned, &graph);

        let graph = orient_v_structures(graph, &sepsets);
        notify(&mut self.observer, Checkpoint::VStructuresOriented, &graph);

        let graph = propagate_orientations(graph);
        notify(&mut self.observer, Checkpoint::Propagated, &graph);

        let graph = complete_orientations(graph);
        notify(&mut self.observer, Checkpoint::Completed, &graph);

        self.sepsets = sepsets;
        self.graph = graph;
        Ok(())
    }

    /// The consistency iteration shared by both CCS variants. Each
    /// iteration graph is committed to `self.graph` before the observer
    /// runs, so a failing iteration leaves the last produced graph behind.
    fn run_iterated(
        &mut self,
        oracle: &dyn IndependenceOracle,
    ) -> Result<crate::engine::consistency::ConsistencyOutcome, LearnError> {
        let start = self.graph.clone();
        let observer = &mut self.observer;
        let committed = &mut self.graph;
        let mut hook = |k: usize, g: &MixedGraph| {
            *committed = g.clone();
            if let Some(cb) = observer.as_mut() {
                cb(Checkpoint::ConsistencyIteration(k), g);
            }
        };
        run_consistency(
            start,
            oracle,
            self.config.alpha,
            self.config.max_iterations,
            Some(&mut hook),
        )
    }
}

fn notify(observer: &mut Option<GraphObserver>, checkpoint: Checkpoint, graph: &MixedGraph) {
    if let Some(cb) = observer.as_mut() {
        cb(checkpoint, graph);
    }
}
