//! # Causalite Core
//!
//! Constraint-based causal-structure learning: given a
//! conditional-independence oracle over observed variables, infer a graph
//! whose edges and orientations approximate the causal network that
//! generated the data.
//!
//! The crate implements the PC family:
//!
//! - **PC**: the original order-dependent algorithm
//! - **PC-stable**: per-round neighbour snapshots, order independent
//! - **CCS orientation / CCS skeleton**: consistent-sepset variants that
//!   iterate skeleton learning and orientation to a fixed point and
//!   resolve conflicting orientations across iterations
//!
//! Statistical testing lives outside the crate behind the
//! [`IndependenceOracle`] trait; the output is a [`BayesianStructure`],
//! a cycle-checked DAG with per-variable cardinalities.
//!
//! ## Example
//!
//! ```rust,ignore
//! use causalite_core::{CausalLearner, LearnerConfig, Variant};
//!
//! let mut learner = CausalLearner::new(Variant::PcStable, LearnerConfig::default());
//! let structure = learner.learn((0..10).map(NodeId), &my_oracle)?;
//! ```

pub mod engine;
pub mod metrics;

// Re-export commonly used types
pub use engine::errors::LearnError;
pub use engine::graph::{MixedGraph, NodeId, NodePair};
pub use engine::learner::{CausalLearner, Checkpoint, LearnerConfig, Variant};
pub use engine::oracle::{FnOracle, IndependenceOracle};
pub use engine::sepset::{ConditioningSet, SepsetTable};
pub use engine::structure::BayesianStructure;
