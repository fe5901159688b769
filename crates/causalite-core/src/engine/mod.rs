//! The learning engine.
//!
//! This module provides:
//! - **errors**: error taxonomy for learn failures
//! - **graph**: the mixed graph (edges + arcs) the algorithms mutate
//! - **sepset**: separating-set bookkeeping
//! - **oracle**: the conditional-independence seam
//! - **skeleton**: phase 1, edge removal (classic and stable modes)
//! - **orientation**: phases 2 and 3, collider detection, propagation and
//!   greedy completion
//! - **consistency**: the CCS fixed-point iteration and its corrections
//! - **structure**: materialization into a directed acyclic structure
//! - **learner**: the variant-selecting pipeline

pub mod consistency;
pub mod errors;
pub mod graph;
pub mod learner;
pub mod oracle;
pub mod orientation;
pub mod sepset;
pub mod skeleton;
pub mod structure;
