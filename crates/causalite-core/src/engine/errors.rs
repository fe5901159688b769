//! Error types for causal-structure learning.

use thiserror::Error;

/// Errors that can occur while learning a causal structure.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// `learn` is the only boundary that converts internal structural
/// inconsistency into a reported error: the individual phases (skeleton,
/// orientation, completion) always leave the graph in a well-defined state
/// for the next phase and never raise domain errors themselves.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LearnError {
    /// The completed graph could not be materialized as an acyclic
    /// structure. Recoverable by the caller (retry with different data, or
    /// count as a failure in a robustness loop).
    #[error("learning failed: {0}")]
    LearningFailed(String),

    /// Consistency iteration exceeded its snapshot/iteration bound without
    /// reaching a fixed point. Raised explicitly instead of letting the
    /// snapshot list grow until allocation failure.
    #[error("consistency iteration did not reach a fixed point within {iterations} iterations")]
    ResourceExhausted {
        /// The iteration bound that was hit.
        iterations: usize,
    },

    /// The independence oracle failed (e.g., the test is undefined for a
    /// degenerate conditioning set). Propagated as a hard error; a
    /// well-formed dataset should never trigger this.
    #[error("independence oracle error: {0}")]
    Oracle(String),
}
