//! The conditional-independence oracle the skeleton learner consumes.
//!
//! Statistical testing is deliberately outside this crate: the oracle is an
//! external collaborator (a chi-squared learner over a dataset, a
//! d-separation query over a known structure, a cached test service, ...)
//! and the core treats it as a pure boolean function of its inputs.

use crate::engine::errors::LearnError;
use crate::engine::graph::NodeId;

/// Answers conditional-independence queries over named variables.
///
/// Implementations must be pure with respect to the learner: the same
/// `(x, y, conditioning, alpha)` query must always return the same answer
/// within one `learn` call, and the oracle must not observe or depend on
/// graph state.
pub trait IndependenceOracle {
    /// True iff `x` and `y` are independent given `conditioning` at
    /// significance threshold `alpha`.
    ///
    /// Errors are hard failures (e.g., the test is undefined for a
    /// degenerate conditioning set) and abort the learn call.
    fn is_independent(
        &self,
        x: NodeId,
        y: NodeId,
        conditioning: &[NodeId],
        alpha: f64,
    ) -> Result<bool, LearnError>;
}

/// Adapter turning a plain closure into an oracle. Handy in tests and for
/// callers whose test backend is already wrapped in a function.
pub struct FnOracle<F>(pub F);

impl<F> IndependenceOracle for FnOracle<F>
where
    F: Fn(NodeId, NodeId, &[NodeId], f64) -> Result<bool, LearnError>,
{
    fn is_independent(
        &self,
        x: NodeId,
        y: NodeId,
        conditioning: &[NodeId],
        alpha: f64,
    ) -> Result<bool, LearnError> {
        (self.0)(x, y, conditioning, alpha)
    }
}
