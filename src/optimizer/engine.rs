use crate::error::SolverError;

/// Handle to a variable owned by a [`SolverEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

/// Minimal LP backend needed to build and re-solve a horizon.
///
/// Engines maximise the objective. The only mutation allowed once the
/// problem is built is re-pinning a single variable to a fixed value, which
/// lets one built problem be re-solved for every dispatch step.
#[cfg_attr(test, mockall::automock)]
pub trait SolverEngine {
    /// Add a continuous variable with the given objective coefficient and bounds.
    /// Bounds may be infinite.
    fn add_variable(&mut self, objective: f64, lower: f64, upper: f64) -> VarId;

    /// Add `sum(coefficient * variable) == rhs`.
    fn add_equality(&mut self, terms: &[(VarId, f64)], rhs: f64);

    /// Fix `var` to `value`, releasing any previous pin, and solve.
    fn solve_pinned(&mut self, var: VarId, value: f64) -> Result<(), SolverError>;

    /// Solved value of `var`, or `None` without a successful solve.
    fn value(&self, var: VarId) -> Option<f64>;
}
