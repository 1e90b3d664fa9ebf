//! [`SolverEngine`] backed by the pure-Rust `minilp` simplex solver.

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Solution, Variable};
use tracing::trace;

use super::{SolverEngine, VarId};
use crate::error::SolverError;

pub struct MiniLpEngine {
    problem: Problem,
    variables: Vec<Variable>,
    /// Last successful solution, kept so re-pinning warm-starts from it
    solution: Option<Solution>,
    pinned: Option<Variable>,
}

impl MiniLpEngine {
    pub fn maximizing() -> Self {
        Self {
            problem: Problem::new(OptimizationDirection::Maximize),
            variables: Vec::new(),
            solution: None,
            pinned: None,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Objective value of the last successful solve
    pub fn objective(&self) -> Option<f64> {
        self.solution.as_ref().map(Solution::objective)
    }

    fn variable(&self, var: VarId) -> Variable {
        self.variables[var.0]
    }

    fn invalidate(&mut self) {
        self.solution = None;
        self.pinned = None;
    }
}

impl Default for MiniLpEngine {
    fn default() -> Self {
        Self::maximizing()
    }
}

impl std::fmt::Debug for MiniLpEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniLpEngine")
            .field("variables", &self.variables.len())
            .field("solved", &self.solution.is_some())
            .finish()
    }
}

impl SolverEngine for MiniLpEngine {
    fn add_variable(&mut self, objective: f64, lower: f64, upper: f64) -> VarId {
        self.invalidate();
        let variable = self.problem.add_var(objective, (lower, upper));
        self.variables.push(variable);
        VarId(self.variables.len() - 1)
    }

    fn add_equality(&mut self, terms: &[(VarId, f64)], rhs: f64) {
        self.invalidate();
        let mut expr = LinearExpr::empty();
        for &(var, coefficient) in terms {
            expr.add(self.variable(var), coefficient);
        }
        self.problem.add_constraint(expr, ComparisonOp::Eq, rhs);
    }

    fn solve_pinned(&mut self, var: VarId, value: f64) -> Result<(), SolverError> {
        let target = self.variable(var);

        let base = match (self.solution.take(), self.pinned.take()) {
            (Some(solution), Some(previous)) => {
                trace!("warm restart from previous solution");
                solution.unfix_var(previous).0
            }
            (Some(solution), None) => solution,
            (None, _) => self.problem.solve()?,
        };

        let solution = base.fix_var(target, value)?;
        self.solution = Some(solution);
        self.pinned = Some(target);
        Ok(())
    }

    fn value(&self, var: VarId) -> Option<f64> {
        self.solution
            .as_ref()
            .map(|solution| solution[self.variable(var)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pinned_solve_and_resolve() {
        // max x + y, x + y == 2z, z in [0, 10], x <= 3, y <= 4
        let mut engine = MiniLpEngine::maximizing();
        let x = engine.add_variable(1.0, 0.0, 3.0);
        let y = engine.add_variable(1.0, 0.0, 4.0);
        let z = engine.add_variable(0.0, 0.0, 10.0);
        engine.add_equality(&[(x, 1.0), (y, 1.0), (z, -2.0)], 0.0);

        assert_eq!(engine.value(x), None);

        engine.solve_pinned(z, 1.0).unwrap();
        assert_abs_diff_eq!(engine.value(z).unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.objective().unwrap(), 2.0, epsilon = 1e-9);

        engine.solve_pinned(z, 3.0).unwrap();
        assert_abs_diff_eq!(engine.value(z).unwrap(), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.objective().unwrap(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_infeasible_pin_clears_solution() {
        // x == 2z with x capped at 1, so z > 0.5 is infeasible
        let mut engine = MiniLpEngine::maximizing();
        let x = engine.add_variable(1.0, 0.0, 1.0);
        let z = engine.add_variable(0.0, 0.0, 10.0);
        engine.add_equality(&[(x, 1.0), (z, -2.0)], 0.0);

        engine.solve_pinned(z, 0.25).unwrap();
        assert_eq!(engine.solve_pinned(z, 5.0), Err(SolverError::Infeasible));
        assert_eq!(engine.value(x), None);

        engine.solve_pinned(z, 0.5).unwrap();
        assert_abs_diff_eq!(engine.value(x).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unbounded_problem() {
        let mut engine = MiniLpEngine::maximizing();
        let _x = engine.add_variable(1.0, 0.0, f64::INFINITY);
        let z = engine.add_variable(0.0, 0.0, 1.0);
        engine.add_equality(&[(z, 1.0)], 0.5);
        assert_eq!(engine.solve_pinned(z, 0.5), Err(SolverError::Unbounded));
    }
}
