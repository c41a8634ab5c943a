use argmin::core::{CostFunction, Executor, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;

use crate::error::PortfolioError;

/// Minimizes an objective over weight vectors that are non-negative and sum
/// to one.
///
/// The optimizer core talks to its search backend through this trait so tests
/// can drive it with a deterministic stand-in.
pub trait SimplexSolver {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial_weights: &[f64],
    ) -> Result<Vec<f64>, PortfolioError>;
}

/// Nelder-Mead search over an unconstrained parametrization of the simplex.
///
/// Candidate points live in R^n and pass through a softmax before the
/// objective sees them, so the sum-to-one equality and the [0, 1] bounds hold
/// exactly at every evaluation. A single solve per call, no restarts.
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadSolver {
    pub max_iters: u64,
    pub sd_tolerance: f64,
}

impl Default for NelderMeadSolver {
    fn default() -> Self {
        Self {
            max_iters: 10_000,
            sd_tolerance: 1e-10,
        }
    }
}

struct SimplexCost<'a> {
    objective: &'a dyn Fn(&[f64]) -> f64,
}

impl CostFunction for SimplexCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok((self.objective)(&softmax(x)))
    }
}

impl SimplexSolver for NelderMeadSolver {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial_weights: &[f64],
    ) -> Result<Vec<f64>, PortfolioError> {
        let n = initial_weights.len();

        // log maps the starting weights back to the unconstrained space;
        // softmax(x0) then reproduces them up to normalization.
        let x0: Vec<f64> = initial_weights.iter().map(|&w| w.max(1e-12).ln()).collect();
        let mut simplex = Vec::with_capacity(n + 1);
        simplex.push(x0.clone());
        for i in 0..n {
            let mut vertex = x0.clone();
            vertex[i] += 1.0;
            simplex.push(vertex);
        }

        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(self.sd_tolerance)
            .map_err(|e| PortfolioError::OptimizationFailed(e.to_string()))?;
        let result = Executor::new(SimplexCost { objective }, solver)
            .configure(|state| state.max_iters(self.max_iters))
            .run()
            .map_err(|e| PortfolioError::OptimizationFailed(e.to_string()))?;

        let state = result.state;
        match state.termination_status {
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached,
            ) => {}
            status => {
                return Err(PortfolioError::OptimizationFailed(format!(
                    "stopped after {} iterations: {:?}",
                    state.iter, status
                )));
            }
        }

        let best = state.best_param.ok_or_else(|| {
            PortfolioError::OptimizationFailed("solver produced no candidate".to_string())
        })?;
        Ok(softmax(&best))
    }
}

/// Numerically stable softmax; the image is exactly the open simplex.
pub(crate) fn softmax(x: &[f64]) -> Vec<f64> {
    let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum < 1e-300 {
        vec![1.0 / x.len() as f64; x.len()]
    } else {
        exps.iter().map(|&e| e / sum).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_is_a_simplex_point() {
        let w = softmax(&[0.3, -1.2, 4.0]);
        assert_eq!(w.len(), 3);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w.iter().all(|&v| v > 0.0 && v < 1.0));
        // order is preserved
        assert!(w[2] > w[0] && w[0] > w[1]);
    }

    #[test]
    fn test_softmax_of_zeros_is_equal_weights() {
        let w = softmax(&[0.0, 0.0, 0.0]);
        for v in w {
            assert!((v - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_minimize_quadratic_on_simplex() {
        let target = [0.5, 0.3, 0.2];
        let objective = move |w: &[f64]| {
            w.iter()
                .zip(target.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        };

        let solver = NelderMeadSolver::default();
        let w = solver
            .minimize(&objective, &[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0])
            .unwrap();

        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        for (a, b) in w.iter().zip(target.iter()) {
            assert!((a - b).abs() < 1e-2, "got {w:?}");
        }
    }

    #[test]
    fn test_minimize_from_boundary_guess_does_not_panic() {
        let objective = |w: &[f64]| w[0].powi(2) + w[1].powi(2) + w[2].powi(2);
        let solver = NelderMeadSolver::default();
        let w = solver.minimize(&objective, &[1.0, 0.0, 0.0]).unwrap();
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
