use nalgebra::{Matrix3, Vector3};

use crate::error::PortfolioError;
use crate::series::{self, Price};
use crate::solver::{NelderMeadSolver, SimplexSolver};

/// Conventional number of trading days per year, used to scale daily mean
/// returns and covariances to annual terms.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized volatility floor applied inside the objective. A candidate
/// weighting with no measurable variance would otherwise divide by zero; the
/// floor keeps the search finite so a riskless asset attracts weight instead
/// of crashing the solve.
const VOLATILITY_FLOOR: f64 = 1e-4;

/// A labelled closing-price history for one portfolio slot.
///
/// Labels replace positional arguments: the order of the three assets handed
/// to [`PortfolioOptimizer::new`] fixes the meaning of every output weight,
/// and the labels travel with the result so nothing depends on remembering
/// that order at the call site.
#[derive(Debug, Clone)]
pub struct Asset {
    pub label: String,
    pub prices: Vec<Price>,
}

impl Asset {
    pub fn new(label: impl Into<String>, prices: Vec<Price>) -> Self {
        Self {
            label: label.into(),
            prices,
        }
    }
}

/// Result of one optimization: weights in constructor order plus the headline
/// statistics they imply.
#[derive(Debug, Clone)]
pub struct OptimalPortfolio {
    pub labels: [String; 3],
    pub weights: [f64; 3],
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe: f64,
}

/// Maximizes the Sharpe ratio of a three-asset portfolio under sum-to-one and
/// long-only box constraints.
///
/// Return statistics are derived once at construction and never mutated, so a
/// constructed optimizer can serve concurrent `optimize_portfolio` calls.
pub struct PortfolioOptimizer {
    labels: [String; 3],
    annualized_returns: Vector3<f64>,
    covariance: Matrix3<f64>,
    solver: Box<dyn SimplexSolver>,
}

impl PortfolioOptimizer {
    /// Derives per-asset return series, annualized mean returns and the
    /// annualized covariance matrix from three aligned price histories.
    ///
    /// The cleaned return series must be equal length; histories covering
    /// different trading calendars fail here rather than mid-solve.
    pub fn new(assets: [Asset; 3]) -> Result<Self, PortfolioError> {
        Self::with_solver(assets, Box::new(NelderMeadSolver::default()))
    }

    pub fn with_solver(
        assets: [Asset; 3],
        solver: Box<dyn SimplexSolver>,
    ) -> Result<Self, PortfolioError> {
        let returns: Vec<Vec<f64>> = assets
            .iter()
            .map(|a| series::simple_returns(&a.prices))
            .collect();

        for (asset, r) in assets.iter().zip(returns.iter()) {
            if r.len() < 2 {
                return Err(PortfolioError::InsufficientData(
                    asset.label.clone(),
                    r.len(),
                ));
            }
        }
        if returns[0].len() != returns[1].len() || returns[1].len() != returns[2].len() {
            return Err(PortfolioError::DimensionMismatch(
                returns[0].len(),
                returns[1].len(),
                returns[2].len(),
            ));
        }

        let annualized_returns =
            Vector3::from_fn(|i, _| series::mean(&returns[i]) * TRADING_DAYS_PER_YEAR);
        let covariance = Matrix3::from_fn(|i, j| {
            series::sample_covariance(&returns[i], &returns[j]) * TRADING_DAYS_PER_YEAR
        });

        Ok(Self {
            labels: assets.map(|a| a.label),
            annualized_returns,
            covariance,
            solver,
        })
    }

    /// Annualized expected return of a weighting.
    fn portfolio_return(&self, w: &Vector3<f64>) -> f64 {
        self.annualized_returns.dot(w)
    }

    /// Annualized volatility `sqrt(w' Σ w)` of a weighting.
    fn portfolio_volatility(&self, w: &Vector3<f64>) -> f64 {
        w.dot(&(self.covariance * w)).max(0.0).sqrt()
    }

    /// Solves for the weight vector maximizing the Sharpe ratio.
    ///
    /// One deterministic solve from the equal-weight starting point. The
    /// solver minimizes the negative Sharpe ratio over the constrained
    /// simplex; non-convergence surfaces as
    /// [`PortfolioError::OptimizationFailed`] rather than an unconverged
    /// point.
    pub fn optimize_portfolio(&self) -> Result<OptimalPortfolio, PortfolioError> {
        // With an all-zero covariance matrix every feasible weighting has
        // zero variance and the Sharpe ratio is undefined everywhere.
        if self.covariance.amax() < f64::EPSILON {
            return Err(PortfolioError::DegenerateVolatility);
        }

        let objective = |w: &[f64]| {
            let w = Vector3::new(w[0], w[1], w[2]);
            -self.portfolio_return(&w) / self.portfolio_volatility(&w).max(VOLATILITY_FLOOR)
        };

        let initial = [1.0 / 3.0; 3];
        let weights = self.solver.minimize(&objective, &initial)?;

        let w = Vector3::new(weights[0], weights[1], weights[2]);
        let expected_return = self.portfolio_return(&w);
        let volatility = self.portfolio_volatility(&w);
        Ok(OptimalPortfolio {
            labels: self.labels.clone(),
            weights: [weights[0], weights[1], weights[2]],
            expected_return,
            volatility,
            sharpe: expected_return / volatility.max(VOLATILITY_FLOOR),
        })
    }
}
