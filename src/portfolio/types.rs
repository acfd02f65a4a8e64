//! # Portfolio Types
//!
//! $$
//! \mathbf{w} \in \Delta^{k-1} = \{\mathbf{w} : w_i \ge 0,\ \textstyle\sum_i w_i = 1\}
//! $$
//!
//! Shared result containers and conventions for portfolio analysis.

use ndarray::Array1;
use ndarray::Array2;

/// Trading days per year used when annualizing daily returns.
pub const TRADING_DAYS: f64 = 250.0;

/// Accepted deviation of a weight sum from 1 (and of a component from [0, 1]).
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Daily mean returns and covariance estimated from one return matrix.
///
/// The covariance is the sample convention (divisor N − 1). Both the
/// simulator and the optimizer consume the same `Moments` value, so the
/// convention cannot silently diverge between the two paths.
#[derive(Clone, Debug)]
pub struct Moments {
  /// Per-asset arithmetic mean of daily log returns.
  pub mean: Array1<f64>,
  /// Sample covariance of daily log returns, assets × assets.
  pub cov: Array2<f64>,
}

impl Moments {
  pub fn n_assets(&self) -> usize {
    self.mean.len()
  }
}

/// Annualized score of one weight vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AllocationResult {
  /// Annualized expected log return, `w·μ × 250`.
  pub expected_return: f64,
  /// Annualized volatility, `√(wᵀΣw) × √250`.
  pub volatility: f64,
  /// `(expected_return − risk_free) / volatility`.
  pub sharpe_ratio: f64,
}

/// Solver output: the optimal weights together with their score.
#[derive(Clone, Debug)]
pub struct OptimalAllocation {
  pub weights: Array1<f64>,
  pub result: AllocationResult,
  /// Final objective value reported by the solver.
  pub objective: f64,
  /// Iterations the solver spent.
  pub iterations: u64,
}

/// One solved point of the efficient frontier.
#[derive(Clone, Copy, Debug)]
pub struct FrontierPoint {
  /// Annualized return the solve was constrained to.
  pub target_return: f64,
  /// Minimized annualized volatility at that return.
  pub volatility: f64,
}

/// Ordered minimum-volatility curve between the min-volatility and
/// max-Sharpe returns.
#[derive(Clone, Debug)]
pub struct FrontierCurve {
  pub points: Vec<FrontierPoint>,
  /// Targets whose solve failed and was skipped.
  pub skipped: usize,
}
