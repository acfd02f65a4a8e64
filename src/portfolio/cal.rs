//! # Capital Allocation Line
//!
//! $$
//! R(\sigma) = r_f + S_{\max}\,\sigma, \qquad u = R - \tfrac{a}{2}\sigma^2
//! $$
//!
//! The line through the risk-free asset and the tangency portfolio, with
//! the utility-maximizing mix for one investor's risk aversion.

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::portfolio::simulation::SimulationBatch;
use crate::portfolio::types::OptimalAllocation;

/// Return grid resolution of the utility scan.
const CAL_GRID_POINTS: usize = 100;

/// Sampled capital allocation line plus the investor's optimal mix on it.
#[derive(Clone, Debug)]
pub struct CapitalAllocation {
  /// Volatility of each sampled mix.
  pub volatilities: Vec<f64>,
  /// Return of each sampled mix.
  pub returns: Vec<f64>,
  /// Index of the utility-maximizing sample.
  pub optimal_index: usize,
  /// Risk aversion `a` the utility scan used.
  pub risk_aversion: f64,
}

impl CapitalAllocation {
  /// `(volatility, return)` of the utility-maximizing mix.
  pub fn optimal_point(&self) -> (f64, f64) {
    (
      self.volatilities[self.optimal_index],
      self.returns[self.optimal_index],
    )
  }
}

/// Sample the capital allocation line through `tangency` and pick the
/// utility-maximizing mix for `risk_aversion`.
///
/// Returns are scanned from the risk-free rate up to the highest return in
/// the simulated cloud; each return maps onto the line at
/// `σ = (R − r_f) / S_max` and is scored with `u = R − a σ² / 2`. The
/// tangency portfolio must have a positive Sharpe ratio for the line to
/// point upward.
pub fn capital_allocation_line(
  tangency: &OptimalAllocation,
  risk_free: f64,
  risk_aversion: f64,
  batch: &SimulationBatch,
) -> CapitalAllocation {
  let sharpe = tangency.result.sharpe_ratio;
  let top = batch
    .expected_returns
    .max()
    .map(|v| *v)
    .unwrap_or(tangency.result.expected_return)
    .max(tangency.result.expected_return);

  let grid = Array1::linspace(risk_free, top.max(risk_free), CAL_GRID_POINTS);
  let mut volatilities = Vec::with_capacity(grid.len());
  let mut returns = Vec::with_capacity(grid.len());
  let mut optimal_index = 0;
  let mut best_utility = f64::NEG_INFINITY;

  for (i, &ret) in grid.iter().enumerate() {
    let sd = (ret - risk_free) / sharpe;
    let utility = ret - 0.5 * risk_aversion * sd * sd;
    volatilities.push(sd);
    returns.push(ret);
    if utility > best_utility {
      best_utility = utility;
      optimal_index = i;
    }
  }

  CapitalAllocation {
    volatilities,
    returns,
    optimal_index,
    risk_aversion,
  }
}
