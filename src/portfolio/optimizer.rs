//! # Portfolio Optimizer
//!
//! $$
//! \min_{\mathbf{w}\in\Delta^{k-1}} -\frac{250\,\mathbf{w}^\top\mu - r_f}
//! {\sqrt{250\,\mathbf{w}^\top\Sigma\,\mathbf{w}}}
//! $$
//!
//! Constrained mean-variance solves on the weight simplex: maximum Sharpe,
//! minimum volatility, and the efficient frontier sweep. The simplex
//! constraint is enforced by a softmax reparameterization, so every iterate
//! is feasible; the frontier's return-target equality is handled by a
//! penalty continuation with warm starts.

use argmin::core::CostFunction;
use argmin::core::Error as ArgminError;
use argmin::core::Executor;
use argmin::core::TerminationReason;
use argmin::core::TerminationStatus;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;
use tracing::warn;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::portfolio::evaluate::annualized_return;
use crate::portfolio::evaluate::evaluate_allocation;
use crate::portfolio::evaluate::portfolio_variance;
use crate::portfolio::types::AllocationResult;
use crate::portfolio::types::FrontierCurve;
use crate::portfolio::types::FrontierPoint;
use crate::portfolio::types::Moments;
use crate::portfolio::types::OptimalAllocation;
use crate::portfolio::types::TRADING_DAYS;

/// Cost returned inside numerically degenerate regions (negative variance
/// under an ill-conditioned covariance) so the solver walks back out.
const DEGENERATE_COST: f64 = 1e10;

/// Iteration and tolerance caps for one constrained solve.
#[derive(Clone, Copy, Debug)]
pub struct SolveOptions {
  /// Nelder-Mead iteration budget per solve.
  pub max_iters: u64,
  /// Standard-deviation tolerance terminating the simplex search.
  pub sd_tolerance: f64,
  /// Accepted |w·μ·250 − R| on return-constrained solves.
  pub target_tolerance: f64,
  /// Initial quadratic penalty weight on the return constraint.
  pub initial_penalty: f64,
  /// Multiplicative penalty growth per continuation round.
  pub penalty_growth: f64,
  /// Continuation rounds before a target counts as unconverged.
  pub max_penalty_rounds: usize,
}

impl Default for SolveOptions {
  fn default() -> Self {
    Self {
      max_iters: 5000,
      sd_tolerance: 1e-10,
      target_tolerance: 1e-6,
      initial_penalty: 1e4,
      penalty_growth: 100.0,
      max_penalty_rounds: 4,
    }
  }
}

/// Map an unconstrained solver point onto the weight simplex.
///
/// Softmax keeps every component in (0, 1) and the sum at exactly 1, so the
/// long-only fully-invested constraint holds at every iterate without
/// projection or rejection sampling.
fn simplex_weights(x: &[f64]) -> Array1<f64> {
  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Array1<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let total = exps.sum();
  exps / total
}

/// Negative Sharpe ratio of `weights`, the max-Sharpe objective.
pub(crate) fn negative_sharpe(weights: &Array1<f64>, moments: &Moments, risk_free: f64) -> f64 {
  let variance = portfolio_variance(weights, &moments.cov);
  if variance <= 0.0 {
    return DEGENERATE_COST;
  }
  let volatility = (variance * TRADING_DAYS).sqrt();
  -(annualized_return(weights, &moments.mean) - risk_free) / volatility
}

/// Annualized volatility of `weights`, the min-volatility objective.
pub(crate) fn volatility_objective(weights: &Array1<f64>, cov: &Array2<f64>) -> f64 {
  let variance = portfolio_variance(weights, cov);
  if variance < 0.0 {
    return DEGENERATE_COST;
  }
  (variance * TRADING_DAYS).sqrt()
}

/// Volatility plus a quadratic penalty holding the portfolio return at
/// `target_return`. The target is an explicit parameter rather than a
/// variable captured from the sweep loop.
pub(crate) fn frontier_objective(
  weights: &Array1<f64>,
  moments: &Moments,
  target_return: f64,
  penalty: f64,
) -> f64 {
  let volatility = volatility_objective(weights, &moments.cov);
  if volatility >= DEGENERATE_COST {
    return volatility;
  }
  let gap = annualized_return(weights, &moments.mean) - target_return;
  volatility + penalty * gap * gap
}

struct MaxSharpeCost {
  moments: Moments,
  risk_free: f64,
}

impl CostFunction for MaxSharpeCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
    Ok(negative_sharpe(
      &simplex_weights(x),
      &self.moments,
      self.risk_free,
    ))
  }
}

struct MinVolatilityCost {
  cov: Array2<f64>,
}

impl CostFunction for MinVolatilityCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
    Ok(volatility_objective(&simplex_weights(x), &self.cov))
  }
}

struct FrontierCost {
  moments: Moments,
  target_return: f64,
  penalty: f64,
}

impl CostFunction for FrontierCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
    Ok(frontier_objective(
      &simplex_weights(x),
      &self.moments,
      self.target_return,
      self.penalty,
    ))
  }
}

struct SimplexSolve {
  x: Vec<f64>,
  objective: f64,
  iterations: u64,
}

/// Run Nelder-Mead from `start` in softmax space.
///
/// The start simplex is `start` plus one vertex per coordinate at
/// `start + e_i`; the default start is the origin, i.e. equal weights after
/// projection. Any termination other than convergence is surfaced as
/// [`PortfolioError::OptimizationDidNotConverge`] carrying the solver's raw
/// status — never silently accepted.
fn run_nelder_mead<C>(cost: C, start: &[f64], options: &SolveOptions) -> Result<SimplexSolve>
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  let mut simplex = Vec::with_capacity(start.len() + 1);
  simplex.push(start.to_vec());
  for i in 0..start.len() {
    let mut vertex = start.to_vec();
    vertex[i] += 1.0;
    simplex.push(vertex);
  }

  let solver = NelderMead::new(simplex)
    .with_sd_tolerance(options.sd_tolerance)
    .map_err(|e| PortfolioError::OptimizationDidNotConverge {
      status: e.to_string(),
      iterations: 0,
    })?;

  let run = Executor::new(cost, solver)
    .configure(|state| state.max_iters(options.max_iters))
    .run()
    .map_err(|e| PortfolioError::OptimizationDidNotConverge {
      status: e.to_string(),
      iterations: 0,
    })?;

  let state = run.state;
  match state.termination_status {
    TerminationStatus::Terminated(TerminationReason::SolverConverged)
    | TerminationStatus::Terminated(TerminationReason::TargetCostReached) => {}
    ref status => {
      return Err(PortfolioError::OptimizationDidNotConverge {
        status: format!("{:?}", status),
        iterations: state.iter,
      });
    }
  }

  let x = state
    .best_param
    .ok_or_else(|| PortfolioError::OptimizationDidNotConverge {
      status: "solver reported no best parameter".to_string(),
      iterations: state.iter,
    })?;

  Ok(SimplexSolve {
    x,
    objective: state.best_cost,
    iterations: state.iter,
  })
}

/// Single-asset portfolios leave the solver nothing to decide.
fn single_asset_allocation(
  moments: &Moments,
  risk_free: f64,
  objective: impl Fn(&AllocationResult) -> f64,
) -> Result<OptimalAllocation> {
  let weights = Array1::ones(1);
  let result = evaluate_allocation(&weights, moments, risk_free)?;
  let objective = objective(&result);
  Ok(OptimalAllocation {
    weights,
    result,
    objective,
    iterations: 0,
  })
}

/// Maximize the Sharpe ratio over long-only fully-invested weights.
pub fn max_sharpe_allocation(
  moments: &Moments,
  risk_free: f64,
  options: &SolveOptions,
) -> Result<OptimalAllocation> {
  let k = moments.n_assets();
  assert!(k > 0, "at least one asset required");
  if k == 1 {
    return single_asset_allocation(moments, risk_free, |r| -r.sharpe_ratio);
  }

  let cost = MaxSharpeCost {
    moments: moments.clone(),
    risk_free,
  };
  let solve = run_nelder_mead(cost, &vec![0.0; k], options)?;
  let weights = simplex_weights(&solve.x);
  let result = evaluate_allocation(&weights, moments, risk_free)?;

  Ok(OptimalAllocation {
    weights,
    result,
    objective: solve.objective,
    iterations: solve.iterations,
  })
}

/// Minimize annualized volatility over long-only fully-invested weights.
pub fn min_volatility_allocation(
  moments: &Moments,
  risk_free: f64,
  options: &SolveOptions,
) -> Result<OptimalAllocation> {
  let k = moments.n_assets();
  assert!(k > 0, "at least one asset required");
  if k == 1 {
    return single_asset_allocation(moments, risk_free, |r| r.volatility);
  }

  let cost = MinVolatilityCost {
    cov: moments.cov.clone(),
  };
  let solve = run_nelder_mead(cost, &vec![0.0; k], options)?;
  let weights = simplex_weights(&solve.x);
  let result = evaluate_allocation(&weights, moments, risk_free)?;

  Ok(OptimalAllocation {
    weights,
    result,
    objective: solve.objective,
    iterations: solve.iterations,
  })
}

/// Minimize volatility subject to the portfolio return equaling
/// `target_return`, via penalty continuation: each round re-solves with a
/// stiffer penalty, warm-started from the previous round, until the return
/// gap is inside `target_tolerance`.
fn solve_frontier_target(
  moments: &Moments,
  target_return: f64,
  options: &SolveOptions,
) -> Result<f64> {
  let k = moments.n_assets();
  if k == 1 {
    let weights = Array1::ones(1);
    let variance = portfolio_variance(&weights, &moments.cov);
    if variance <= 0.0 {
      return Err(PortfolioError::DegenerateVolatility { variance });
    }
    return Ok((variance * TRADING_DAYS).sqrt());
  }

  let mut start = vec![0.0; k];
  let mut penalty = options.initial_penalty;
  let mut total_iterations = 0;

  for round in 0..options.max_penalty_rounds {
    let cost = FrontierCost {
      moments: moments.clone(),
      target_return,
      penalty,
    };
    let solve = run_nelder_mead(cost, &start, options)?;
    total_iterations += solve.iterations;

    let weights = simplex_weights(&solve.x);
    let variance = portfolio_variance(&weights, &moments.cov);
    if variance <= 0.0 {
      return Err(PortfolioError::DegenerateVolatility { variance });
    }

    let gap = (annualized_return(&weights, &moments.mean) - target_return).abs();
    if gap <= options.target_tolerance {
      debug!(round, penalty, gap, "frontier target converged");
      return Ok((variance * TRADING_DAYS).sqrt());
    }

    start = solve.x;
    penalty *= options.penalty_growth;
  }

  Err(PortfolioError::OptimizationDidNotConverge {
    status: format!(
      "return gap above {:e} after {} penalty rounds",
      options.target_tolerance, options.max_penalty_rounds
    ),
    iterations: total_iterations,
  })
}

/// Sweep minimum-volatility solves over `n_points` target returns linearly
/// spaced (inclusive) between `lower_return` and `upper_return`.
///
/// Targets are independent and run in parallel; results are reassembled in
/// target order. A failed target is skipped rather than recorded as a NaN
/// sentinel, so downstream consumers never special-case placeholder points;
/// the skip count is reported on the curve and each skip is logged.
pub fn efficient_frontier_between(
  moments: &Moments,
  lower_return: f64,
  upper_return: f64,
  n_points: usize,
  options: &SolveOptions,
) -> Result<FrontierCurve> {
  assert!(n_points > 0, "n_points must be >= 1");

  let targets: Vec<f64> = Array1::linspace(lower_return, upper_return, n_points).to_vec();
  let solved: Vec<Option<FrontierPoint>> = targets
    .into_par_iter()
    .map(|target_return| match solve_frontier_target(moments, target_return, options) {
      Ok(volatility) => Some(FrontierPoint {
        target_return,
        volatility,
      }),
      Err(err) => {
        warn!(target_return, error = %err, "frontier target skipped");
        None
      }
    })
    .collect();

  let points: Vec<FrontierPoint> = solved.into_iter().flatten().collect();
  let skipped = n_points - points.len();
  Ok(FrontierCurve { points, skipped })
}

/// Sweep the efficient frontier between the minimum-volatility return and
/// the maximum-Sharpe return.
pub fn efficient_frontier(
  moments: &Moments,
  risk_free: f64,
  n_points: usize,
  options: &SolveOptions,
) -> Result<FrontierCurve> {
  let min_volatility = min_volatility_allocation(moments, risk_free, options)?;
  let max_sharpe = max_sharpe_allocation(moments, risk_free, options)?;

  efficient_frontier_between(
    moments,
    min_volatility.result.expected_return,
    max_sharpe.result.expected_return,
    n_points,
    options,
  )
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;
  use crate::portfolio::simulation::simulate_portfolios;
  use crate::portfolio::simulation::SimulationConfig;

  fn two_asset_moments() -> Moments {
    Moments {
      mean: array![0.0008, 0.0005],
      cov: array![[0.0004, 0.0001], [0.0001, 0.0002]],
    }
  }

  fn three_asset_moments() -> Moments {
    Moments {
      mean: array![0.0008, 0.0005, 0.0006],
      cov: array![
        [0.0004, 0.0001, 0.00005],
        [0.0001, 0.0002, 0.00002],
        [0.00005, 0.00002, 0.0003]
      ],
    }
  }

  #[test]
  fn simplex_weights_sum_to_one() {
    let weights = simplex_weights(&[0.3, -1.2, 4.0]);
    assert_abs_diff_eq!(weights.sum(), 1.0, epsilon = 1e-12);
    for &w in weights.iter() {
      assert!(w > 0.0 && w < 1.0);
    }
  }

  #[test]
  fn max_sharpe_dominates_random_sampling() {
    let moments = three_asset_moments();
    let risk_free = 0.02;
    let batch = simulate_portfolios(
      &moments,
      risk_free,
      &SimulationConfig {
        n_portfolios: 5000,
        seed: Some(99),
      },
    )
    .unwrap();

    let optimal = max_sharpe_allocation(&moments, risk_free, &SolveOptions::default()).unwrap();
    let best_simulated = batch.sharpe_ratios[batch.max_sharpe_index];
    assert!(
      optimal.result.sharpe_ratio >= best_simulated,
      "solver sharpe {} below simulated {}",
      optimal.result.sharpe_ratio,
      best_simulated
    );
  }

  #[test]
  fn min_volatility_dominates_random_sampling() {
    let moments = three_asset_moments();
    let risk_free = 0.02;
    let batch = simulate_portfolios(
      &moments,
      risk_free,
      &SimulationConfig {
        n_portfolios: 5000,
        seed: Some(99),
      },
    )
    .unwrap();

    let optimal =
      min_volatility_allocation(&moments, risk_free, &SolveOptions::default()).unwrap();
    let calmest_simulated = batch.volatilities[batch.min_volatility_index];
    assert!(
      optimal.result.volatility <= calmest_simulated,
      "solver volatility {} above simulated {}",
      optimal.result.volatility,
      calmest_simulated
    );
  }

  #[test]
  fn min_volatility_beats_both_standalone_assets() {
    let moments = two_asset_moments();
    let optimal = min_volatility_allocation(&moments, 0.02, &SolveOptions::default()).unwrap();

    assert_abs_diff_eq!(optimal.weights.sum(), 1.0, epsilon = 1e-6);
    for &w in optimal.weights.iter() {
      assert!((0.0..=1.0).contains(&w));
    }

    let standalone_a = (0.0004f64 * 250.0).sqrt();
    let standalone_b = (0.0002f64 * 250.0).sqrt();
    assert!(optimal.result.volatility < standalone_a);
    assert!(optimal.result.volatility < standalone_b);
  }

  #[test]
  fn min_volatility_matches_closed_form() {
    // Global minimum variance weights are Σ⁻¹1 normalized: (0.25, 0.75)
    // for this covariance.
    let moments = two_asset_moments();
    let optimal = min_volatility_allocation(&moments, 0.0, &SolveOptions::default()).unwrap();

    assert_abs_diff_eq!(optimal.weights[0], 0.25, epsilon = 1e-4);
    assert_abs_diff_eq!(optimal.weights[1], 0.75, epsilon = 1e-4);
  }

  #[test]
  fn frontier_matches_two_asset_closed_form() {
    let moments = two_asset_moments();
    let options = SolveOptions::default();
    let curve = efficient_frontier(&moments, 0.02, 50, &options).unwrap();

    assert_eq!(curve.skipped, 0);
    assert_eq!(curve.points.len(), 50);

    // With two assets, the return target pins the weights uniquely:
    // w0 = (R/250 - μ1) / (μ0 - μ1).
    for point in &curve.points {
      let w0 = (point.target_return / 250.0 - moments.mean[1])
        / (moments.mean[0] - moments.mean[1]);
      let w = array![w0, 1.0 - w0];
      let variance = portfolio_variance(&w, &moments.cov);
      let closed_form = (variance * 250.0).sqrt();
      assert_abs_diff_eq!(point.volatility, closed_form, epsilon = 1e-4);
    }
  }

  #[test]
  fn frontier_spans_min_volatility_to_max_sharpe() {
    let moments = two_asset_moments();
    let options = SolveOptions::default();
    let min_vol = min_volatility_allocation(&moments, 0.02, &options).unwrap();
    let max_sharpe = max_sharpe_allocation(&moments, 0.02, &options).unwrap();
    let curve = efficient_frontier(&moments, 0.02, 50, &options).unwrap();

    let first = curve.points.first().unwrap();
    let last = curve.points.last().unwrap();
    assert_abs_diff_eq!(
      first.target_return,
      min_vol.result.expected_return,
      epsilon = 1e-10
    );
    assert_abs_diff_eq!(
      last.target_return,
      max_sharpe.result.expected_return,
      epsilon = 1e-10
    );
  }

  #[test]
  fn single_asset_is_deterministic() {
    let moments = Moments {
      mean: array![0.0006],
      cov: array![[0.0002]],
    };
    let options = SolveOptions::default();

    let sharpe = max_sharpe_allocation(&moments, 0.02, &options).unwrap();
    let volatility = min_volatility_allocation(&moments, 0.02, &options).unwrap();
    assert_eq!(sharpe.weights, array![1.0]);
    assert_eq!(volatility.weights, array![1.0]);

    let curve = efficient_frontier(&moments, 0.02, 5, &options).unwrap();
    assert_eq!(curve.points.len(), 5);
    assert_eq!(curve.skipped, 0);
    for point in &curve.points {
      assert_abs_diff_eq!(
        point.volatility,
        (0.0002f64 * 250.0).sqrt(),
        epsilon = 1e-12
      );
    }
  }

  #[test]
  fn exhausted_budget_surfaces_solver_status() {
    let moments = three_asset_moments();
    let options = SolveOptions {
      max_iters: 1,
      ..SolveOptions::default()
    };

    let err = max_sharpe_allocation(&moments, 0.02, &options).unwrap_err();
    match err {
      PortfolioError::OptimizationDidNotConverge { status, .. } => {
        assert!(status.contains("MaxItersReached"), "status was {}", status);
      }
      other => panic!("expected OptimizationDidNotConverge, got {:?}", other),
    }
  }
}
