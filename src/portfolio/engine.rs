//! # Frontier Engine
//!
//! $$
//! P \mapsto (\mu, \Sigma) \mapsto \{\text{cloud},\ \mathbf{w}^\*_{S},\ \mathbf{w}^\*_{\sigma},\ \text{frontier},\ \text{CAL}\}
//! $$
//!
//! High-level orchestration over the whole pipeline, producing one
//! immutable analysis for rendering collaborators.

use tracing::debug;

use crate::error::Result;
use crate::market::PriceMatrix;
use crate::portfolio::cal::capital_allocation_line;
use crate::portfolio::cal::CapitalAllocation;
use crate::portfolio::moments::estimate_moments;
use crate::portfolio::optimizer::efficient_frontier_between;
use crate::portfolio::optimizer::max_sharpe_allocation;
use crate::portfolio::optimizer::min_volatility_allocation;
use crate::portfolio::optimizer::SolveOptions;
use crate::portfolio::returns::log_returns;
use crate::portfolio::returns::ReturnMatrix;
use crate::portfolio::simulation::simulate_portfolios;
use crate::portfolio::simulation::SimulationBatch;
use crate::portfolio::simulation::SimulationConfig;
use crate::portfolio::types::FrontierCurve;
use crate::portfolio::types::Moments;
use crate::portfolio::types::OptimalAllocation;

/// Runtime configuration for [`FrontierEngine`]. Every knob is
/// caller-supplied; there is no hidden global state.
#[derive(Clone, Copy, Debug)]
pub struct FrontierConfig {
  /// Annualized risk-free rate.
  pub risk_free: f64,
  /// Monte Carlo cloud size.
  pub n_portfolios: usize,
  /// Number of frontier targets.
  pub n_frontier_points: usize,
  /// Investor risk aversion for the capital allocation line.
  pub risk_aversion: f64,
  /// Fixed RNG seed for the cloud; `None` seeds from entropy.
  pub seed: Option<u64>,
  /// Solver caps shared by all constrained solves.
  pub solve: SolveOptions,
}

impl Default for FrontierConfig {
  fn default() -> Self {
    Self {
      risk_free: 0.02,
      n_portfolios: 5000,
      n_frontier_points: 50,
      risk_aversion: 10.0,
      seed: None,
      solve: SolveOptions::default(),
    }
  }
}

/// Everything one analysis run produces, ready for rendering.
#[derive(Clone, Debug)]
pub struct FrontierAnalysis {
  pub returns: ReturnMatrix,
  pub moments: Moments,
  pub simulation: SimulationBatch,
  pub max_sharpe: OptimalAllocation,
  pub min_volatility: OptimalAllocation,
  pub frontier: FrontierCurve,
  pub capital_allocation: CapitalAllocation,
}

/// Single entry point running returns → moments → simulation →
/// optimization → frontier → capital allocation line.
#[derive(Clone, Debug)]
pub struct FrontierEngine {
  config: FrontierConfig,
}

impl FrontierEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: FrontierConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &FrontierConfig {
    &self.config
  }

  /// Run the full analysis over one price matrix.
  pub fn analyze(&self, prices: &PriceMatrix) -> Result<FrontierAnalysis> {
    let returns = log_returns(prices)?;
    let moments = estimate_moments(&returns)?;

    let simulation = simulate_portfolios(
      &moments,
      self.config.risk_free,
      &SimulationConfig {
        n_portfolios: self.config.n_portfolios,
        seed: self.config.seed,
      },
    )?;

    let min_volatility = min_volatility_allocation(&moments, self.config.risk_free, &self.config.solve)?;
    let max_sharpe = max_sharpe_allocation(&moments, self.config.risk_free, &self.config.solve)?;

    let frontier = efficient_frontier_between(
      &moments,
      min_volatility.result.expected_return,
      max_sharpe.result.expected_return,
      self.config.n_frontier_points,
      &self.config.solve,
    )?;

    let capital_allocation = capital_allocation_line(
      &max_sharpe,
      self.config.risk_free,
      self.config.risk_aversion,
      &simulation,
    );

    debug!(
      n_assets = moments.n_assets(),
      frontier_points = frontier.points.len(),
      frontier_skipped = frontier.skipped,
      "frontier analysis complete"
    );

    Ok(FrontierAnalysis {
      returns,
      moments,
      simulation,
      max_sharpe,
      min_volatility,
      frontier,
      capital_allocation,
    })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;
  use ndarray::Array2;

  use super::*;

  fn sample_prices() -> PriceMatrix {
    // Two drifting price paths with enough wiggle for a full-rank covariance.
    let closes = vec![
      100.0, 40.0, //
      101.2, 39.6, //
      100.4, 40.4, //
      102.1, 40.1, //
      103.0, 40.9, //
      102.2, 41.3, //
      104.0, 41.0, //
      104.9, 41.8, //
      104.1, 42.3, //
      105.8, 42.0, //
    ];
    let mut date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let mut dates = Vec::new();
    for _ in 0..10 {
      dates.push(date);
      date = date.succ_opt().unwrap();
    }
    PriceMatrix {
      dates,
      symbols: vec!["AAA".to_string(), "BBB".to_string()],
      closes: Array2::from_shape_vec((10, 2), closes).unwrap(),
    }
  }

  #[test]
  fn analyze_runs_the_whole_pipeline() {
    let engine = FrontierEngine::new(FrontierConfig {
      n_portfolios: 500,
      n_frontier_points: 10,
      seed: Some(3),
      ..FrontierConfig::default()
    });

    let analysis = engine.analyze(&sample_prices()).unwrap();

    assert_eq!(analysis.returns.n_rows(), 9);
    assert_eq!(analysis.simulation.len(), 500);
    assert_abs_diff_eq!(analysis.max_sharpe.weights.sum(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(analysis.min_volatility.weights.sum(), 1.0, epsilon = 1e-6);
    assert_eq!(
      analysis.frontier.points.len() + analysis.frontier.skipped,
      10
    );
    assert_eq!(analysis.capital_allocation.returns.len(), 100);
  }

  #[test]
  fn analysis_is_reproducible_with_a_seed() {
    let engine = FrontierEngine::new(FrontierConfig {
      n_portfolios: 200,
      n_frontier_points: 5,
      seed: Some(21),
      ..FrontierConfig::default()
    });

    let a = engine.analyze(&sample_prices()).unwrap();
    let b = engine.analyze(&sample_prices()).unwrap();
    assert_eq!(a.simulation.weights, b.simulation.weights);
    assert_eq!(a.max_sharpe.weights, b.max_sharpe.weights);
  }
}
