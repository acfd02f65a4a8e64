//! # Monte Carlo Simulation
//!
//! $$
//! w_i = \frac{u_i}{\sum_j u_j}, \qquad u_j \sim \mathcal{U}(0,1)
//! $$
//!
//! Random long-only portfolios scored into a scatter cloud. The cloud is
//! descriptive only — it seeds visualization and sanity-checks the
//! optimizer, it never replaces it.

use ndarray::Array1;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Uniform;
use tracing::debug;

use crate::error::Result;
use crate::portfolio::evaluate::evaluate_allocation;
use crate::portfolio::types::Moments;

/// Simulation inputs; count and seed are caller-supplied, never baked in.
#[derive(Clone, Copy, Debug)]
pub struct SimulationConfig {
  /// Number of random portfolios to draw.
  pub n_portfolios: usize,
  /// Fixed RNG seed for reproducible clouds; `None` seeds from entropy.
  pub seed: Option<u64>,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      n_portfolios: 5000,
      seed: None,
    }
  }
}

/// Random-weight scatter cloud with its best-Sharpe and lowest-volatility
/// entries tracked by index.
#[derive(Clone, Debug)]
pub struct SimulationBatch {
  /// One weight vector per row.
  pub weights: Array2<f64>,
  pub expected_returns: Array1<f64>,
  pub volatilities: Array1<f64>,
  pub sharpe_ratios: Array1<f64>,
  /// Index of the highest Sharpe ratio (first occurrence on ties).
  pub max_sharpe_index: usize,
  /// Index of the lowest volatility (first occurrence on ties).
  pub min_volatility_index: usize,
}

impl SimulationBatch {
  pub fn len(&self) -> usize {
    self.sharpe_ratios.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sharpe_ratios.is_empty()
  }

  pub fn max_sharpe_weights(&self) -> Array1<f64> {
    self.weights.row(self.max_sharpe_index).to_owned()
  }

  pub fn min_volatility_weights(&self) -> Array1<f64> {
    self.weights.row(self.min_volatility_index).to_owned()
  }
}

/// Draw one long-only fully-invested weight vector.
///
/// Uniform draws normalized by their sum land on the simplex by
/// construction; clipping-based sampling would bias the cloud.
fn random_weights(n_assets: usize, rng: &mut StdRng) -> Array1<f64> {
  let draws = Array1::random_using(n_assets, Uniform::new(0.0, 1.0), rng);
  let total = draws.sum();
  draws / total
}

/// Draw and score `n_portfolios` random portfolios.
pub fn simulate_portfolios(
  moments: &Moments,
  risk_free: f64,
  config: &SimulationConfig,
) -> Result<SimulationBatch> {
  let n = config.n_portfolios;
  let k = moments.n_assets();
  assert!(n > 0, "n_portfolios must be >= 1");
  assert!(k > 0, "at least one asset required");

  let mut rng = match config.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };

  let mut weights = Array2::zeros((n, k));
  let mut expected_returns = Array1::zeros(n);
  let mut volatilities = Array1::zeros(n);
  let mut sharpe_ratios = Array1::zeros(n);
  let mut max_sharpe_index = 0;
  let mut min_volatility_index = 0;

  for i in 0..n {
    let w = random_weights(k, &mut rng);
    let result = evaluate_allocation(&w, moments, risk_free)?;

    weights.row_mut(i).assign(&w);
    expected_returns[i] = result.expected_return;
    volatilities[i] = result.volatility;
    sharpe_ratios[i] = result.sharpe_ratio;

    // strict comparisons: first occurrence wins on ties
    if sharpe_ratios[i] > sharpe_ratios[max_sharpe_index] {
      max_sharpe_index = i;
    }
    if volatilities[i] < volatilities[min_volatility_index] {
      min_volatility_index = i;
    }
  }

  debug!(
    n_portfolios = n,
    n_assets = k,
    best_sharpe = sharpe_ratios[max_sharpe_index],
    lowest_volatility = volatilities[min_volatility_index],
    "simulated portfolio cloud"
  );

  Ok(SimulationBatch {
    weights,
    expected_returns,
    volatilities,
    sharpe_ratios,
    max_sharpe_index,
    min_volatility_index,
  })
}
