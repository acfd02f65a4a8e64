//! # Allocation Evaluator
//!
//! $$
//! R_p = 250\,\mathbf{w}^\top\mu, \qquad
//! \sigma_p = \sqrt{250\,\mathbf{w}^\top\Sigma\,\mathbf{w}}, \qquad
//! S = \frac{R_p - r_f}{\sigma_p}
//! $$
//!
//! Pure scoring shared by the simulator and the optimizer. This module is
//! the only place the 250-trading-day annualization is applied.

use ndarray::Array1;
use ndarray::Array2;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::portfolio::types::AllocationResult;
use crate::portfolio::types::Moments;
use crate::portfolio::types::TRADING_DAYS;
use crate::portfolio::types::WEIGHT_SUM_TOLERANCE;

/// Annualized expected portfolio return for daily mean returns.
pub fn annualized_return(weights: &Array1<f64>, mean: &Array1<f64>) -> f64 {
  weights.dot(mean) * TRADING_DAYS
}

/// Daily portfolio variance `wᵀΣw`, sign and all.
pub fn portfolio_variance(weights: &Array1<f64>, cov: &Array2<f64>) -> f64 {
  weights.dot(&cov.dot(weights))
}

/// Check the long-only fully-invested constraint against `n_assets`.
///
/// Components must lie in [0, 1] and the sum must be 1, each within
/// [`WEIGHT_SUM_TOLERANCE`].
pub fn validate_weights(weights: &Array1<f64>, n_assets: usize) -> Result<()> {
  if weights.len() != n_assets {
    return Err(PortfolioError::InvalidWeightVector(format!(
      "expected {} weights, got {}",
      n_assets,
      weights.len()
    )));
  }

  for (i, &w) in weights.iter().enumerate() {
    if !w.is_finite() || w < -WEIGHT_SUM_TOLERANCE || w > 1.0 + WEIGHT_SUM_TOLERANCE {
      return Err(PortfolioError::InvalidWeightVector(format!(
        "weight {} at index {} outside [0, 1]",
        w, i
      )));
    }
  }

  let sum = weights.sum();
  if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
    return Err(PortfolioError::InvalidWeightVector(format!(
      "weights sum to {}, expected 1 within {:e}",
      sum, WEIGHT_SUM_TOLERANCE
    )));
  }

  Ok(())
}

/// Score one weight vector against the moments.
///
/// Rejects malformed weights as [`PortfolioError::InvalidWeightVector`] and
/// a non-positive portfolio variance (an ill-conditioned or non-PSD
/// covariance) as [`PortfolioError::DegenerateVolatility`] — never NaN.
pub fn evaluate_allocation(
  weights: &Array1<f64>,
  moments: &Moments,
  risk_free: f64,
) -> Result<AllocationResult> {
  validate_weights(weights, moments.n_assets())?;

  let expected_return = annualized_return(weights, &moments.mean);
  let variance = portfolio_variance(weights, &moments.cov);
  if variance <= 0.0 {
    return Err(PortfolioError::DegenerateVolatility { variance });
  }

  let volatility = (variance * TRADING_DAYS).sqrt();
  Ok(AllocationResult {
    expected_return,
    volatility,
    sharpe_ratio: (expected_return - risk_free) / volatility,
  })
}
