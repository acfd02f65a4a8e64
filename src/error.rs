//! # Errors
//!
//! $$
//! \text{failure taxonomy}: \{\text{prices},\ \mathbf{w},\ \sigma_p^2 \le 0,\ \text{solver},\ \text{feed}\}
//! $$
//!
use thiserror::Error;

/// Result type alias for portfolio operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Failure taxonomy of the portfolio core.
///
/// Every variant is surfaced to the immediate caller as a typed failure;
/// none are converted into NaN results that travel downstream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
  /// Price input unusable for log returns: non-positive close or too few rows.
  #[error("invalid price data: {0}")]
  InvalidPriceData(String),

  /// Portfolio variance under the square root is not strictly positive.
  #[error("degenerate volatility: portfolio variance {variance:e} is not positive")]
  DegenerateVolatility { variance: f64 },

  /// The constrained solver stopped without reporting convergence.
  #[error("optimization did not converge after {iterations} iterations: {status}")]
  OptimizationDidNotConverge { status: String, iterations: u64 },

  /// Weight vector violates the long-only fully-invested constraint.
  #[error("invalid weight vector: {0}")]
  InvalidWeightVector(String),

  /// The price feed has no data for the requested symbol or range.
  #[error("no market data for {symbol}: {reason}")]
  DataUnavailable { symbol: String, reason: String },
}
