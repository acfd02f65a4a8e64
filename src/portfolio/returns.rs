//! # Return Series
//!
//! $$
//! r_{t,j} = \ln\frac{P_{t,j}}{P_{t-1,j}}
//! $$
//!
//! Closing prices to daily log returns.

use chrono::NaiveDate;
use ndarray::Array2;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::market::PriceMatrix;

/// Daily log returns on the price grid with the first date dropped.
#[derive(Clone, Debug)]
pub struct ReturnMatrix {
  pub dates: Vec<NaiveDate>,
  pub symbols: Vec<String>,
  /// Log return of `symbols[j]` over the day ending at `dates[i]`.
  pub returns: Array2<f64>,
}

impl ReturnMatrix {
  pub fn n_assets(&self) -> usize {
    self.returns.ncols()
  }

  pub fn n_rows(&self) -> usize {
    self.returns.nrows()
  }
}

/// Convert closing prices to daily log returns.
///
/// Needs at least two price rows and strictly positive closes; anything
/// else leaves the logarithm undefined and is rejected as
/// [`PortfolioError::InvalidPriceData`] instead of producing NaN rows.
pub fn log_returns(prices: &PriceMatrix) -> Result<ReturnMatrix> {
  let rows = prices.closes.nrows();
  let cols = prices.closes.ncols();

  if rows < 2 {
    return Err(PortfolioError::InvalidPriceData(format!(
      "need at least 2 price rows, got {}",
      rows
    )));
  }

  for ((i, j), close) in prices.closes.indexed_iter() {
    if !(*close > 0.0) || !close.is_finite() {
      return Err(PortfolioError::InvalidPriceData(format!(
        "non-positive close {} for {} on {}",
        close, prices.symbols[j], prices.dates[i]
      )));
    }
  }

  let mut returns = Array2::zeros((rows - 1, cols));
  for i in 1..rows {
    for j in 0..cols {
      returns[[i - 1, j]] = (prices.closes[[i, j]] / prices.closes[[i - 1, j]]).ln();
    }
  }

  Ok(ReturnMatrix {
    dates: prices.dates[1..].to_vec(),
    symbols: prices.symbols.clone(),
    returns,
  })
}
