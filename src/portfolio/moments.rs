//! # Moment Estimation
//!
//! $$
//! \hat\mu_j = \tfrac1N\sum_t r_{t,j}, \qquad
//! \hat\Sigma = \tfrac{1}{N-1} (R-\bar R)^\top (R-\bar R)
//! $$
//!
//! Mean-return vector and sample covariance from a return matrix. No
//! annualization happens here; that is the evaluator's job alone.

use ndarray::Axis;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::portfolio::returns::ReturnMatrix;
use crate::portfolio::types::Moments;

/// Estimate daily mean returns and the sample covariance matrix.
///
/// Sample convention (divisor N − 1) throughout; two return rows are the
/// minimum for it to be defined.
pub fn estimate_moments(returns: &ReturnMatrix) -> Result<Moments> {
  let n = returns.n_rows();
  if n < 2 {
    return Err(PortfolioError::InvalidPriceData(format!(
      "sample covariance needs at least 2 return rows, got {}",
      n
    )));
  }

  let mean = returns
    .returns
    .mean_axis(Axis(0))
    .ok_or_else(|| PortfolioError::InvalidPriceData("empty return matrix".to_string()))?;

  let centered = &returns.returns - &mean;
  let cov = centered.t().dot(&centered) / (n as f64 - 1.0);

  Ok(Moments { mean, cov })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;
  use ndarray::array;
  use ndarray::Array2;

  use super::*;

  fn return_matrix(returns: Array2<f64>) -> ReturnMatrix {
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    let mut dates = Vec::with_capacity(returns.nrows());
    for _ in 0..returns.nrows() {
      dates.push(date);
      date = date.succ_opt().unwrap();
    }
    let symbols = (0..returns.ncols()).map(|j| format!("A{}", j)).collect();
    ReturnMatrix {
      dates,
      symbols,
      returns,
    }
  }

  #[test]
  fn mean_and_variance_match_hand_computation() {
    let returns = return_matrix(array![[0.01, -0.02], [0.03, 0.00], [-0.01, 0.02]]);
    let moments = estimate_moments(&returns).unwrap();

    assert_abs_diff_eq!(moments.mean[0], 0.01, epsilon = 1e-12);
    assert_abs_diff_eq!(moments.mean[1], 0.0, epsilon = 1e-12);

    // deviations [0, 0.02, -0.02]: sum of squares 0.0008, divisor N-1 = 2
    assert_abs_diff_eq!(moments.cov[[0, 0]], 0.0004, epsilon = 1e-12);
    // cross products 0*(-0.02) + 0.02*0 + (-0.02)*0.02 = -0.0004, divisor 2
    assert_abs_diff_eq!(moments.cov[[0, 1]], -0.0002, epsilon = 1e-12);
  }

  #[test]
  fn covariance_is_symmetric() {
    let returns = return_matrix(array![
      [0.012, -0.004, 0.007],
      [-0.003, 0.009, -0.001],
      [0.005, 0.002, 0.004],
      [-0.008, 0.001, -0.006]
    ]);
    let moments = estimate_moments(&returns).unwrap();

    for i in 0..3 {
      for j in 0..3 {
        assert_abs_diff_eq!(
          moments.cov[[i, j]],
          moments.cov[[j, i]],
          epsilon = 1e-15
        );
      }
    }
  }

  #[test]
  fn single_return_row_is_rejected() {
    let returns = return_matrix(array![[0.01, 0.02]]);
    let err = estimate_moments(&returns).unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidPriceData(_)));
  }
}
