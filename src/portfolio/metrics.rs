//! # Portfolio Metrics
//!
//! $$
//! r_p = \mathbf{w}^\top \mu, \qquad
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}, \qquad
//! S = \frac{r_p - r_f}{\sigma_p}
//! $$

use ndarray::Array1;
use ndarray::Array2;

use crate::error::FrontierError;
use crate::error::Result;
use crate::portfolio::types::PortfolioMetrics;
use crate::portfolio::types::VOL_EPS;
use crate::portfolio::types::WEIGHT_SUM_TOL;

/// Expected portfolio return without any validation.
pub(crate) fn portfolio_return(weights: &Array1<f64>, mu: &Array1<f64>) -> f64 {
  weights.dot(mu)
}

/// Portfolio volatility without any validation. Negative quadratic forms
/// from round-off are clamped to zero.
pub(crate) fn portfolio_volatility(weights: &Array1<f64>, cov: &Array2<f64>) -> f64 {
  weights.dot(&cov.dot(weights)).max(0.0).sqrt()
}

/// Evaluate a weight vector against expected returns and a covariance matrix.
///
/// Deterministic, pure function of its inputs. Fails with
/// [`FrontierError::InvalidWeights`] when the weights are non-finite or do not
/// sum to one within [`WEIGHT_SUM_TOL`], and with
/// [`FrontierError::DegenerateVolatility`] when the volatility is ~0 and the
/// Sharpe ratio is undefined.
pub fn compute_metrics(
  weights: &Array1<f64>,
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
) -> Result<PortfolioMetrics> {
  let n = mu.len();
  if weights.len() != n || cov.nrows() != n || cov.ncols() != n {
    return Err(FrontierError::DimensionMismatch(format!(
      "{} weights, {} expected returns, {}x{} covariance",
      weights.len(),
      n,
      cov.nrows(),
      cov.ncols()
    )));
  }

  if weights.iter().any(|w| !w.is_finite()) {
    return Err(FrontierError::InvalidWeights(
      "weights contain non-finite values".into(),
    ));
  }
  let sum: f64 = weights.sum();
  if (sum - 1.0).abs() > WEIGHT_SUM_TOL {
    return Err(FrontierError::InvalidWeights(format!(
      "weights sum to {sum:.8}, expected 1"
    )));
  }

  let expected_return = portfolio_return(weights, mu);
  let volatility = portfolio_volatility(weights, cov);
  if volatility < VOL_EPS {
    return Err(FrontierError::DegenerateVolatility);
  }

  Ok(PortfolioMetrics {
    expected_return,
    volatility,
    sharpe: (expected_return - risk_free) / volatility,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn metrics_are_deterministic() {
    let w = array![0.4, 0.6];
    let mu = array![0.10, 0.20];
    let cov = array![[0.04, 0.01], [0.01, 0.09]];

    let a = compute_metrics(&w, &mu, &cov, 0.01).unwrap();
    let b = compute_metrics(&w, &mu, &cov, 0.01).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn single_asset_metrics_match_asset_moments() {
    let w = array![1.0];
    let mu = array![0.10];
    let cov = array![[0.04]];

    let m = compute_metrics(&w, &mu, &cov, 0.0).unwrap();
    assert_abs_diff_eq!(m.expected_return, 0.10, epsilon = 1e-12);
    assert_abs_diff_eq!(m.volatility, 0.20, epsilon = 1e-12);
    assert_abs_diff_eq!(m.sharpe, 0.5, epsilon = 1e-12);
  }

  #[test]
  fn bad_weight_sum_is_rejected() {
    let mu = array![0.1, 0.2];
    let cov = array![[0.04, 0.0], [0.0, 0.09]];

    let err = compute_metrics(&array![0.7, 0.7], &mu, &cov, 0.0).unwrap_err();
    assert!(matches!(err, FrontierError::InvalidWeights(_)));

    let err = compute_metrics(&array![f64::NAN, 1.0], &mu, &cov, 0.0).unwrap_err();
    assert!(matches!(err, FrontierError::InvalidWeights(_)));
  }

  #[test]
  fn zero_volatility_is_degenerate() {
    let w = array![0.5, 0.5];
    let mu = array![0.1, 0.2];
    let cov = array![[0.0, 0.0], [0.0, 0.0]];

    assert!(matches!(
      compute_metrics(&w, &mu, &cov, 0.0),
      Err(FrontierError::DegenerateVolatility)
    ));
  }

  #[test]
  fn shape_disagreement_is_rejected() {
    let err = compute_metrics(
      &array![1.0],
      &array![0.1, 0.2],
      &array![[0.04, 0.0], [0.0, 0.09]],
      0.0,
    )
    .unwrap_err();
    assert!(matches!(err, FrontierError::DimensionMismatch(_)));
  }
}
