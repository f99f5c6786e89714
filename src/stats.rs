//! # Return Statistics
//!
//! $$
//! \mu_i = \tfrac{1}{T}\textstyle\sum_t r_{t,i}, \qquad
//! \Sigma_{ij} = \tfrac{1}{T-1}\textstyle\sum_t (r_{t,i}-\mu_i)(r_{t,j}-\mu_j)
//! $$
//!
//! Expected returns and sample covariance derived from a return panel,
//! with the usual annualization scalings for daily data.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

use crate::error::FrontierError;
use crate::error::Result;
use crate::market::ReturnSeries;

/// Trading periods per year for daily observations.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Per-ticker mean period return.
pub fn mean_returns(returns: &ReturnSeries) -> Array1<f64> {
  returns
    .values()
    .mean_axis(Axis(0))
    .unwrap_or_else(|| Array1::zeros(returns.n_assets()))
}

/// Sample covariance of the return panel (ddof = 1).
///
/// Needs at least 2 return observations, i.e. 3 aligned prices.
pub fn covariance(returns: &ReturnSeries) -> Result<Array2<f64>> {
  let data = returns.values();
  let rows = data.nrows();
  let n = data.ncols();
  if rows < 2 {
    return Err(FrontierError::InsufficientData {
      ticker: returns.tickers().first().cloned().unwrap_or_default(),
      observations: rows,
    });
  }

  let means = mean_returns(returns);
  let mut cov = Array2::<f64>::zeros((n, n));
  for i in 0..n {
    for j in i..n {
      let mut acc = 0.0;
      for r in 0..rows {
        acc += (data[[r, i]] - means[i]) * (data[[r, j]] - means[j]);
      }
      let value = acc / (rows - 1) as f64;
      cov[[i, j]] = value;
      cov[[j, i]] = value;
    }
  }
  Ok(cov)
}

/// Scale mean period returns to a yearly horizon.
pub fn annualize_returns(mu: &Array1<f64>, periods_per_year: f64) -> Array1<f64> {
  mu.mapv(|m| m * periods_per_year)
}

/// Scale a period covariance matrix to a yearly horizon. Volatilities scale
/// by the square root of `periods_per_year` as a consequence.
pub fn annualize_covariance(cov: &Array2<f64>, periods_per_year: f64) -> Array2<f64> {
  cov.mapv(|c| c * periods_per_year)
}
