//! # Portfolio Solver
//!
//! $$
//! \mathbf{w}^\* = \arg\max_{\mathbf{w}} \frac{\mathbf{w}^\top\mu - r_f}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}}
//! \quad \text{s.t.} \quad \textstyle\sum_i w_i = 1,\ l_i \le w_i \le u_i
//! $$
//!
//! Constrained mean-variance searches. Each solve starts from the projected
//! closed-form (unconstrained) solution and refines it with a Nelder-Mead
//! search in which every cost evaluation projects the raw point back onto the
//! feasible set, so the constraints hold exactly at every step.

use std::cmp::Ordering;

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ndarray::Array2;
use tracing::debug;

use crate::error::FrontierError;
use crate::error::Result;
use crate::portfolio::metrics::compute_metrics;
use crate::portfolio::metrics::portfolio_return;
use crate::portfolio::metrics::portfolio_volatility;
use crate::portfolio::types::Allocation;
use crate::portfolio::types::Bounds;
use crate::portfolio::types::VOL_EPS;

const MAX_ITERS: u64 = 5000;
const SD_TOLERANCE: f64 = 1e-8;
const SIMPLEX_STEP: f64 = 0.1;
const TARGET_PENALTY: f64 = 1e4;

struct ProjectedCost<F> {
  bounds: Bounds,
  objective: F,
}

impl<F> CostFunction for ProjectedCost<F>
where
  F: Fn(&Array1<f64>) -> f64,
{
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let mut w = x.clone();
    if self.bounds.project(&mut w).is_err() {
      return Ok(f64::INFINITY);
    }
    Ok((self.objective)(&Array1::from(w)))
  }
}

fn run_projected_search<F>(objective: F, bounds: &Bounds, start: Vec<f64>) -> Result<Array1<f64>>
where
  F: Fn(&Array1<f64>) -> f64,
{
  let n = start.len();
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(start.clone());
  for i in 0..n {
    let mut vertex = start.clone();
    vertex[i] += SIMPLEX_STEP;
    simplex.push(vertex);
  }

  let solver = NelderMead::new(simplex)
    .with_sd_tolerance(SD_TOLERANCE)
    .map_err(|e| FrontierError::OptimizationFailed(e.to_string()))?;

  let cost = ProjectedCost {
    bounds: bounds.clone(),
    objective,
  };

  let res = Executor::new(cost, solver)
    .configure(|state| state.max_iters(MAX_ITERS))
    .run()
    .map_err(|e| FrontierError::OptimizationFailed(e.to_string()))?;

  let mut best = res.state.best_param.unwrap_or(start);
  bounds.project(&mut best)?;
  if best.iter().any(|w| !w.is_finite()) {
    return Err(FrontierError::OptimizationFailed(
      "solver produced non-finite weights".into(),
    ));
  }
  Ok(Array1::from(best))
}

fn validate_inputs(mu: &Array1<f64>, cov: &Array2<f64>, bounds: &Bounds) -> Result<()> {
  let n = mu.len();
  if n == 0 {
    return Err(FrontierError::DimensionMismatch("empty asset universe".into()));
  }
  if cov.nrows() != n || cov.ncols() != n || bounds.len() != n {
    return Err(FrontierError::DimensionMismatch(format!(
      "{} expected returns, {}x{} covariance, {} bounds",
      n,
      cov.nrows(),
      cov.ncols(),
      bounds.len()
    )));
  }
  Ok(())
}

/// Gauss-Jordan inverse with partial pivoting. `None` for singular input.
fn gauss_jordan_inverse(mat: &Array2<f64>) -> Option<Array2<f64>> {
  let n = mat.nrows();
  if n == 0 || mat.ncols() != n {
    return None;
  }

  let mut aug = Array2::<f64>::zeros((n, 2 * n));
  for i in 0..n {
    for j in 0..n {
      aug[[i, j]] = mat[[i, j]];
    }
    aug[[i, n + i]] = 1.0;
  }

  for col in 0..n {
    let mut max_row = col;
    let mut max_val = aug[[col, col]].abs();
    for row in (col + 1)..n {
      if aug[[row, col]].abs() > max_val {
        max_val = aug[[row, col]].abs();
        max_row = row;
      }
    }
    if max_val < 1e-15 {
      return None;
    }
    if max_row != col {
      for j in 0..(2 * n) {
        let tmp = aug[[col, j]];
        aug[[col, j]] = aug[[max_row, j]];
        aug[[max_row, j]] = tmp;
      }
    }

    let pivot = aug[[col, col]];
    for j in 0..(2 * n) {
      aug[[col, j]] /= pivot;
    }

    for row in 0..n {
      if row == col {
        continue;
      }
      let factor = aug[[row, col]];
      if factor == 0.0 {
        continue;
      }
      for j in 0..(2 * n) {
        aug[[row, j]] -= factor * aug[[col, j]];
      }
    }
  }

  let mut inv = Array2::<f64>::zeros((n, n));
  for i in 0..n {
    for j in 0..n {
      inv[[i, j]] = aug[[i, n + j]];
    }
  }
  Some(inv)
}

fn normalized_projected(raw: Array1<f64>, bounds: &Bounds) -> Option<Vec<f64>> {
  let sum = raw.sum();
  if !sum.is_finite() || sum.abs() < 1e-12 {
    return None;
  }
  let mut w: Vec<f64> = raw.iter().map(|v| v / sum).collect();
  if w.iter().any(|v| !v.is_finite()) {
    return None;
  }
  bounds.project(&mut w).ok()?;
  Some(w)
}

/// Unconstrained tangency portfolio `inv(cov) (mu - rf 1)`, normalized and
/// projected into the bounds.
fn tangency_start(
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
  bounds: &Bounds,
) -> Option<Vec<f64>> {
  let inv = gauss_jordan_inverse(cov)?;
  let excess = mu.mapv(|m| m - risk_free);
  normalized_projected(inv.dot(&excess), bounds)
}

/// Unconstrained minimum-variance portfolio `inv(cov) 1 / (1' inv(cov) 1)`.
fn min_vol_start(cov: &Array2<f64>, bounds: &Bounds) -> Option<Vec<f64>> {
  let inv = gauss_jordan_inverse(cov)?;
  let ones = Array1::from_elem(cov.nrows(), 1.0);
  normalized_projected(inv.dot(&ones), bounds)
}

/// Two-fund closed form for the minimum-variance portfolio at a target return.
fn efficient_start(
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  target: f64,
  bounds: &Bounds,
) -> Option<Vec<f64>> {
  let inv = gauss_jordan_inverse(cov)?;
  let ones = Array1::from_elem(cov.nrows(), 1.0);
  let inv_ones = inv.dot(&ones);
  let inv_mu = inv.dot(mu);
  let a = ones.dot(&inv_ones);
  let b = ones.dot(&inv_mu);
  let c = mu.dot(&inv_mu);
  let denom = a * c - b * b;
  if !denom.is_finite() || denom.abs() < 1e-12 {
    return None;
  }
  let lambda = (c - b * target) / denom;
  let gamma = (a * target - b) / denom;
  let raw = inv_mu.mapv(|v| v * lambda) + inv_ones.mapv(|v| v * gamma);
  let mut w = raw.to_vec();
  bounds.project(&mut w).ok()?;
  Some(w)
}

fn start_or_feasible(start: Option<Vec<f64>>, bounds: &Bounds) -> Result<Vec<f64>> {
  match start {
    Some(w) => Ok(w),
    None => bounds.initial_feasible(),
  }
}

/// Find the weights maximizing the Sharpe ratio under the given bounds.
///
/// Fails with [`FrontierError::OptimizationFailed`] when the bounds admit no
/// feasible portfolio or the solver errors out, and with
/// [`FrontierError::DegenerateVolatility`] when every feasible portfolio has
/// ~zero volatility.
pub fn maximize_sharpe(
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
  bounds: &Bounds,
) -> Result<Allocation> {
  validate_inputs(mu, cov, bounds)?;
  bounds.check_feasible()?;

  let start = start_or_feasible(tangency_start(mu, cov, risk_free, bounds), bounds)?;
  let objective = |w: &Array1<f64>| {
    let vol = portfolio_volatility(w, cov);
    if vol < VOL_EPS {
      return f64::INFINITY;
    }
    -(portfolio_return(w, mu) - risk_free) / vol
  };

  let weights = run_projected_search(objective, bounds, start)?;
  let metrics = compute_metrics(&weights, mu, cov, risk_free)?;
  debug!(
    sharpe = metrics.sharpe,
    volatility = metrics.volatility,
    "max-Sharpe solve finished"
  );
  Ok(Allocation { weights, metrics })
}

/// Find the weights minimizing portfolio volatility under the given bounds.
///
/// The Sharpe ratio in the returned metrics uses a zero risk-free rate;
/// recompute with [`compute_metrics`] for a specific rate.
pub fn minimize_volatility(
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  bounds: &Bounds,
) -> Result<Allocation> {
  validate_inputs(mu, cov, bounds)?;
  bounds.check_feasible()?;

  let start = start_or_feasible(min_vol_start(cov, bounds), bounds)?;
  let objective = |w: &Array1<f64>| w.dot(&cov.dot(w));

  let weights = run_projected_search(objective, bounds, start)?;
  let metrics = compute_metrics(&weights, mu, cov, 0.0)?;
  debug!(volatility = metrics.volatility, "min-volatility solve finished");
  Ok(Allocation { weights, metrics })
}

/// Minimum-volatility portfolio whose expected return tracks `target`.
///
/// The target enters as a quadratic penalty, so the achieved return can
/// deviate from `target` by a small amount at the edges of the feasible
/// return range. Sharpe in the returned metrics uses a zero risk-free rate.
pub fn efficient_return(
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  target: f64,
  bounds: &Bounds,
) -> Result<Allocation> {
  validate_inputs(mu, cov, bounds)?;
  bounds.check_feasible()?;

  let start = start_or_feasible(efficient_start(mu, cov, target, bounds), bounds)?;
  let objective = |w: &Array1<f64>| {
    let var = w.dot(&cov.dot(w));
    let ret = portfolio_return(w, mu);
    var + TARGET_PENALTY * (ret - target).powi(2)
  };

  let weights = run_projected_search(objective, bounds, start)?;
  let metrics = compute_metrics(&weights, mu, cov, 0.0)?;
  Ok(Allocation { weights, metrics })
}

/// Highest expected return reachable inside the bounds: fill from the lower
/// bounds toward the upper bounds in descending order of expected return.
pub(crate) fn max_return_weights(mu: &Array1<f64>, bounds: &Bounds) -> Result<Vec<f64>> {
  bounds.check_feasible()?;
  let mut w = bounds.lower().to_vec();
  let mut budget = 1.0 - w.iter().sum::<f64>();

  let mut order: Vec<usize> = (0..mu.len()).collect();
  order.sort_by(|&a, &b| mu[b].partial_cmp(&mu[a]).unwrap_or(Ordering::Equal));

  for i in order {
    if budget <= 1e-15 {
      break;
    }
    let take = (bounds.upper()[i] - w[i]).min(budget);
    w[i] += take;
    budget -= take;
  }
  Ok(w)
}
