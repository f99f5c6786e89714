//! # Efficient Frontier
//!
//! $$
//! \sigma^\*(r) = \min_{\mathbf{w}} \sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}
//! \quad \text{s.t.} \quad \mathbf{w}^\top\mu = r
//! $$
//!
//! Lazy frontier tracing over the achievable return range, plus the
//! Monte-Carlo candidate cloud used as a plotting backdrop.

use ndarray::Array1;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Exp1;
use rayon::prelude::*;
use tracing::debug;

use crate::error::FrontierError;
use crate::error::Result;
use crate::portfolio::metrics::compute_metrics;
use crate::portfolio::solver::efficient_return;
use crate::portfolio::solver::max_return_weights;
use crate::portfolio::solver::minimize_volatility;
use crate::portfolio::types::Bounds;
use crate::portfolio::types::FrontierPoint;
use crate::portfolio::types::PortfolioMetrics;

/// Lazy, finite, restartable sweep of frontier portfolios.
///
/// Each call to [`Iterator::next`] solves one target-return portfolio, so
/// consuming only part of the trace only pays for the points actually taken.
/// [`reset`](Self::reset) restarts iteration from the first target.
#[derive(Clone, Debug)]
pub struct FrontierTrace {
  mu: Array1<f64>,
  cov: Array2<f64>,
  risk_free: f64,
  bounds: Bounds,
  targets: Vec<f64>,
  next: usize,
}

impl FrontierTrace {
  /// Total number of frontier points in the trace.
  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }

  /// Target returns the trace will sweep, lowest first.
  pub fn targets(&self) -> &[f64] {
    &self.targets
  }

  /// Restart iteration from the first target.
  pub fn reset(&mut self) {
    self.next = 0;
  }

  /// Solve every point sequentially.
  pub fn points(&self) -> Result<Vec<FrontierPoint>> {
    self.targets.iter().map(|&t| self.solve_point(t)).collect()
  }

  /// Solve every point with independent parallel trials. Point order in the
  /// output matches the target order.
  pub fn points_par(&self) -> Result<Vec<FrontierPoint>> {
    self
      .targets
      .par_iter()
      .map(|&t| self.solve_point(t))
      .collect()
  }

  fn solve_point(&self, target: f64) -> Result<FrontierPoint> {
    let alloc = efficient_return(&self.mu, &self.cov, target, &self.bounds)?;
    let metrics = compute_metrics(&alloc.weights, &self.mu, &self.cov, self.risk_free)?;
    Ok(FrontierPoint {
      target_return: target,
      weights: alloc.weights,
      metrics,
    })
  }
}

impl Iterator for FrontierTrace {
  type Item = Result<FrontierPoint>;

  fn next(&mut self) -> Option<Self::Item> {
    let target = *self.targets.get(self.next)?;
    self.next += 1;
    Some(self.solve_point(target))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.targets.len() - self.next;
    (remaining, Some(remaining))
  }
}

/// Build a [`FrontierTrace`] of `num_points` targets spanning the achievable
/// return range, from the minimum-volatility return up to the highest return
/// the bounds admit.
pub fn trace_frontier(
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
  bounds: &Bounds,
  num_points: usize,
) -> Result<FrontierTrace> {
  let min_vol = minimize_volatility(mu, cov, bounds)?;
  let w_max = Array1::from(max_return_weights(mu, bounds)?);

  let r_lo = min_vol.metrics.expected_return;
  let r_hi = w_max.dot(mu).max(r_lo);
  let targets = Array1::linspace(r_lo, r_hi, num_points).to_vec();
  debug!(
    num_points,
    r_lo, r_hi, "frontier targets spanning achievable return range"
  );

  Ok(FrontierTrace {
    mu: mu.clone(),
    cov: cov.clone(),
    risk_free,
    bounds: bounds.clone(),
    targets,
    next: 0,
  })
}

/// Metrics of `n` random feasible portfolios, deterministic per `seed`.
///
/// Weights are flat-Dirichlet draws (normalized unit exponentials) projected
/// into the bounds; trials whose metrics are degenerate are skipped, so the
/// output can be shorter than `n`. Trials run in parallel and are
/// independent, matching the one-shot no-retry contract of the solvers.
pub fn random_portfolios(
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
  bounds: &Bounds,
  n: usize,
  seed: u64,
) -> Result<Vec<PortfolioMetrics>> {
  if bounds.len() != mu.len() {
    return Err(FrontierError::DimensionMismatch(format!(
      "{} expected returns vs {} bounds",
      mu.len(),
      bounds.len()
    )));
  }
  bounds.check_feasible()?;

  let metrics = (0..n)
    .into_par_iter()
    .filter_map(|i| {
      let mut rng =
        StdRng::seed_from_u64(seed.wrapping_add((i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)));
      let mut w: Vec<f64> = (0..mu.len()).map(|_| rng.sample::<f64, _>(Exp1)).collect();
      let total: f64 = w.iter().sum();
      if total <= 0.0 {
        return None;
      }
      for v in &mut w {
        *v /= total;
      }
      bounds.project(&mut w).ok()?;
      compute_metrics(&Array1::from(w), mu, cov, risk_free).ok()
    })
    .collect();

  Ok(metrics)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  fn three_asset() -> (Array1<f64>, Array2<f64>) {
    (
      array![0.08, 0.12, 0.18],
      array![
        [0.04, 0.006, 0.0],
        [0.006, 0.09, 0.012],
        [0.0, 0.012, 0.16]
      ],
    )
  }

  #[test]
  fn min_volatility_lower_bounds_the_frontier() {
    let (mu, cov) = three_asset();
    let bounds = Bounds::long_only(3);
    let min_vol = minimize_volatility(&mu, &cov, &bounds).unwrap();

    let trace = trace_frontier(&mu, &cov, 0.02, &bounds, 20).unwrap();
    for point in trace.points().unwrap() {
      assert!(min_vol.metrics.volatility <= point.metrics.volatility + 1e-6);
    }
  }

  #[test]
  fn targets_span_the_achievable_range() {
    let (mu, cov) = three_asset();
    let bounds = Bounds::long_only(3);
    let trace = trace_frontier(&mu, &cov, 0.02, &bounds, 11).unwrap();

    let targets = trace.targets();
    assert_eq!(targets.len(), 11);
    assert!(targets.windows(2).all(|w| w[1] >= w[0]));
    // Long-only upper end: everything in the highest-return asset.
    assert_abs_diff_eq!(targets[10], 0.18, epsilon = 1e-12);
  }

  #[test]
  fn trace_is_lazy_and_restartable() {
    let (mu, cov) = three_asset();
    let bounds = Bounds::long_only(3);
    let mut trace = trace_frontier(&mu, &cov, 0.02, &bounds, 5).unwrap();

    let first = trace.next().unwrap().unwrap();
    let _second = trace.next().unwrap().unwrap();

    trace.reset();
    let first_again = trace.next().unwrap().unwrap();
    assert_eq!(first.target_return, first_again.target_return);
    assert_abs_diff_eq!(
      first.metrics.volatility,
      first_again.metrics.volatility,
      epsilon = 1e-12
    );
  }

  #[test]
  fn parallel_points_match_sequential_points() {
    let (mu, cov) = three_asset();
    let bounds = Bounds::long_only(3);
    let trace = trace_frontier(&mu, &cov, 0.02, &bounds, 8).unwrap();

    let seq = trace.points().unwrap();
    let par = trace.points_par().unwrap();
    assert_eq!(seq.len(), par.len());
    for (a, b) in seq.iter().zip(par.iter()) {
      assert_eq!(a.target_return, b.target_return);
      assert_abs_diff_eq!(a.metrics.volatility, b.metrics.volatility, epsilon = 1e-12);
    }
  }

  #[test]
  fn random_portfolios_are_deterministic_per_seed() {
    let (mu, cov) = three_asset();
    let bounds = Bounds::long_only(3);

    let a = random_portfolios(&mu, &cov, 0.02, &bounds, 64, 7).unwrap();
    let b = random_portfolios(&mu, &cov, 0.02, &bounds, 64, 7).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
      assert_eq!(x, y);
    }

    let c = random_portfolios(&mu, &cov, 0.02, &bounds, 64, 8).unwrap();
    assert!(a.iter().zip(c.iter()).any(|(x, y)| x != y));
  }
}
