//! # Portfolio Types
//!
//! $$
//! \mathbf{w} \in \{\, \mathbf{w} : \textstyle\sum_i w_i = 1,\ l_i \le w_i \le u_i \,\}
//! $$
//!
//! Weight constraints and result containers shared by the optimizers.

use ndarray::Array1;

use crate::error::FrontierError;
use crate::error::Result;

/// Tolerance on the weight sum accepted by [`compute_metrics`](crate::portfolio::compute_metrics).
pub const WEIGHT_SUM_TOL: f64 = 1e-6;

/// Volatility below this is treated as degenerate (Sharpe undefined).
pub const VOL_EPS: f64 = 1e-12;

/// Per-asset box constraints on portfolio weights.
#[derive(Clone, Debug)]
pub struct Bounds {
  lower: Vec<f64>,
  upper: Vec<f64>,
}

impl Bounds {
  /// Long-only constraints, `0 <= w_i <= 1` for every asset.
  pub fn long_only(n: usize) -> Self {
    Self {
      lower: vec![0.0; n],
      upper: vec![1.0; n],
    }
  }

  /// The same `[lo, hi]` interval for every asset.
  pub fn uniform(n: usize, lo: f64, hi: f64) -> Result<Self> {
    if !(lo.is_finite() && hi.is_finite()) || lo > hi {
      return Err(FrontierError::OptimizationFailed(format!(
        "invalid weight bound [{lo}, {hi}]"
      )));
    }
    Ok(Self {
      lower: vec![lo; n],
      upper: vec![hi; n],
    })
  }

  /// Explicit per-asset `(lo, hi)` intervals.
  pub fn per_asset(intervals: &[(f64, f64)]) -> Result<Self> {
    for &(lo, hi) in intervals {
      if !(lo.is_finite() && hi.is_finite()) || lo > hi {
        return Err(FrontierError::OptimizationFailed(format!(
          "invalid weight bound [{lo}, {hi}]"
        )));
      }
    }
    Ok(Self {
      lower: intervals.iter().map(|b| b.0).collect(),
      upper: intervals.iter().map(|b| b.1).collect(),
    })
  }

  pub fn len(&self) -> usize {
    self.lower.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lower.is_empty()
  }

  pub fn lower(&self) -> &[f64] {
    &self.lower
  }

  pub fn upper(&self) -> &[f64] {
    &self.upper
  }

  /// Fail unless the simplex `{sum w = 1}` intersects the box.
  pub fn check_feasible(&self) -> Result<()> {
    let lower_sum: f64 = self.lower.iter().sum();
    let upper_sum: f64 = self.upper.iter().sum();
    if lower_sum - 1.0 > 1e-9 || upper_sum + 1e-9 < 1.0 {
      return Err(FrontierError::OptimizationFailed(format!(
        "bounds infeasible: lower weights sum to {lower_sum:.4}, upper to {upper_sum:.4}"
      )));
    }
    Ok(())
  }

  /// True when every weight lies inside its interval within `tol`.
  pub fn contains(&self, weights: &[f64], tol: f64) -> bool {
    weights.len() == self.len()
      && weights
        .iter()
        .zip(self.lower.iter().zip(self.upper.iter()))
        .all(|(w, (lo, hi))| *w >= lo - tol && *w <= hi + tol)
  }

  /// A feasible starting point: lower bounds plus the remaining mass spread
  /// proportionally to each asset's headroom.
  pub fn initial_feasible(&self) -> Result<Vec<f64>> {
    self.check_feasible()?;
    let mut weights = self.lower.clone();
    let remaining = 1.0 - weights.iter().sum::<f64>();
    if remaining > 0.0 {
      let capacities: Vec<f64> = self
        .upper
        .iter()
        .zip(weights.iter())
        .map(|(hi, w)| hi - w)
        .collect();
      let total_cap: f64 = capacities.iter().sum();
      if total_cap <= 1e-12 {
        return Err(FrontierError::OptimizationFailed(
          "no headroom left to reach a unit weight sum".into(),
        ));
      }
      for (w, cap) in weights.iter_mut().zip(capacities.iter()) {
        *w += remaining * cap / total_cap;
      }
    }
    Ok(weights)
  }

  /// Project an arbitrary vector onto `{sum w = 1}` intersected with the box:
  /// clamp into the intervals, then redistribute the deficit or excess in
  /// proportion to the remaining headroom. Exact in one pass whenever
  /// [`check_feasible`](Self::check_feasible) holds.
  pub fn project(&self, weights: &mut [f64]) -> Result<()> {
    if weights.len() != self.len() {
      return Err(FrontierError::DimensionMismatch(format!(
        "{} weights vs {} bounds",
        weights.len(),
        self.len()
      )));
    }
    for (w, (lo, hi)) in weights
      .iter_mut()
      .zip(self.lower.iter().zip(self.upper.iter()))
    {
      if !w.is_finite() {
        *w = *lo;
      }
      *w = w.clamp(*lo, *hi);
    }

    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() < 1e-12 {
      return Ok(());
    }

    if sum < 1.0 {
      let deficit = 1.0 - sum;
      let capacities: Vec<f64> = self
        .upper
        .iter()
        .zip(weights.iter())
        .map(|(hi, w)| hi - w)
        .collect();
      let total_cap: f64 = capacities.iter().sum();
      if total_cap <= 1e-12 {
        return Err(FrontierError::OptimizationFailed(
          "projection ran out of upper-bound headroom".into(),
        ));
      }
      for (w, cap) in weights.iter_mut().zip(capacities.iter()) {
        *w += deficit * cap / total_cap;
      }
    } else {
      let excess = sum - 1.0;
      let removable: Vec<f64> = weights
        .iter()
        .zip(self.lower.iter())
        .map(|(w, lo)| (w - lo).max(0.0))
        .collect();
      let total_rm: f64 = removable.iter().sum();
      if total_rm <= 1e-12 {
        return Err(FrontierError::OptimizationFailed(
          "projection ran out of lower-bound headroom".into(),
        ));
      }
      for (w, rm) in weights.iter_mut().zip(removable.iter()) {
        *w -= excess * rm / total_rm;
      }
    }
    Ok(())
  }
}

/// Scalar summary of a portfolio under fixed `(mu, cov, risk_free)` inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortfolioMetrics {
  /// Expected portfolio return, `w' mu`.
  pub expected_return: f64,
  /// Portfolio volatility, `sqrt(w' cov w)`.
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
}

/// An optimized weight vector together with its metrics.
#[derive(Clone, Debug)]
pub struct Allocation {
  pub weights: Array1<f64>,
  pub metrics: PortfolioMetrics,
}

/// One frontier sample: the requested target return and the portfolio found.
#[derive(Clone, Debug)]
pub struct FrontierPoint {
  pub target_return: f64,
  pub weights: Array1<f64>,
  pub metrics: PortfolioMetrics,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn projection_restores_sum_and_bounds() {
    let bounds = Bounds::uniform(3, 0.0, 0.6).unwrap();
    let mut w = vec![0.9, 0.9, 0.9];
    bounds.project(&mut w).unwrap();

    let sum: f64 = w.iter().sum();
    assert!((sum - 1.0).abs() < 1e-12);
    assert!(bounds.contains(&w, 1e-12));
  }

  #[test]
  fn projection_fills_deficit_proportionally() {
    let bounds = Bounds::long_only(2);
    let mut w = vec![0.2, 0.2];
    bounds.project(&mut w).unwrap();

    assert!((w[0] - 0.5).abs() < 1e-12);
    assert!((w[1] - 0.5).abs() < 1e-12);
  }

  #[test]
  fn infeasible_bounds_are_rejected() {
    let bounds = Bounds::uniform(4, 0.0, 0.2).unwrap();
    assert!(matches!(
      bounds.check_feasible(),
      Err(FrontierError::OptimizationFailed(_))
    ));
  }

  #[test]
  fn initial_feasible_respects_lower_bounds() {
    let bounds = Bounds::per_asset(&[(0.1, 1.0), (0.3, 0.5), (0.0, 1.0)]).unwrap();
    let w = bounds.initial_feasible().unwrap();

    let sum: f64 = w.iter().sum();
    assert!((sum - 1.0).abs() < 1e-12);
    assert!(bounds.contains(&w, 1e-12));
    assert!(w[1] >= 0.3);
  }
}
