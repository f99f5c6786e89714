//! # Errors
//!
//! Failure kinds surfaced by data preparation and optimization. No retries
//! happen inside the crate; callers decide what to do with a failed run.

use thiserror::Error;

/// Errors produced by the market, stats and portfolio modules.
#[derive(Debug, Error)]
pub enum FrontierError {
  /// A ticker ended up with fewer than 2 usable observations.
  #[error("insufficient data for {ticker}: {observations} usable observations, need at least 2")]
  InsufficientData { ticker: String, observations: usize },

  /// A weight vector violated the sum-to-one or finiteness constraints.
  #[error("invalid weights: {0}")]
  InvalidWeights(String),

  /// Portfolio volatility is ~0 and the Sharpe ratio is undefined.
  #[error("portfolio volatility is degenerate, Sharpe ratio undefined")]
  DegenerateVolatility,

  /// The solver failed to produce a feasible allocation.
  #[error("optimization failed: {0}")]
  OptimizationFailed(String),

  /// Input shapes disagree (weights vs. returns vs. covariance vs. bounds).
  #[error("dimension mismatch: {0}")]
  DimensionMismatch(String),
}

pub type Result<T> = std::result::Result<T, FrontierError>;
