//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Single-period mean-variance portfolio optimization: metrics, constrained
//! solvers and efficient-frontier tracing.

pub mod frontier;
pub mod metrics;
pub mod solver;
pub mod types;

pub use frontier::random_portfolios;
pub use frontier::trace_frontier;
pub use frontier::FrontierTrace;
pub use metrics::compute_metrics;
pub use solver::efficient_return;
pub use solver::maximize_sharpe;
pub use solver::minimize_volatility;
pub use types::Allocation;
pub use types::Bounds;
pub use types::FrontierPoint;
pub use types::PortfolioMetrics;
pub use types::VOL_EPS;
pub use types::WEIGHT_SUM_TOL;
