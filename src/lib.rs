//! # frontier-rs
//!
//! $$
//! \mathbf{w}^\* = \arg\max_{\mathbf{w}\in\mathcal{W}}
//! \frac{\mathbf{w}^\top\mu - r_f}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}},
//! \qquad
//! \mathcal{W} = \{\mathbf{w} : \textstyle\sum_i w_i = 1,\ l_i \le w_i \le u_i\}
//! $$
//!
//! Single-period mean-variance portfolio optimization: aligned close-price
//! panels, return statistics, constrained max-Sharpe and min-volatility
//! solvers, lazy efficient-frontier tracing and chart construction.

pub mod config;
pub mod error;
pub mod market;
pub mod portfolio;
pub mod stats;
pub mod visualization;

pub use error::FrontierError;
pub use market::PriceSeries;
pub use market::ReturnSeries;
pub use portfolio::compute_metrics;
pub use portfolio::efficient_return;
pub use portfolio::maximize_sharpe;
pub use portfolio::minimize_volatility;
pub use portfolio::random_portfolios;
pub use portfolio::trace_frontier;
pub use portfolio::Allocation;
pub use portfolio::Bounds;
pub use portfolio::FrontierPoint;
pub use portfolio::FrontierTrace;
pub use portfolio::PortfolioMetrics;
pub use visualization::FrontierPlot;
