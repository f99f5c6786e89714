//! # Visualization
//!
//! $$
//! \{(\sigma_k, r_k)\}_k \mapsto \text{efficient frontier chart}
//! $$
//!
//! Chart construction for frontier traces and the two distinguished
//! portfolios. Builds a [`plotly::Plot`]; rendering and file output are up
//! to the caller.

use plotly::common::DashType;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::Mode;
use plotly::layout::Axis;
use plotly::layout::Legend;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;

use crate::portfolio::FrontierPoint;
use crate::portfolio::PortfolioMetrics;

/// Builder for the efficient-frontier chart.
pub struct FrontierPlot {
  title: String,
  percent: bool,
  frontier: Vec<FrontierPoint>,
  max_sharpe: Option<PortfolioMetrics>,
  min_volatility: Option<PortfolioMetrics>,
  cloud: Vec<PortfolioMetrics>,
}

impl FrontierPlot {
  pub fn new() -> Self {
    Self {
      title: "Portfolio Optimization with Efficient Frontier".to_string(),
      percent: true,
      frontier: Vec::new(),
      max_sharpe: None,
      min_volatility: None,
      cloud: Vec::new(),
    }
  }

  pub fn title(mut self, title: &str) -> Self {
    self.title = title.into();
    self
  }

  /// Render axes in percent instead of raw fractions.
  pub fn percent(mut self, percent: bool) -> Self {
    self.percent = percent;
    self
  }

  pub fn frontier(mut self, points: &[FrontierPoint]) -> Self {
    self.frontier = points.to_vec();
    self
  }

  pub fn max_sharpe(mut self, metrics: PortfolioMetrics) -> Self {
    self.max_sharpe = Some(metrics);
    self
  }

  pub fn min_volatility(mut self, metrics: PortfolioMetrics) -> Self {
    self.min_volatility = Some(metrics);
    self
  }

  /// Background cloud of simulated candidate portfolios.
  pub fn cloud(mut self, metrics: &[PortfolioMetrics]) -> Self {
    self.cloud = metrics.to_vec();
    self
  }

  pub fn build(self) -> Plot {
    let scale = if self.percent { 100.0 } else { 1.0 };
    let mut plot = Plot::new();

    if !self.cloud.is_empty() {
      let x: Vec<f64> = self.cloud.iter().map(|m| m.volatility * scale).collect();
      let y: Vec<f64> = self.cloud.iter().map(|m| m.expected_return * scale).collect();
      plot.add_trace(
        Scatter::new(x, y)
          .name("Simulated Portfolios")
          .mode(Mode::Markers)
          .marker(Marker::new().size(4).color("rgba(99,110,250,0.35)")),
      );
    }

    if !self.frontier.is_empty() {
      let x: Vec<f64> = self
        .frontier
        .iter()
        .map(|p| p.metrics.volatility * scale)
        .collect();
      let y: Vec<f64> = self
        .frontier
        .iter()
        .map(|p| p.metrics.expected_return * scale)
        .collect();
      plot.add_trace(
        Scatter::new(x, y)
          .name("Efficient Frontier")
          .mode(Mode::Lines)
          .line(Line::new().color("black").width(2.0).dash(DashType::Solid)),
      );
    }

    if let Some(m) = self.max_sharpe {
      plot.add_trace(
        Scatter::new(vec![m.volatility * scale], vec![m.expected_return * scale])
          .name("Max Sharpe Ratio")
          .mode(Mode::Markers)
          .marker(
            Marker::new()
              .size(14)
              .color("red")
              .line(Line::new().width(3.0).color("black")),
          ),
      );
    }

    if let Some(m) = self.min_volatility {
      plot.add_trace(
        Scatter::new(vec![m.volatility * scale], vec![m.expected_return * scale])
          .name("Min Volatility")
          .mode(Mode::Markers)
          .marker(
            Marker::new()
              .size(14)
              .color("green")
              .line(Line::new().width(3.0).color("black")),
          ),
      );
    }

    let unit = if self.percent { " (%)" } else { "" };
    plot.set_layout(
      Layout::new()
        .title(self.title.as_str())
        .x_axis(Axis::new().title(format!("Annualized Volatility{unit}")))
        .y_axis(Axis::new().title(format!("Annualized Return{unit}")))
        .show_legend(true)
        .legend(
          Legend::new()
            .x(0.75)
            .y(0.02)
            .background_color("white")
            .border_color("black")
            .border_width(2),
        )
        .width(800)
        .height(600),
    );

    plot
  }
}
