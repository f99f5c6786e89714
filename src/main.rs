use anyhow::Result;
use clap::Parser;
use frontier_rs::config::AppConfig;
use frontier_rs::config::Cli;
use frontier_rs::market::PriceSeries;
use frontier_rs::portfolio;
use frontier_rs::portfolio::Allocation;
use frontier_rs::portfolio::Bounds;
use frontier_rs::portfolio::PortfolioMetrics;
use frontier_rs::stats;
use frontier_rs::visualization::FrontierPlot;
use indicatif::ProgressBar;
use prettytable::row;
use prettytable::Table;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "yahoo")]
fn load_prices(config: &AppConfig) -> Result<PriceSeries> {
  frontier_rs::market::yahoo::fetch_daily_closes(
    &config.tickers,
    config.start_date,
    config.end_date,
  )
}

#[cfg(not(feature = "yahoo"))]
fn load_prices(config: &AppConfig) -> Result<PriceSeries> {
  use chrono::Datelike;
  use chrono::Weekday;

  tracing::warn!("built without the `yahoo` feature, generating synthetic GBM prices");
  let days = config
    .start_date
    .iter_days()
    .take_while(|d| *d < config.end_date)
    .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
    .count();
  Ok(frontier_rs::market::synthetic::gbm_prices(
    &config.tickers,
    config.start_date,
    days,
    config.seed,
  )?)
}

fn print_summary(
  tickers: &[String],
  max_sharpe: &Allocation,
  min_vol: &Allocation,
  min_vol_metrics: PortfolioMetrics,
) {
  let mut weights = Table::new();
  weights.add_row(row!["Ticker", "Max Sharpe", "Min Volatility"]);
  for (i, ticker) in tickers.iter().enumerate() {
    weights.add_row(row![
      ticker,
      format!("{:.2}%", max_sharpe.weights[i] * 100.0),
      format!("{:.2}%", min_vol.weights[i] * 100.0),
    ]);
  }
  weights.printstd();

  let mut metrics = Table::new();
  metrics.add_row(row!["Portfolio", "Return", "Volatility", "Sharpe"]);
  metrics.add_row(row![
    "Max Sharpe",
    format!("{:.2}%", max_sharpe.metrics.expected_return * 100.0),
    format!("{:.2}%", max_sharpe.metrics.volatility * 100.0),
    format!("{:.3}", max_sharpe.metrics.sharpe),
  ]);
  metrics.add_row(row![
    "Min Volatility",
    format!("{:.2}%", min_vol_metrics.expected_return * 100.0),
    format!("{:.2}%", min_vol_metrics.volatility * 100.0),
    format!("{:.3}", min_vol_metrics.sharpe),
  ]);
  metrics.printstd();
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = Cli::parse().into_config()?;
  info!(tickers = ?config.tickers, "starting efficient frontier run");

  let prices = load_prices(&config)?;
  let returns = prices.returns();
  let mu = stats::annualize_returns(&stats::mean_returns(&returns), config.periods_per_year);
  let cov = stats::annualize_covariance(&stats::covariance(&returns)?, config.periods_per_year);

  let bounds = Bounds::uniform(mu.len(), config.weight_bounds.0, config.weight_bounds.1)?;

  let max_sharpe = portfolio::maximize_sharpe(&mu, &cov, config.risk_free_rate, &bounds)?;
  let min_vol = portfolio::minimize_volatility(&mu, &cov, &bounds)?;
  let min_vol_metrics =
    portfolio::compute_metrics(&min_vol.weights, &mu, &cov, config.risk_free_rate)?;

  let trace =
    portfolio::trace_frontier(&mu, &cov, config.risk_free_rate, &bounds, config.frontier_points)?;
  let progress = ProgressBar::new(trace.len() as u64);
  let mut points = Vec::with_capacity(trace.len());
  for point in trace {
    points.push(point?);
    progress.inc(1);
  }
  progress.finish_and_clear();

  let cloud = portfolio::random_portfolios(
    &mu,
    &cov,
    config.risk_free_rate,
    &bounds,
    config.simulations,
    config.seed,
  )?;

  print_summary(prices.tickers(), &max_sharpe, &min_vol, min_vol_metrics);

  let plot = FrontierPlot::new()
    .frontier(&points)
    .max_sharpe(max_sharpe.metrics)
    .min_volatility(min_vol_metrics)
    .cloud(&cloud)
    .build();
  plot.write_html(&config.output);
  info!(output = %config.output.display(), "wrote efficient frontier chart");

  Ok(())
}
