//! # Configuration
//!
//! YAML settings merged with command-line overrides: the file supplies
//! defaults, flags win. Only the binary touches this module; the optimizer
//! itself takes plain parameters.

use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use serde::Deserialize;
use serde::Serialize;

/// Application settings for one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Ticker universe.
  pub tickers: Vec<String>,
  /// First day of the price history (inclusive).
  pub start_date: NaiveDate,
  /// Last day of the price history (exclusive).
  pub end_date: NaiveDate,
  /// Annualized risk-free rate, e.g. 0.01 for 1%.
  pub risk_free_rate: f64,
  /// Number of frontier points to trace.
  pub frontier_points: usize,
  /// Number of random candidate portfolios for the chart backdrop.
  pub simulations: usize,
  /// Trading periods per year used for annualization.
  pub periods_per_year: f64,
  /// `[lo, hi]` weight interval applied to every asset.
  pub weight_bounds: (f64, f64),
  /// Output path of the rendered HTML chart.
  pub output: PathBuf,
  /// Seed for the synthetic data generator and the simulation cloud.
  pub seed: u64,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      tickers: ["AMZN", "AAPL", "MSFT", "GOOGL"]
        .iter()
        .map(|t| t.to_string())
        .collect(),
      start_date: NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid date"),
      end_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
      risk_free_rate: 0.01,
      frontier_points: 50,
      simulations: 5000,
      periods_per_year: 252.0,
      weight_bounds: (0.0, 1.0),
      output: PathBuf::from("frontier.html"),
      seed: 42,
    }
  }
}

impl AppConfig {
  /// Read settings from a YAML file.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading configuration file {}", path.display()))?;
    let config: Self = serde_yaml::from_str(&raw)
      .with_context(|| format!("parsing configuration file {}", path.display()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> anyhow::Result<()> {
    if self.tickers.is_empty() {
      bail!("at least one ticker is required");
    }
    if self.start_date >= self.end_date {
      bail!(
        "start date {} is not before end date {}",
        self.start_date,
        self.end_date
      );
    }
    if self.frontier_points == 0 {
      bail!("frontier_points must be at least 1");
    }
    if self.weight_bounds.0 > self.weight_bounds.1 {
      bail!(
        "weight bounds [{}, {}] are inverted",
        self.weight_bounds.0,
        self.weight_bounds.1
      );
    }
    Ok(())
  }
}

/// Command-line interface. Every flag overrides its configuration-file
/// counterpart.
#[derive(Debug, Parser)]
#[command(
  name = "frontier-rs",
  version,
  about = "Efficient-frontier portfolio optimizer"
)]
pub struct Cli {
  /// Path to the YAML configuration file.
  #[arg(long, default_value = "config.yaml")]
  pub config: PathBuf,

  /// Ticker symbols (space separated).
  #[arg(long, num_args = 1..)]
  pub tickers: Option<Vec<String>>,

  /// Start date, YYYY-MM-DD.
  #[arg(long)]
  pub start_date: Option<NaiveDate>,

  /// End date, YYYY-MM-DD.
  #[arg(long)]
  pub end_date: Option<NaiveDate>,

  /// Annualized risk-free rate.
  #[arg(long)]
  pub risk_free_rate: Option<f64>,

  /// Number of frontier points.
  #[arg(long)]
  pub frontier_points: Option<usize>,

  /// Number of simulated candidate portfolios.
  #[arg(long)]
  pub simulations: Option<usize>,

  /// Output path for the HTML chart.
  #[arg(long)]
  pub output: Option<PathBuf>,

  /// Seed for synthetic data and simulations.
  #[arg(long)]
  pub seed: Option<u64>,
}

impl Cli {
  /// Resolve the final configuration: file (or defaults when the file is
  /// absent) overridden by whatever flags were given.
  pub fn into_config(self) -> anyhow::Result<AppConfig> {
    let mut config = if self.config.exists() {
      AppConfig::load(&self.config)?
    } else {
      AppConfig::default()
    };

    if let Some(tickers) = self.tickers {
      config.tickers = tickers;
    }
    if let Some(start_date) = self.start_date {
      config.start_date = start_date;
    }
    if let Some(end_date) = self.end_date {
      config.end_date = end_date;
    }
    if let Some(risk_free_rate) = self.risk_free_rate {
      config.risk_free_rate = risk_free_rate;
    }
    if let Some(frontier_points) = self.frontier_points {
      config.frontier_points = frontier_points;
    }
    if let Some(simulations) = self.simulations {
      config.simulations = simulations;
    }
    if let Some(output) = self.output {
      config.output = output;
    }
    if let Some(seed) = self.seed {
      config.seed = seed;
    }

    config.validate()?;
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn yaml_overrides_defaults_field_by_field() {
    let yaml = "
tickers: [SPY, QQQ]
risk_free_rate: 0.02
frontier_points: 25
";
    let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.tickers, vec!["SPY".to_string(), "QQQ".to_string()]);
    assert_eq!(config.risk_free_rate, 0.02);
    assert_eq!(config.frontier_points, 25);
    // Untouched fields keep their defaults.
    assert_eq!(config.seed, 42);
    assert_eq!(config.weight_bounds, (0.0, 1.0));
  }

  #[test]
  fn cli_flags_win_over_file_defaults() {
    let cli = Cli {
      config: PathBuf::from("does-not-exist.yaml"),
      tickers: Some(vec!["SPY".to_string()]),
      start_date: None,
      end_date: None,
      risk_free_rate: Some(0.03),
      frontier_points: None,
      simulations: None,
      output: None,
      seed: Some(7),
    };

    let config = cli.into_config().unwrap();
    assert_eq!(config.tickers, vec!["SPY".to_string()]);
    assert_eq!(config.risk_free_rate, 0.03);
    assert_eq!(config.seed, 7);
    assert_eq!(config.frontier_points, 50);
  }

  #[test]
  fn inverted_dates_are_rejected() {
    let mut config = AppConfig::default();
    config.start_date = config.end_date;
    assert!(config.validate().is_err());
  }

  #[test]
  fn empty_universe_is_rejected() {
    let config = AppConfig {
      tickers: Vec::new(),
      ..AppConfig::default()
    };
    assert!(config.validate().is_err());
  }
}
