//! # Market Data
//!
//! $$
//! r_t = \frac{p_t}{p_{t-1}} - 1
//! $$
//!
//! Close-price panels aligned onto a common date grid and the period returns
//! derived from them. Observations are sorted by date, duplicate dates keep
//! the last close, and non-positive or non-finite closes are dropped before
//! alignment; whatever survives counts against the two-observation minimum.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use ndarray::Array2;
use tracing::debug;

use crate::error::FrontierError;
use crate::error::Result;

pub mod synthetic;
#[cfg(feature = "yahoo")]
pub mod yahoo;

/// Close prices for a set of tickers on a shared, strictly increasing date
/// grid. Rows are dates, columns are tickers.
#[derive(Clone, Debug)]
pub struct PriceSeries {
  tickers: Vec<String>,
  dates: Vec<NaiveDate>,
  closes: Array2<f64>,
}

impl PriceSeries {
  /// Align per-ticker `(date, close)` observations onto their common dates.
  ///
  /// Fails with [`FrontierError::InsufficientData`] when any ticker has
  /// fewer than 2 usable observations, before or after alignment.
  pub fn from_closes(series: Vec<(String, Vec<(NaiveDate, f64)>)>) -> Result<Self> {
    if series.is_empty() {
      return Err(FrontierError::DimensionMismatch("no tickers supplied".into()));
    }

    let mut per_ticker: Vec<(String, BTreeMap<NaiveDate, f64>)> = Vec::with_capacity(series.len());
    for (ticker, observations) in series {
      let cleaned: BTreeMap<NaiveDate, f64> = observations
        .into_iter()
        .filter(|(_, close)| close.is_finite() && *close > 0.0)
        .collect();
      if cleaned.len() < 2 {
        return Err(FrontierError::InsufficientData {
          ticker,
          observations: cleaned.len(),
        });
      }
      per_ticker.push((ticker, cleaned));
    }

    let mut common: BTreeSet<NaiveDate> = per_ticker[0].1.keys().copied().collect();
    for (_, observations) in per_ticker.iter().skip(1) {
      common.retain(|date| observations.contains_key(date));
    }
    if common.len() < 2 {
      let (ticker, observations) = per_ticker
        .iter()
        .min_by_key(|(_, obs)| obs.len())
        .expect("at least one ticker present");
      return Err(FrontierError::InsufficientData {
        ticker: ticker.clone(),
        observations: common.len().min(observations.len()),
      });
    }

    let dates: Vec<NaiveDate> = common.into_iter().collect();
    debug!(
      tickers = per_ticker.len(),
      aligned_dates = dates.len(),
      "aligned close panel onto common date grid"
    );
    let mut closes = Array2::<f64>::zeros((dates.len(), per_ticker.len()));
    for (col, (_, observations)) in per_ticker.iter().enumerate() {
      for (row, date) in dates.iter().enumerate() {
        closes[[row, col]] = observations[date];
      }
    }

    Ok(Self {
      tickers: per_ticker.into_iter().map(|(t, _)| t).collect(),
      dates,
      closes,
    })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Aligned close matrix, rows = dates, columns = tickers.
  pub fn closes(&self) -> &Array2<f64> {
    &self.closes
  }

  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  pub fn n_observations(&self) -> usize {
    self.dates.len()
  }

  /// Period-over-period percentage returns.
  pub fn returns(&self) -> ReturnSeries {
    let t = self.dates.len();
    let n = self.tickers.len();
    let mut returns = Array2::<f64>::zeros((t - 1, n));
    for row in 1..t {
      for col in 0..n {
        returns[[row - 1, col]] = self.closes[[row, col]] / self.closes[[row - 1, col]] - 1.0;
      }
    }

    ReturnSeries {
      tickers: self.tickers.clone(),
      dates: self.dates[1..].to_vec(),
      returns,
    }
  }
}

/// Percentage returns on the aligned grid; one row per period, one column
/// per ticker. Row `i` is dated at the end of the period it covers.
#[derive(Clone, Debug)]
pub struct ReturnSeries {
  tickers: Vec<String>,
  dates: Vec<NaiveDate>,
  returns: Array2<f64>,
}

impl ReturnSeries {
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn values(&self) -> &Array2<f64> {
    &self.returns
  }

  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  pub fn n_periods(&self) -> usize {
    self.returns.nrows()
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
  }

  #[test]
  fn alignment_keeps_only_common_dates() {
    let series = vec![
      (
        "AAA".to_string(),
        vec![(day(1), 10.0), (day(2), 11.0), (day(3), 12.0)],
      ),
      ("BBB".to_string(), vec![(day(1), 20.0), (day(3), 22.0)]),
    ];

    let prices = PriceSeries::from_closes(series).unwrap();
    assert_eq!(prices.dates(), &[day(1), day(3)]);
    assert_eq!(prices.closes().shape(), &[2, 2]);
    assert_abs_diff_eq!(prices.closes()[[1, 0]], 12.0, epsilon = 1e-12);
  }

  #[test]
  fn observations_are_sorted_and_deduplicated() {
    let series = vec![(
      "AAA".to_string(),
      vec![(day(3), 12.0), (day(1), 10.0), (day(3), 13.0), (day(2), 11.0)],
    )];

    let prices = PriceSeries::from_closes(series).unwrap();
    assert_eq!(prices.dates(), &[day(1), day(2), day(3)]);
    // Duplicate day keeps the last close seen.
    assert_abs_diff_eq!(prices.closes()[[2, 0]], 13.0, epsilon = 1e-12);
  }

  #[test]
  fn non_positive_closes_are_dropped() {
    let series = vec![(
      "AAA".to_string(),
      vec![(day(1), 10.0), (day(2), 0.0), (day(3), -1.0)],
    )];

    let err = PriceSeries::from_closes(series).unwrap_err();
    assert!(matches!(
      err,
      FrontierError::InsufficientData { observations: 1, .. }
    ));
  }

  #[test]
  fn too_few_observations_fail() {
    let err = PriceSeries::from_closes(vec![("AAA".to_string(), vec![(day(1), 10.0)])]).unwrap_err();
    assert!(matches!(err, FrontierError::InsufficientData { .. }));

    let err = PriceSeries::from_closes(vec![]).unwrap_err();
    assert!(matches!(err, FrontierError::DimensionMismatch(_)));
  }

  #[test]
  fn disjoint_dates_fail_with_insufficient_data() {
    let series = vec![
      ("AAA".to_string(), vec![(day(1), 10.0), (day(2), 11.0)]),
      ("BBB".to_string(), vec![(day(3), 20.0), (day(4), 21.0)]),
    ];

    let err = PriceSeries::from_closes(series).unwrap_err();
    assert!(matches!(err, FrontierError::InsufficientData { .. }));
  }

  #[test]
  fn percentage_returns_match_by_hand_values() {
    let series = vec![(
      "AAA".to_string(),
      vec![(day(1), 100.0), (day(2), 110.0), (day(3), 99.0)],
    )];

    let returns = PriceSeries::from_closes(series).unwrap().returns();
    assert_eq!(returns.n_periods(), 2);
    assert_eq!(returns.dates(), &[day(2), day(3)]);
    assert_abs_diff_eq!(returns.values()[[0, 0]], 0.10, epsilon = 1e-12);
    assert_abs_diff_eq!(returns.values()[[1, 0]], -0.10, epsilon = 1e-12);
  }
}
