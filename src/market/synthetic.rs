//! # Synthetic Prices
//!
//! $$
//! S_t = S_{t-1}\,e^{(\mu - \tfrac{1}{2}\sigma^2)\Delta t + \sigma\,\Delta W_t}
//! $$
//!
//! Seeded geometric Brownian motion closes so the demo pipeline runs without
//! network access. Per-ticker drift, volatility and initial price are drawn
//! deterministically from the seed.

use chrono::Datelike;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::Weekday;
use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Normal;

use crate::error::FrontierError;
use crate::error::Result;
use crate::market::PriceSeries;

const TRADING_DT: f64 = 1.0 / 252.0;

fn weekdays_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
  let mut dates = Vec::with_capacity(count);
  let mut current = start;
  while dates.len() < count {
    if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
      dates.push(current);
    }
    current = current + Duration::days(1);
  }
  dates
}

/// Generate `days` daily GBM closes per ticker, starting at `start` and
/// skipping weekends. Identical inputs produce identical panels.
pub fn gbm_prices(
  tickers: &[String],
  start: NaiveDate,
  days: usize,
  seed: u64,
) -> Result<PriceSeries> {
  if days < 2 {
    return Err(FrontierError::InsufficientData {
      ticker: tickers.first().cloned().unwrap_or_default(),
      observations: days,
    });
  }

  let dates = weekdays_from(start, days);
  let mut series = Vec::with_capacity(tickers.len());

  for (idx, ticker) in tickers.iter().enumerate() {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(idx as u64));
    let drift = rng.gen_range(0.02..0.18);
    let sigma = rng.gen_range(0.10..0.35);
    let s0 = rng.gen_range(20.0..400.0);

    let gn = Array1::<f64>::random_using(
      days - 1,
      Normal::new(0.0, TRADING_DT.sqrt()).unwrap(),
      &mut rng,
    );

    let mut closes = Vec::with_capacity(days);
    let mut s = s0;
    closes.push((dates[0], s));
    for (i, date) in dates.iter().enumerate().skip(1) {
      s *= ((drift - 0.5 * sigma * sigma) * TRADING_DT + sigma * gn[i - 1]).exp();
      closes.push((*date, s));
    }

    series.push((ticker.clone(), closes));
  }

  PriceSeries::from_closes(series)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
  }

  #[test]
  fn panels_are_reproducible_per_seed() {
    let tickers = vec!["AAA".to_string(), "BBB".to_string()];

    let a = gbm_prices(&tickers, start(), 30, 42).unwrap();
    let b = gbm_prices(&tickers, start(), 30, 42).unwrap();
    assert_eq!(a.closes(), b.closes());

    let c = gbm_prices(&tickers, start(), 30, 43).unwrap();
    assert_ne!(a.closes(), c.closes());
  }

  #[test]
  fn closes_are_positive_on_weekdays_only() {
    let tickers = vec!["AAA".to_string()];
    let prices = gbm_prices(&tickers, start(), 50, 1).unwrap();

    assert_eq!(prices.n_observations(), 50);
    assert!(prices.closes().iter().all(|c| *c > 0.0));
    assert!(prices
      .dates()
      .iter()
      .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
  }

  #[test]
  fn too_short_panels_are_rejected() {
    let tickers = vec!["AAA".to_string()];
    assert!(matches!(
      gbm_prices(&tickers, start(), 1, 1),
      Err(FrontierError::InsufficientData { .. })
    ));
  }
}
