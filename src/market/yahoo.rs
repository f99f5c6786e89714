//! # Yahoo Finance Data
//!
//! Daily close download for a ticker universe over a date range. Kept behind
//! the `yahoo` feature so the core stays free of network dependencies.

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;
use time::OffsetDateTime;
use tracing::info;
use yahoo_finance_api::YahooConnector;

use crate::market::PriceSeries;

fn to_offset(date: NaiveDate) -> Result<OffsetDateTime> {
  let ts = date.and_time(NaiveTime::MIN).and_utc().timestamp();
  OffsetDateTime::from_unix_timestamp(ts).with_context(|| format!("date {date} out of range"))
}

/// Fetch adjusted daily closes for every ticker in `[start, end)` and align
/// them into a [`PriceSeries`].
pub fn fetch_daily_closes(
  tickers: &[String],
  start: NaiveDate,
  end: NaiveDate,
) -> Result<PriceSeries> {
  let provider = YahooConnector::new().context("building Yahoo Finance connector")?;
  let start_odt = to_offset(start)?;
  let end_odt = to_offset(end)?;

  let mut series = Vec::with_capacity(tickers.len());
  for ticker in tickers {
    let response = provider
      .get_quote_history_interval(ticker, start_odt, end_odt, "1d")
      .with_context(|| format!("downloading quote history for {ticker}"))?;
    let quotes = response
      .quotes()
      .with_context(|| format!("reading quotes for {ticker}"))?;

    let mut closes = Vec::with_capacity(quotes.len());
    for quote in &quotes {
      let date = DateTime::from_timestamp(quote.timestamp as i64, 0)
        .ok_or_else(|| anyhow!("quote timestamp {} out of range", quote.timestamp))?
        .date_naive();
      closes.push((date, quote.adjclose));
    }
    info!(ticker = ticker.as_str(), quotes = closes.len(), "fetched daily closes");

    series.push((ticker.clone(), closes));
  }

  Ok(PriceSeries::from_closes(series)?)
}
