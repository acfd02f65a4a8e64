//! # Market Data
//!
//! $$
//! P \in \mathbb{R}_{>0}^{T \times k}
//! $$
//!
//! Price-feed interface and closing-price matrix assembly.

use std::collections::BTreeSet;
use std::collections::HashMap;

use chrono::NaiveDate;
use ndarray::Array2;

use crate::error::PortfolioError;
use crate::error::Result;

/// Ordered closing-price series for a single symbol.
#[derive(Clone, Debug)]
pub struct PriceSeries {
  pub symbol: String,
  /// Ascending trading dates.
  pub dates: Vec<NaiveDate>,
  /// Close per trading date.
  pub closes: Vec<f64>,
}

/// Closing prices on a common trading-date grid, one column per symbol.
#[derive(Clone, Debug)]
pub struct PriceMatrix {
  /// Ascending trading dates, one per row.
  pub dates: Vec<NaiveDate>,
  /// Column labels.
  pub symbols: Vec<String>,
  /// Close of `symbols[j]` on `dates[i]`.
  pub closes: Array2<f64>,
}

impl PriceMatrix {
  pub fn n_assets(&self) -> usize {
    self.closes.ncols()
  }

  pub fn n_rows(&self) -> usize {
    self.closes.nrows()
  }
}

/// External price-feed collaborator.
pub trait PriceFeedExt {
  /// Ordered closing prices for `symbol` within `[start, end]`.
  fn closing_prices(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}

/// In-memory feed backed by preloaded series.
///
/// Used by tests and the demo binary; any feed speaking [`PriceFeedExt`]
/// can replace it.
#[derive(Clone, Debug, Default)]
pub struct StaticPriceFeed {
  series: HashMap<String, PriceSeries>,
}

impl StaticPriceFeed {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a series under its symbol, replacing any previous one.
  pub fn insert(&mut self, series: PriceSeries) {
    self.series.insert(series.symbol.clone(), series);
  }
}

impl PriceFeedExt for StaticPriceFeed {
  fn closing_prices(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    let series = self
      .series
      .get(symbol)
      .ok_or_else(|| PortfolioError::DataUnavailable {
        symbol: symbol.to_string(),
        reason: "unknown symbol".to_string(),
      })?;

    let mut dates = Vec::new();
    let mut closes = Vec::new();
    for (date, close) in series.dates.iter().zip(series.closes.iter()) {
      if *date >= start && *date <= end {
        dates.push(*date);
        closes.push(*close);
      }
    }

    if dates.is_empty() {
      return Err(PortfolioError::DataUnavailable {
        symbol: symbol.to_string(),
        reason: format!("no closes between {} and {}", start, end),
      });
    }

    Ok(PriceSeries {
      symbol: symbol.to_string(),
      dates,
      closes,
    })
  }
}

/// Fetch every symbol from the feed and align the series on their common
/// trading dates (inner join). Dates missing for any symbol are dropped, so
/// no column of the resulting matrix has holes.
pub fn fetch_price_matrix(
  feed: &impl PriceFeedExt,
  symbols: &[&str],
  start: NaiveDate,
  end: NaiveDate,
) -> Result<PriceMatrix> {
  if symbols.is_empty() {
    return Err(PortfolioError::InvalidPriceData(
      "at least one symbol required".to_string(),
    ));
  }

  let mut all_series = Vec::with_capacity(symbols.len());
  for symbol in symbols {
    all_series.push(feed.closing_prices(symbol, start, end)?);
  }

  let mut common: BTreeSet<NaiveDate> = all_series[0].dates.iter().copied().collect();
  for series in &all_series[1..] {
    let dates: BTreeSet<NaiveDate> = series.dates.iter().copied().collect();
    common = common.intersection(&dates).copied().collect();
  }

  if common.is_empty() {
    return Err(PortfolioError::InvalidPriceData(
      "no trading dates shared by all symbols".to_string(),
    ));
  }

  let dates: Vec<NaiveDate> = common.into_iter().collect();
  let mut closes = Array2::zeros((dates.len(), all_series.len()));
  for (j, series) in all_series.iter().enumerate() {
    let by_date: HashMap<NaiveDate, f64> = series
      .dates
      .iter()
      .copied()
      .zip(series.closes.iter().copied())
      .collect();
    for (i, date) in dates.iter().enumerate() {
      closes[[i, j]] = by_date[date];
    }
  }

  Ok(PriceMatrix {
    dates,
    symbols: symbols.iter().map(|s| s.to_string()).collect(),
    closes,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn feed_with(series: Vec<(&str, Vec<(NaiveDate, f64)>)>) -> StaticPriceFeed {
    let mut feed = StaticPriceFeed::new();
    for (symbol, rows) in series {
      feed.insert(PriceSeries {
        symbol: symbol.to_string(),
        dates: rows.iter().map(|(d, _)| *d).collect(),
        closes: rows.iter().map(|(_, c)| *c).collect(),
      });
    }
    feed
  }

  #[test]
  fn unknown_symbol_is_unavailable() {
    let feed = StaticPriceFeed::new();
    let err = feed
      .closing_prices("XYZ", date(2024, 1, 1), date(2024, 1, 31))
      .unwrap_err();
    assert!(matches!(err, PortfolioError::DataUnavailable { .. }));
  }

  #[test]
  fn empty_range_is_unavailable() {
    let feed = feed_with(vec![("AAA", vec![(date(2024, 1, 3), 10.0)])]);
    let err = feed
      .closing_prices("AAA", date(2024, 2, 1), date(2024, 2, 28))
      .unwrap_err();
    assert!(matches!(err, PortfolioError::DataUnavailable { .. }));
  }

  #[test]
  fn matrix_aligns_on_common_dates() {
    let feed = feed_with(vec![
      (
        "AAA",
        vec![
          (date(2024, 1, 2), 10.0),
          (date(2024, 1, 3), 11.0),
          (date(2024, 1, 4), 12.0),
        ],
      ),
      (
        "BBB",
        vec![(date(2024, 1, 2), 20.0), (date(2024, 1, 4), 22.0)],
      ),
    ]);

    let matrix =
      fetch_price_matrix(&feed, &["AAA", "BBB"], date(2024, 1, 1), date(2024, 1, 31)).unwrap();

    // Jan 3 is missing for BBB and must be dropped for both.
    assert_eq!(matrix.dates, vec![date(2024, 1, 2), date(2024, 1, 4)]);
    assert_eq!(matrix.closes[[0, 0]], 10.0);
    assert_eq!(matrix.closes[[1, 0]], 12.0);
    assert_eq!(matrix.closes[[0, 1]], 20.0);
    assert_eq!(matrix.closes[[1, 1]], 22.0);
  }

  #[test]
  fn disjoint_dates_are_rejected() {
    let feed = feed_with(vec![
      ("AAA", vec![(date(2024, 1, 2), 10.0)]),
      ("BBB", vec![(date(2024, 1, 3), 20.0)]),
    ]);

    let err = fetch_price_matrix(&feed, &["AAA", "BBB"], date(2024, 1, 1), date(2024, 1, 31))
      .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidPriceData(_)));
  }
}
