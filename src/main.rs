use anyhow::Context;
use anyhow::Result;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;
use rand_distr::Normal;

use markowitz_rs::market::fetch_price_matrix;
use markowitz_rs::market::PriceSeries;
use markowitz_rs::market::StaticPriceFeed;
use markowitz_rs::portfolio::FrontierConfig;
use markowitz_rs::portfolio::FrontierEngine;
use markowitz_rs::visualization::capital_allocation_plot;
use markowitz_rs::visualization::daily_returns_plot;
use markowitz_rs::visualization::frontier_plot;
use markowitz_rs::visualization::price_history_plot;
use markowitz_rs::visualization::simulation_plot;

/// (symbol, initial close, daily drift, daily volatility)
const UNIVERSE: [(&str, f64, f64, f64); 4] = [
  ("VNM", 86.0, 0.0004, 0.016),
  ("FPT", 94.5, 0.0009, 0.019),
  ("HPG", 27.8, 0.0007, 0.024),
  ("MWG", 52.3, 0.0005, 0.021),
];

const TRADING_DAYS_IN_SAMPLE: usize = 252;

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let start = NaiveDate::from_ymd_opt(2023, 1, 2).context("invalid start date")?;
  let feed = synthetic_feed(start)?;
  let symbols: Vec<&str> = UNIVERSE.iter().map(|(symbol, ..)| *symbol).collect();

  let end = NaiveDate::from_ymd_opt(2023, 12, 29).context("invalid end date")?;
  let prices = fetch_price_matrix(&feed, &symbols, start, end)?;

  let engine = FrontierEngine::new(FrontierConfig {
    risk_free: 0.02,
    n_portfolios: 5000,
    n_frontier_points: 50,
    risk_aversion: 10.0,
    seed: Some(42),
    ..FrontierConfig::default()
  });
  let analysis = engine.analyze(&prices)?;

  println!("Maximum Sharpe allocation:");
  for (symbol, weight) in symbols.iter().zip(analysis.max_sharpe.weights.iter()) {
    println!("  {:<4} {:>7.4}", symbol, weight);
  }
  println!(
    "  return {:.4}  volatility {:.4}  sharpe {:.4}",
    analysis.max_sharpe.result.expected_return,
    analysis.max_sharpe.result.volatility,
    analysis.max_sharpe.result.sharpe_ratio
  );

  println!("Minimum volatility allocation:");
  for (symbol, weight) in symbols.iter().zip(analysis.min_volatility.weights.iter()) {
    println!("  {:<4} {:>7.4}", symbol, weight);
  }
  println!(
    "  return {:.4}  volatility {:.4}  sharpe {:.4}",
    analysis.min_volatility.result.expected_return,
    analysis.min_volatility.result.volatility,
    analysis.min_volatility.result.sharpe_ratio
  );

  println!(
    "Efficient frontier: {} points solved, {} skipped",
    analysis.frontier.points.len(),
    analysis.frontier.skipped
  );

  let (cal_volatility, cal_return) = analysis.capital_allocation.optimal_point();
  println!(
    "Investor optimum on the CAL (a = {}): volatility {:.4}, return {:.4}",
    analysis.capital_allocation.risk_aversion, cal_volatility, cal_return
  );

  price_history_plot(&prices).write_html("target/price_history.html");
  daily_returns_plot(&analysis.returns).write_html("target/daily_returns.html");
  simulation_plot(&analysis.simulation).write_html("target/simulated_portfolios.html");
  frontier_plot(&analysis).write_html("target/efficient_frontier.html");
  capital_allocation_plot(&analysis).write_html("target/capital_allocation.html");
  println!("Charts written to target/*.html");

  Ok(())
}

/// Deterministic geometric random-walk closes standing in for a live feed.
fn synthetic_feed(start: NaiveDate) -> Result<StaticPriceFeed> {
  let mut feed = StaticPriceFeed::new();
  let mut rng = StdRng::seed_from_u64(7);

  for (symbol, initial, drift, volatility) in UNIVERSE {
    let normal = Normal::new(drift, volatility).context("invalid walk parameters")?;

    let mut dates = Vec::with_capacity(TRADING_DAYS_IN_SAMPLE);
    let mut closes = Vec::with_capacity(TRADING_DAYS_IN_SAMPLE);
    let mut date = start;
    let mut close = initial;
    for _ in 0..TRADING_DAYS_IN_SAMPLE {
      dates.push(date);
      closes.push(close);
      close *= normal.sample(&mut rng).exp();
      date = date.succ_opt().context("date overflow")?;
    }

    feed.insert(PriceSeries {
      symbol: symbol.to_string(),
      dates,
      closes,
    });
  }

  Ok(feed)
}
