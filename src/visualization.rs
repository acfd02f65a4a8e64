//! # Visualization
//!
//! $$
//! (\sigma, R) \mapsto \text{risk-return charts}
//! $$
//!
//! Rendering collaborator: every function here is a pure mapping from
//! immutable analysis results to a [`Plot`]; the numeric core never
//! formats anything for display.

use plotly::common::Anchor;
use plotly::common::DashType;
use plotly::common::Font;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::MarkerSymbol;
use plotly::common::Mode;
use plotly::layout::Annotation;
use plotly::layout::Axis;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;

use crate::market::PriceMatrix;
use crate::portfolio::engine::FrontierAnalysis;
use crate::portfolio::returns::ReturnMatrix;
use crate::portfolio::simulation::SimulationBatch;
use crate::portfolio::types::TRADING_DAYS;

fn risk_return_layout(title: &str) -> Layout {
  Layout::new()
    .title(title)
    .x_axis(Axis::new().title("Expected Volatility"))
    .y_axis(Axis::new().title("Expected Annualised Log Return"))
    .show_legend(true)
}

fn cloud_trace(batch: &SimulationBatch) -> Box<Scatter<f64, f64>> {
  Scatter::new(batch.volatilities.to_vec(), batch.expected_returns.to_vec())
    .mode(Mode::Markers)
    .name("simulated portfolios")
    .marker(Marker::new().size(4).opacity(0.35))
}

fn star_trace(volatility: f64, ret: f64, name: &str, color: &str) -> Box<Scatter<f64, f64>> {
  Scatter::new(vec![volatility], vec![ret])
    .mode(Mode::Markers)
    .name(name)
    .marker(
      Marker::new()
        .symbol(MarkerSymbol::Star)
        .size(16)
        .color(color.to_string()),
    )
}

/// Closing-price history, one line per symbol.
pub fn price_history_plot(prices: &PriceMatrix) -> Plot {
  let dates: Vec<String> = prices.dates.iter().map(|d| d.to_string()).collect();

  let mut plot = Plot::new();
  for (j, symbol) in prices.symbols.iter().enumerate() {
    let closes: Vec<f64> = prices.closes.column(j).to_vec();
    plot.add_trace(
      Scatter::new(dates.clone(), closes)
        .mode(Mode::Lines)
        .name(symbol)
        .line(Line::new().width(2.0)),
    );
  }
  plot.set_layout(
    Layout::new()
      .title("Closing Prices")
      .x_axis(Axis::new().title("Date"))
      .y_axis(Axis::new().title("Close"))
      .show_legend(true),
  );
  plot
}

/// Daily log returns, one line per symbol.
pub fn daily_returns_plot(returns: &ReturnMatrix) -> Plot {
  let dates: Vec<String> = returns.dates.iter().map(|d| d.to_string()).collect();

  let mut plot = Plot::new();
  for (j, symbol) in returns.symbols.iter().enumerate() {
    let series: Vec<f64> = returns.returns.column(j).to_vec();
    plot.add_trace(
      Scatter::new(dates.clone(), series)
        .mode(Mode::Lines)
        .name(symbol)
        .line(Line::new().width(1.0)),
    );
  }
  plot.set_layout(
    Layout::new()
      .title("Daily Log Returns")
      .x_axis(Axis::new().title("Date"))
      .y_axis(Axis::new().title("Daily Return"))
      .show_legend(true),
  );
  plot
}

/// Monte Carlo cloud with its best-Sharpe and lowest-volatility draws.
pub fn simulation_plot(batch: &SimulationBatch) -> Plot {
  let mut plot = Plot::new();
  plot.add_trace(cloud_trace(batch));
  plot.add_trace(star_trace(
    batch.volatilities[batch.max_sharpe_index],
    batch.expected_returns[batch.max_sharpe_index],
    "Maximum Sharpe ratio",
    "red",
  ));
  plot.add_trace(star_trace(
    batch.volatilities[batch.min_volatility_index],
    batch.expected_returns[batch.min_volatility_index],
    "Minimum volatility",
    "green",
  ));
  plot.set_layout(risk_return_layout("Simulated Portfolios"));
  plot
}

/// Cloud, per-asset points, optimal allocations, and the efficient frontier.
pub fn frontier_plot(analysis: &FrontierAnalysis) -> Plot {
  let mut plot = Plot::new();
  plot.add_trace(cloud_trace(&analysis.simulation));

  let mut asset_volatilities = Vec::with_capacity(analysis.moments.n_assets());
  let mut asset_returns = Vec::with_capacity(analysis.moments.n_assets());
  let mut annotations = Vec::with_capacity(analysis.moments.n_assets());
  for (j, symbol) in analysis.returns.symbols.iter().enumerate() {
    let volatility = (analysis.moments.cov[[j, j]] * TRADING_DAYS).sqrt();
    let ret = analysis.moments.mean[j] * TRADING_DAYS;
    asset_volatilities.push(volatility);
    asset_returns.push(ret);
    annotations.push(
      Annotation::new()
        .text(symbol.as_str())
        .x(volatility)
        .y(ret)
        .x_anchor(Anchor::Left)
        .font(Font::new().size(11))
        .show_arrow(false),
    );
  }
  plot.add_trace(
    Scatter::new(asset_volatilities, asset_returns)
      .mode(Mode::Markers)
      .name("individual assets")
      .marker(Marker::new().size(10)),
  );

  plot.add_trace(star_trace(
    analysis.max_sharpe.result.volatility,
    analysis.max_sharpe.result.expected_return,
    "Optimal maximum Sharpe ratio",
    "red",
  ));
  plot.add_trace(star_trace(
    analysis.min_volatility.result.volatility,
    analysis.min_volatility.result.expected_return,
    "Optimal minimum volatility",
    "green",
  ));

  let frontier_volatilities: Vec<f64> = analysis
    .frontier
    .points
    .iter()
    .map(|p| p.volatility)
    .collect();
  let frontier_returns: Vec<f64> = analysis
    .frontier
    .points
    .iter()
    .map(|p| p.target_return)
    .collect();
  plot.add_trace(
    Scatter::new(frontier_volatilities, frontier_returns)
      .mode(Mode::Lines)
      .name("efficient frontier")
      .line(
        Line::new()
          .width(2.0)
          .dash(DashType::DashDot)
          .color("black".to_string()),
      ),
  );

  plot.set_layout(
    risk_return_layout("Portfolio Optimization on the Efficient Frontier")
      .annotations(annotations),
  );
  plot
}

/// Frontier chart extended with the capital allocation line and the
/// investor's utility-optimal mix.
pub fn capital_allocation_plot(analysis: &FrontierAnalysis) -> Plot {
  let mut plot = frontier_plot(analysis);

  let cal = &analysis.capital_allocation;
  plot.add_trace(
    Scatter::new(cal.volatilities.clone(), cal.returns.clone())
      .mode(Mode::Lines)
      .name("Capital Allocation Line")
      .line(Line::new().width(2.0)),
  );

  let (volatility, ret) = cal.optimal_point();
  plot.add_trace(star_trace(
    volatility,
    ret,
    "Investor's optimal portfolio",
    "gray",
  ));

  plot.set_layout(risk_return_layout("Optimal Portfolio Recommendation"));
  plot
}
