//! # Mean-Variance Portfolio Analysis
//!
//! `markowitz-rs` computes Markowitz efficient-frontier analyses for a set
//! of equities: daily log returns, moment estimation, Monte Carlo portfolio
//! simulation, and constrained optimization for the maximum-Sharpe and
//! minimum-volatility allocations, plus the capital allocation line.
//!
//! ## Modules
//!
//! | Module            | Description                                                              |
//! |-------------------|--------------------------------------------------------------------------|
//! | [`error`]         | Typed failure taxonomy shared by the whole crate.                        |
//! | [`market`]        | Price-feed interface and closing-price matrix assembly.                  |
//! | [`portfolio`]     | Returns, moments, simulation, optimization, and the capital allocation line. |
//! | [`visualization`] | Plotly figures built from immutable analysis results.                    |
//!
//! ## Example Usage
//!
//! ```rust
//! use markowitz_rs::portfolio::{FrontierConfig, FrontierEngine};
//!
//! let engine = FrontierEngine::new(FrontierConfig::default());
//! let analysis = engine.analyze(&prices)?;
//! ```

pub mod error;
pub mod market;
pub mod portfolio;
pub mod visualization;

pub use error::PortfolioError;
