//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Mean-variance portfolio analysis: log returns, moment estimation, Monte
//! Carlo simulation, constrained optimization, and the capital allocation
//! line.

pub mod cal;
pub mod engine;
pub mod evaluate;
pub mod moments;
pub mod optimizer;
pub mod returns;
pub mod simulation;
pub mod types;

pub use cal::capital_allocation_line;
pub use cal::CapitalAllocation;
pub use engine::FrontierAnalysis;
pub use engine::FrontierConfig;
pub use engine::FrontierEngine;
pub use evaluate::evaluate_allocation;
pub use evaluate::validate_weights;
pub use moments::estimate_moments;
pub use optimizer::efficient_frontier;
pub use optimizer::efficient_frontier_between;
pub use optimizer::max_sharpe_allocation;
pub use optimizer::min_volatility_allocation;
pub use optimizer::SolveOptions;
pub use returns::log_returns;
pub use returns::ReturnMatrix;
pub use simulation::simulate_portfolios;
pub use simulation::SimulationBatch;
pub use simulation::SimulationConfig;
pub use types::AllocationResult;
pub use types::FrontierCurve;
pub use types::FrontierPoint;
pub use types::Moments;
pub use types::OptimalAllocation;
pub use types::TRADING_DAYS;
pub use types::WEIGHT_SUM_TOLERANCE;
