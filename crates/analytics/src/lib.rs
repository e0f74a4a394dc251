//! # FundScope Analytics
//!
//! The metric functions that turn one price series into a row of scalars:
//! CAGR, volatility, Sharpe, max drawdown, Calmar and trailing-window returns.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   HTTP or configuration. It depends only on `core-types` (Layer 0).
//! - **Missing, not failing:** Insufficient data or a zero denominator yields
//!   `None` for that one metric. Only an empty series is an error.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: computes a full `MetricsRow` for a series.
//! - `metrics`: the individual metric functions, usable on their own.
//! - `MetricsRow`, `Metric`: the result row and its addressable columns.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;

pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use metrics::{Lookback, PeriodConvention};
pub use report::{Metric, MetricsRow};
