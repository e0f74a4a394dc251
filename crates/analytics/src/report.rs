use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every scalar metric computed for a fund, one row per fund.
///
/// This is the output of the `AnalyticsEngine` and the input to ranking. Metrics
/// that are undefined for the series (too short, zero stdev, no drawdown) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub fund: String,
    /// `None` when the series has no observations.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub observations: usize,

    // I. Growth
    pub total_return: Option<f64>,
    pub cagr: Option<f64>,

    // II. Risk
    pub volatility: Option<f64>,
    pub sharpe: Option<f64>,
    pub max_drawdown: Option<f64>, // Non-positive fraction
    pub calmar: Option<f64>,

    // III. Trailing windows
    pub return_1m: Option<f64>,
    pub return_3m: Option<f64>,
    pub return_6m: Option<f64>,
    pub return_ytd: Option<f64>,
    pub return_1y: Option<f64>,
}

impl MetricsRow {
    /// Reads one metric column by name.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TotalReturn => self.total_return,
            Metric::Cagr => self.cagr,
            Metric::Volatility => self.volatility,
            Metric::Sharpe => self.sharpe,
            Metric::MaxDrawdown => self.max_drawdown,
            Metric::Calmar => self.calmar,
            Metric::Return1M => self.return_1m,
            Metric::Return3M => self.return_3m,
            Metric::Return6M => self.return_6m,
            Metric::ReturnYtd => self.return_ytd,
            Metric::Return1Y => self.return_1y,
        }
    }
}

/// The columns of a [`MetricsRow`] that can be addressed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    TotalReturn,
    Cagr,
    Volatility,
    Sharpe,
    MaxDrawdown,
    Calmar,
    Return1M,
    Return3M,
    Return6M,
    ReturnYtd,
    Return1Y,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::TotalReturn,
        Metric::Cagr,
        Metric::Volatility,
        Metric::Sharpe,
        Metric::MaxDrawdown,
        Metric::Calmar,
        Metric::Return1M,
        Metric::Return3M,
        Metric::Return6M,
        Metric::ReturnYtd,
        Metric::Return1Y,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::TotalReturn => "total_return",
            Metric::Cagr => "cagr",
            Metric::Volatility => "volatility",
            Metric::Sharpe => "sharpe",
            Metric::MaxDrawdown => "max_drawdown",
            Metric::Calmar => "calmar",
            Metric::Return1M => "return_1m",
            Metric::Return3M => "return_3m",
            Metric::Return6M => "return_6m",
            Metric::ReturnYtd => "return_ytd",
            Metric::Return1Y => "return_1y",
        }
    }

    /// True for metrics expressed as a fraction that reads best as a percentage.
    pub fn is_percentage(&self) -> bool {
        !matches!(self, Metric::Sharpe | Metric::Calmar)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>(), Ok(metric));
        }
        assert_eq!("CAGR".parse::<Metric>(), Ok(Metric::Cagr));
        assert!("alpha".parse::<Metric>().is_err());
    }
}
