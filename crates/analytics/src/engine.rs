use crate::error::AnalyticsError;
use crate::metrics::{self, Lookback, PeriodConvention};
use crate::report::MetricsRow;
use core_types::PriceSeries;

/// A stateless calculator for deriving performance metrics from a price series.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticsEngine {
    convention: PeriodConvention,
    risk_free_rate: f64,
}

impl AnalyticsEngine {
    /// # Arguments
    ///
    /// * `convention` - How many observations make up a year.
    /// * `risk_free_rate` - Annual risk-free rate as a fraction, used by Sharpe.
    pub fn new(convention: PeriodConvention, risk_free_rate: f64) -> Result<Self, AnalyticsError> {
        if let PeriodConvention::Fixed(p) = convention {
            if !(p.is_finite() && p > 0.0) {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "periods per year must be positive, got {p}"
                )));
            }
        }
        if !risk_free_rate.is_finite() {
            return Err(AnalyticsError::InvalidParameter(format!(
                "risk-free rate must be finite, got {risk_free_rate}"
            )));
        }
        Ok(Self {
            convention,
            risk_free_rate,
        })
    }

    pub fn convention(&self) -> PeriodConvention {
        self.convention
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// Never fails: a metric the series cannot support is `None`, and an empty
    /// series yields a row with no dates and every metric `None`.
    pub fn calculate(&self, series: &PriceSeries) -> MetricsRow {
        if series.is_empty() {
            tracing::warn!(fund = %series.id(), "Series has no observations");
        }

        let row = MetricsRow {
            fund: series.id().to_string(),
            start_date: series.first().map(|p| p.date),
            end_date: series.last().map(|p| p.date),
            observations: series.len(),
            total_return: metrics::total_return(series),
            cagr: metrics::cagr(series, self.convention),
            volatility: metrics::volatility(series, self.convention),
            sharpe: metrics::sharpe(series, self.convention, self.risk_free_rate),
            max_drawdown: metrics::max_drawdown(series),
            calmar: metrics::calmar(series, self.convention),
            return_1m: metrics::lookback_return(series, Lookback::OneMonth),
            return_3m: metrics::lookback_return(series, Lookback::ThreeMonths),
            return_6m: metrics::lookback_return(series, Lookback::SixMonths),
            return_ytd: metrics::ytd_return(series),
            return_1y: metrics::lookback_return(series, Lookback::OneYear),
        };

        if row.sharpe.is_none() && series.len() > 2 {
            tracing::debug!(fund = %row.fund, "Sharpe ratio undefined (zero volatility or unknown period)");
        }

        row
    }
}
