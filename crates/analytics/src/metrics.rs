//! Single-series metric functions.
//!
//! Every function takes one [`PriceSeries`] and returns `Option<f64>`. `None`
//! means "undefined for this series". Examples are a look-back window longer
//! than the history, a zero standard deviation, or a zero drawdown under
//! Calmar. No function here treats insufficient data as an error.

use chrono::{Datelike, Duration, NaiveDate};
use core_types::PriceSeries;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

const DAYS_PER_YEAR: f64 = 365.25;

/// Standard deviations at or below this are treated as zero.
const ZERO_STDEV: f64 = 1e-12;

/// How many observations make up one year.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PeriodConvention {
    /// Infer from the calendar span of the series: `len / span_years`.
    #[default]
    Calendar,
    /// A fixed number of periods per year, e.g. 252 trading days or 12 months.
    Fixed(f64),
}

impl PeriodConvention {
    /// Resolves the periods per year for `series`, or `None` if undefined.
    pub fn periods_per_year(&self, series: &PriceSeries) -> Option<f64> {
        match *self {
            PeriodConvention::Fixed(p) => (p.is_finite() && p > 0.0).then_some(p),
            PeriodConvention::Calendar => infer_periods_per_year(series),
        }
    }
}

/// The trailing windows reported for every fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl Lookback {
    pub fn days(&self) -> i64 {
        match self {
            Lookback::OneMonth => 30,
            Lookback::ThreeMonths => 91,
            Lookback::SixMonths => 182,
            Lookback::OneYear => 365,
        }
    }
}

/// Calendar years between the first and last observation.
/// `None` for an empty series or one spanning zero days.
pub fn span_years(series: &PriceSeries) -> Option<f64> {
    let (first, last) = (series.first()?, series.last()?);
    let days = (last.date - first.date).num_days();
    (days > 0).then(|| days as f64 / DAYS_PER_YEAR)
}

/// Average number of observations per year. Funds deal on different calendars,
/// so this is derived from the dates rather than assumed.
pub fn infer_periods_per_year(series: &PriceSeries) -> Option<f64> {
    span_years(series).map(|years| series.len() as f64 / years)
}

/// Simple returns between consecutive observations.
/// A step starting from a zero value has no defined return and is skipped.
pub fn period_returns(series: &PriceSeries) -> Vec<f64> {
    series
        .values_f64()
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Last / first - 1 over the whole series.
pub fn total_return(series: &PriceSeries) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    ratio_minus_one(series.last()?.value, series.first()?.value)
}

/// Compound annual growth rate.
///
/// With `Fixed(p)` this is `(last/first)^(p / n_periods) - 1` where
/// `n_periods = len - 1`. With `Calendar` the exponent is `1 / span_years`.
pub fn cagr(series: &PriceSeries, convention: PeriodConvention) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let growth = total_return(series)? + 1.0;

    let exponent = match convention {
        PeriodConvention::Fixed(p) if p.is_finite() && p > 0.0 => {
            p / (series.len() - 1) as f64
        }
        PeriodConvention::Fixed(_) => return None,
        PeriodConvention::Calendar => 1.0 / span_years(series)?,
    };

    finite(growth.powf(exponent) - 1.0)
}

/// Annualized volatility: sample stdev of period returns times `sqrt(periods_per_year)`.
pub fn volatility(series: &PriceSeries, convention: PeriodConvention) -> Option<f64> {
    let ppy = convention.periods_per_year(series)?;
    let std = sample_std(&period_returns(series))?;
    finite(std * ppy.sqrt())
}

/// Annualized Sharpe ratio.
///
/// `risk_free_rate` is annual and is spread evenly over the periods of a year.
/// Returns `None` for a zero-stdev series; it is never reported as 0.
pub fn sharpe(
    series: &PriceSeries,
    convention: PeriodConvention,
    risk_free_rate: f64,
) -> Option<f64> {
    let ppy = convention.periods_per_year(series)?;
    let returns = period_returns(series);
    let std = sample_std(&returns)?;
    if std <= ZERO_STDEV {
        return None;
    }
    let excess = mean(&returns)? - risk_free_rate / ppy;
    finite(excess / std * ppy.sqrt())
}

/// The deepest peak-to-trough decline, as a non-positive fraction (-0.25 is -25%).
pub fn max_drawdown(series: &PriceSeries) -> Option<f64> {
    let values = series.values_f64();
    let mut peak = *values.first()?;
    let mut mdd = 0.0_f64;

    for v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            mdd = mdd.min(v / peak - 1.0);
        }
    }

    Some(mdd)
}

/// CAGR / |max drawdown|. `None` when the series never drew down.
pub fn calmar(series: &PriceSeries, convention: PeriodConvention) -> Option<f64> {
    let mdd = max_drawdown(series)?;
    if mdd == 0.0 {
        return None;
    }
    finite(cagr(series, convention)? / mdd.abs())
}

/// Return over the trailing `days`, ending at the last observation.
///
/// The start value is the last observation strictly before `end - days`. If the
/// series does not reach back that far the result is `None`.
pub fn period_return(series: &PriceSeries, days: i64) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let end = series.last()?;
    let start = series.last_before(end.date - Duration::days(days))?;
    ratio_minus_one(end.value, start.value)
}

/// Return over a standard trailing window.
pub fn lookback_return(series: &PriceSeries, window: Lookback) -> Option<f64> {
    period_return(series, window.days())
}

/// Year-to-date return, anchored on the last observation of the previous year.
pub fn ytd_return(series: &PriceSeries) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let end = series.last()?;
    let prior_year_end = NaiveDate::from_ymd_opt(end.date.year() - 1, 12, 31)?;
    let start = series.last_on_or_before(prior_year_end)?;
    ratio_minus_one(end.value, start.value)
}

/// One simple return per calendar year.
///
/// Year Y is measured from the last value of Y-1 to the last value of Y. A year
/// whose previous calendar year has no data (the first year, or the year after
/// a gap) is measured from its own first observation, so it is a partial-year
/// figure. Such a year with a single observation has no return.
pub fn annual_returns(series: &PriceSeries) -> BTreeMap<i32, f64> {
    // year -> (first value, last value, observations)
    let mut by_year: BTreeMap<i32, (f64, f64, usize)> = BTreeMap::new();
    for (point, value) in series.points().iter().zip(series.values_f64()) {
        by_year
            .entry(point.date.year())
            .and_modify(|(_, last, count)| {
                *last = value;
                *count += 1;
            })
            .or_insert((value, value, 1));
    }

    let mut out = BTreeMap::new();
    let mut prev: Option<(i32, f64)> = None;
    for (year, (first, last, count)) in by_year {
        let base = match prev {
            Some((prev_year, close)) if prev_year == year - 1 => Some(close),
            _ if count >= 2 => Some(first),
            _ => None,
        };
        if let Some(base) = base.filter(|b| *b > 0.0) {
            if let Some(r) = finite(last / base - 1.0) {
                out.insert(year, r);
            }
        }
        prev = Some((year, last));
    }
    out
}

fn ratio_minus_one(end: rust_decimal::Decimal, start: rust_decimal::Decimal) -> Option<f64> {
    let (end, start) = (end.to_f64()?, start.to_f64()?);
    if start <= 0.0 {
        return None;
    }
    finite(end / start - 1.0)
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1). Needs at least two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core_types::PricePoint;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// A daily series starting on 2020-01-01.
    fn daily(values: &[f64]) -> PriceSeries {
        let start = d(2020, 1, 1);
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                PricePoint::new(
                    start + Duration::days(i as i64),
                    Decimal::from_f64_retain(*v).unwrap(),
                )
            })
            .collect();
        PriceSeries::new("TEST", points).unwrap()
    }

    fn dated(points: &[(NaiveDate, f64)]) -> PriceSeries {
        let points = points
            .iter()
            .map(|(date, v)| PricePoint::new(*date, Decimal::from_f64_retain(*v).unwrap()))
            .collect();
        PriceSeries::new("TEST", points).unwrap()
    }

    #[rstest]
    #[case(PeriodConvention::Calendar)]
    #[case(PeriodConvention::Fixed(252.0))]
    fn constant_series_has_zero_cagr_and_drawdown(#[case] convention: PeriodConvention) {
        let series = daily(&[10.0; 30]);
        assert_relative_eq!(cagr(&series, convention).unwrap(), 0.0);
        assert_eq!(max_drawdown(&series), Some(0.0));
    }

    #[test]
    fn increasing_series_never_draws_down() {
        let series = daily(&[1.0, 1.5, 1.6, 2.0, 7.5, 7.6]);
        assert_eq!(max_drawdown(&series), Some(0.0));
    }

    #[test]
    fn doubling_over_one_period_with_yearly_convention_is_100_percent() {
        let series = dated(&[(d(2020, 12, 31), 100.0), (d(2021, 12, 31), 200.0)]);
        assert_relative_eq!(
            cagr(&series, PeriodConvention::Fixed(1.0)).unwrap(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn calendar_cagr_uses_the_span_in_years() {
        // 4 * 365.25 days in total, so the exponent is exactly 1/4.
        let series = dated(&[(d(2020, 1, 1), 100.0), (d(2024, 1, 1), 200.0)]);
        let expected = 2.0_f64.powf(365.25 / 1461.0) - 1.0;
        assert_relative_eq!(
            cagr(&series, PeriodConvention::Calendar).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn max_drawdown_is_peak_to_trough() {
        let series = daily(&[100.0, 110.0, 90.0, 95.0, 120.0]);
        assert_relative_eq!(max_drawdown(&series).unwrap(), -20.0 / 110.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_stdev_sharpe_is_undefined_not_zero() {
        let series = daily(&[5.0; 10]);
        assert_eq!(sharpe(&series, PeriodConvention::Fixed(252.0), 0.0), None);
        assert_eq!(volatility(&series, PeriodConvention::Fixed(252.0)), Some(0.0));
    }

    #[test]
    fn sharpe_and_volatility_match_hand_computation() {
        let series = daily(&[100.0, 101.0, 99.0, 102.0]);
        let returns = [0.01, 99.0 / 101.0 - 1.0, 102.0 / 99.0 - 1.0];
        let m = returns.iter().sum::<f64>() / 3.0;
        let var = returns.iter().map(|r| (r - m).powi(2)).sum::<f64>() / 2.0;
        let std = var.sqrt();

        let vol = volatility(&series, PeriodConvention::Fixed(252.0)).unwrap();
        assert_relative_eq!(vol, std * 252.0_f64.sqrt(), epsilon = 1e-12);

        let rf = 0.0252;
        let s = sharpe(&series, PeriodConvention::Fixed(252.0), rf).unwrap();
        assert_relative_eq!(s, (m - rf / 252.0) / std * 252.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn calmar_is_undefined_without_drawdown() {
        let series = daily(&[1.0, 2.0, 3.0]);
        assert_eq!(calmar(&series, PeriodConvention::Fixed(252.0)), None);
    }

    #[test]
    fn calmar_divides_cagr_by_absolute_drawdown() {
        let series = dated(&[
            (d(2020, 1, 1), 100.0),
            (d(2021, 1, 1), 50.0),
            (d(2022, 1, 1), 121.0),
        ]);
        let c = cagr(&series, PeriodConvention::Fixed(1.0)).unwrap();
        assert_relative_eq!(c, 0.1, epsilon = 1e-12);
        assert_relative_eq!(
            calmar(&series, PeriodConvention::Fixed(1.0)).unwrap(),
            0.1 / 0.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn lookback_anchors_on_last_observation_before_window_start() {
        let series = dated(&[
            (d(2024, 1, 1), 100.0),
            (d(2024, 1, 20), 105.0),
            (d(2024, 2, 10), 110.0),
            (d(2024, 3, 1), 121.0),
        ]);
        // 2024-03-01 minus 30 days is 2024-01-31; the last point before it is 2024-01-20.
        assert_relative_eq!(
            lookback_return(&series, Lookback::OneMonth).unwrap(),
            121.0 / 105.0 - 1.0,
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case(Lookback::ThreeMonths)]
    #[case(Lookback::SixMonths)]
    #[case(Lookback::OneYear)]
    fn lookback_before_series_start_is_missing(#[case] window: Lookback) {
        let series = daily(&[1.0, 1.1, 1.2, 1.3]);
        assert_eq!(lookback_return(&series, window), None);
    }

    #[test]
    fn ytd_uses_prior_year_close() {
        let series = dated(&[
            (d(2023, 12, 28), 80.0),
            (d(2023, 12, 29), 100.0),
            (d(2024, 6, 30), 110.0),
        ]);
        assert_relative_eq!(ytd_return(&series).unwrap(), 0.1, epsilon = 1e-12);

        let young = dated(&[(d(2024, 1, 2), 10.0), (d(2024, 3, 1), 11.0)]);
        assert_eq!(ytd_return(&young), None);
    }

    #[test]
    fn single_point_series_degrades_to_missing_values() {
        let series = daily(&[42.0]);
        assert_eq!(cagr(&series, PeriodConvention::Calendar), None);
        assert_eq!(volatility(&series, PeriodConvention::Fixed(252.0)), None);
        assert_eq!(sharpe(&series, PeriodConvention::Fixed(252.0), 0.0), None);
        assert_eq!(total_return(&series), None);
        assert_eq!(max_drawdown(&series), Some(0.0));
        assert_eq!(infer_periods_per_year(&series), None);
    }

    #[test]
    fn annual_returns_chain_year_end_closes() {
        let series = dated(&[
            (d(2021, 3, 1), 100.0),
            (d(2021, 12, 31), 110.0),
            (d(2022, 6, 30), 90.0),
            (d(2022, 12, 30), 99.0),
            (d(2023, 12, 29), 118.8),
        ]);
        let yearly = annual_returns(&series);

        assert_eq!(yearly.keys().copied().collect::<Vec<_>>(), vec![2021, 2022, 2023]);
        assert_relative_eq!(yearly[&2021], 0.1, epsilon = 1e-12);
        assert_relative_eq!(yearly[&2022], -0.1, epsilon = 1e-12);
        assert_relative_eq!(yearly[&2023], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn lone_first_year_observation_has_no_annual_return() {
        let series = dated(&[(d(2021, 12, 31), 100.0), (d(2022, 12, 30), 105.0)]);
        let yearly = annual_returns(&series);
        assert!(!yearly.contains_key(&2021));
        assert_relative_eq!(yearly[&2022], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn year_after_a_gap_is_not_chained_to_an_older_close() {
        let series = dated(&[
            (d(2020, 12, 31), 100.0),
            (d(2021, 12, 31), 99.0),
            // no 2022 data
            (d(2023, 12, 29), 102.0),
            (d(2024, 1, 31), 100.0),
            (d(2024, 12, 31), 104.0),
            (d(2025, 12, 31), 106.08),
        ]);
        let yearly = annual_returns(&series);

        assert_eq!(yearly.keys().copied().collect::<Vec<_>>(), vec![2021, 2024, 2025]);
        assert_relative_eq!(yearly[&2021], -0.01, epsilon = 1e-12);
        assert_relative_eq!(yearly[&2024], 104.0 / 102.0 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(yearly[&2025], 0.02, epsilon = 1e-12);
    }

    #[test]
    fn year_after_a_gap_with_two_points_is_a_partial_year() {
        let series = dated(&[
            (d(2020, 12, 31), 100.0),
            (d(2022, 3, 31), 80.0),
            (d(2022, 12, 30), 88.0),
        ]);
        let yearly = annual_returns(&series);

        assert!(!yearly.contains_key(&2020));
        assert_relative_eq!(yearly[&2022], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn inferred_periods_per_year_counts_observations_per_calendar_year() {
        let series = dated(&[
            (d(2020, 1, 1), 1.0),
            (d(2020, 7, 1), 1.0),
            (d(2021, 1, 1), 1.0),
        ]);
        let years = 366.0 / 365.25;
        assert_relative_eq!(span_years(&series).unwrap(), years, epsilon = 1e-12);
        assert_relative_eq!(infer_periods_per_year(&series).unwrap(), 3.0 / years, epsilon = 1e-12);
    }
}
