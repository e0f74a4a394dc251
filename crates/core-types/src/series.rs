use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A single dated observation: the NAV per unit of a fund, or the close of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self { date, value }
    }
}

/// The price history of one fund or index.
///
/// Points are sorted ascending by date, dates are unique and every value is
/// non-negative. The only way to obtain a `PriceSeries` is through
/// [`PriceSeries::new`], which enforces all three.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    id: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from unordered points.
    ///
    /// Points are sorted by date. When two points share a date, the one that
    /// appeared first in `points` is kept. A negative value is rejected.
    pub fn new(id: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self, CoreError> {
        let id = id.into();

        if let Some(bad) = points.iter().find(|p| p.value < Decimal::ZERO) {
            return Err(CoreError::InvalidInput(
                id,
                format!("negative value {} on {}", bad.value, bad.date),
            ));
        }

        // A stable sort keeps the first occurrence of a duplicated date in front.
        points.sort_by_key(|p| p.date);
        let before = points.len();
        points.dedup_by_key(|p| p.date);
        if points.len() != before {
            tracing::debug!(
                series = %id,
                dropped = before - points.len(),
                "Dropped duplicate dates"
            );
        }

        Ok(Self { id, points })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// The values as `f64`, the representation every metric is computed in.
    pub fn values_f64(&self) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| p.value.to_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// The last observation dated strictly before `date`, if any.
    pub fn last_before(&self, date: NaiveDate) -> Option<&PricePoint> {
        let idx = self.points.partition_point(|p| p.date < date);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    /// The last observation dated on or before `date`, if any.
    pub fn last_on_or_before(&self, date: NaiveDate) -> Option<&PricePoint> {
        let idx = self.points.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| &self.points[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn new_sorts_and_keeps_first_duplicate() {
        let series = PriceSeries::new(
            "ABC",
            vec![
                PricePoint::new(d(2024, 1, 3), dec!(12)),
                PricePoint::new(d(2024, 1, 1), dec!(10)),
                PricePoint::new(d(2024, 1, 3), dec!(99)),
                PricePoint::new(d(2024, 1, 2), dec!(11)),
            ],
        )
        .unwrap();

        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        assert_eq!(series.last().unwrap().value, dec!(12));
    }

    #[test]
    fn new_rejects_negative_values() {
        let err = PriceSeries::new("XYZ", vec![PricePoint::new(d(2024, 1, 1), dec!(-1))]);
        assert!(matches!(err, Err(CoreError::InvalidInput(id, _)) if id == "XYZ"));
    }

    #[test]
    fn zero_is_a_valid_value() {
        let series = PriceSeries::new("Z", vec![PricePoint::new(d(2024, 1, 1), dec!(0))]);
        assert!(series.is_ok());
    }

    #[test]
    fn lookup_before_and_on_or_before() {
        let series = PriceSeries::new(
            "ABC",
            vec![
                PricePoint::new(d(2024, 1, 1), dec!(10)),
                PricePoint::new(d(2024, 1, 5), dec!(11)),
            ],
        )
        .unwrap();

        assert_eq!(series.last_before(d(2024, 1, 5)).unwrap().value, dec!(10));
        assert_eq!(series.last_on_or_before(d(2024, 1, 5)).unwrap().value, dec!(11));
        assert!(series.last_before(d(2024, 1, 1)).is_none());
        assert!(series.last_on_or_before(d(2023, 12, 31)).is_none());
    }
}
