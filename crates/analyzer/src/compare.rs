use crate::error::AnalyzerError;
use analytics::{AnalyticsEngine, Metric, MetricsRow};
use chrono::NaiveDate;
use core_types::PriceSeries;
use storage::{Cell, SeriesStore, Tabular};

/// One `MetricsRow` per fund, in the order the funds were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsTable {
    pub rows: Vec<MetricsRow>,
}

impl MetricsTable {
    pub fn get(&self, fund: &str) -> Option<&MetricsRow> {
        self.rows.iter().find(|r| r.fund == fund)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads each fund from `store` and computes its full metrics row.
///
/// A fund that cannot be read fails the whole comparison: a missing file is
/// an error the caller needs to see, not a row to silently drop.
pub fn compare_funds(
    store: &SeriesStore,
    fund_ids: &[String],
    engine: &AnalyticsEngine,
) -> Result<MetricsTable, AnalyzerError> {
    let series = store.load_many(fund_ids)?;
    Ok(compare_series(&series, engine))
}

/// Computes the metrics table for series already in memory.
///
/// Every input series gets a row, including empty ones.
pub fn compare_series(series: &[PriceSeries], engine: &AnalyticsEngine) -> MetricsTable {
    let rows: Vec<MetricsRow> = series.iter().map(|s| engine.calculate(s)).collect();

    tracing::info!(funds = rows.len(), "Computed fund metrics");
    MetricsTable { rows }
}

impl Tabular for MetricsTable {
    fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            "fund".to_string(),
            "start".to_string(),
            "end".to_string(),
            "observations".to_string(),
        ];
        headers.extend(Metric::ALL.iter().map(|m| m.as_str().to_string()));
        headers
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    Cell::from(row.fund.as_str()),
                    date_cell(row.start_date),
                    date_cell(row.end_date),
                    Cell::Integer(row.observations as i64),
                ];
                cells.extend(Metric::ALL.iter().map(|m| {
                    if m.is_percentage() {
                        Cell::Percent(row.get(*m))
                    } else {
                        Cell::Number(row.get(*m))
                    }
                }));
                cells
            })
            .collect()
    }
}

fn date_cell(date: Option<NaiveDate>) -> Cell {
    Cell::Text(date.map(|d| d.to_string()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::yearly_series;
    use analytics::PeriodConvention;
    use tempfile::TempDir;

    #[test]
    fn compares_in_memory_series_in_order() {
        let engine = AnalyticsEngine::new(PeriodConvention::Fixed(1.0), 0.0).unwrap();
        let funds = vec![
            yearly_series("GROW", 2020, &[100.0, 200.0]),
            yearly_series("FLAT", 2020, &[100.0, 100.0, 100.0]),
        ];

        let table = compare_series(&funds, &engine);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].fund, "GROW");
        assert_eq!(table.get("GROW").unwrap().cagr, Some(1.0));
        assert_eq!(table.get("FLAT").unwrap().cagr, Some(0.0));
        assert_eq!(table.get("FLAT").unwrap().max_drawdown, Some(0.0));
    }

    #[test]
    fn missing_fund_file_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let store = SeriesStore::new(dir.path());
        let err = compare_funds(&store, &["GHOST".to_string()], &AnalyticsEngine::default())
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Storage(storage::StorageError::NotFound(_))));
    }

    #[test]
    fn table_has_one_cell_per_header() {
        let engine = AnalyticsEngine::default();
        let table = compare_series(&[yearly_series("A", 2020, &[1.0, 1.1, 1.2])], &engine);
        assert_eq!(table.headers().len(), table.rows()[0].len());
    }

    #[test]
    fn empty_fund_keeps_its_row() {
        let engine = AnalyticsEngine::new(PeriodConvention::Fixed(1.0), 0.0).unwrap();
        let funds = vec![
            yearly_series("GOOD", 2020, &[100.0, 110.0, 121.0]),
            PriceSeries::new("NEWFUND", vec![]).unwrap(),
        ];

        let table = compare_series(&funds, &engine);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].fund, "NEWFUND");
        let empty = table.get("NEWFUND").unwrap();
        assert_eq!(empty.observations, 0);
        assert!(Metric::ALL.iter().all(|m| empty.get(*m).is_none()));
        assert!(table.get("GOOD").unwrap().total_return.is_some());

        let cells = table.rows();
        assert_eq!(cells[1][1], Cell::Text(String::new()));
        assert_eq!(cells[1].len(), table.headers().len());
    }
}
