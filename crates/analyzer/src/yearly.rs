use analytics::metrics::annual_returns;
use core_types::PriceSeries;
use std::collections::BTreeMap;
use storage::{Cell, Tabular};

/// One fund's return for one calendar year, next to every benchmark's return
/// for the same year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyRow {
    pub fund: String,
    pub year: i32,
    pub fund_return: f64,
    /// Aligned with `YearlyComparisonTable::benchmarks`. `None` where the
    /// benchmark has no data for the year.
    pub benchmark_returns: Vec<Option<f64>>,
}

/// Fund and benchmark annual returns aligned by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyComparisonTable {
    /// Every input fund in input order, including funds without a yearly row.
    pub funds: Vec<String>,
    pub benchmarks: Vec<String>,
    /// Ordered by fund (in input order), then year.
    pub rows: Vec<YearlyRow>,
}

impl YearlyComparisonTable {
    /// Position of a benchmark column, matched case-insensitively.
    pub fn benchmark_index(&self, name: &str) -> Option<usize> {
        self.benchmarks
            .iter()
            .position(|b| b.eq_ignore_ascii_case(name))
    }

    pub fn rows_for<'a>(&'a self, fund: &'a str) -> impl Iterator<Item = &'a YearlyRow> + 'a {
        self.rows.iter().filter(move |r| r.fund == fund)
    }

    /// Fund identifiers in input order, without repeats.
    pub fn funds(&self) -> Vec<&str> {
        let mut funds: Vec<&str> = Vec::with_capacity(self.funds.len());
        for fund in &self.funds {
            if !funds.contains(&fund.as_str()) {
                funds.push(fund);
            }
        }
        funds
    }

    /// Distinct years across all rows, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Resamples every fund and benchmark to one return per calendar year and
/// aligns them.
///
/// Rows are produced for every year in which the fund has a return. A
/// benchmark that lacks that year shows `None` instead of removing the row.
pub fn yearly_comparison_multi_index(
    funds: &[PriceSeries],
    benchmarks: &[PriceSeries],
) -> YearlyComparisonTable {
    let benchmark_years: Vec<BTreeMap<i32, f64>> = benchmarks.iter().map(annual_returns).collect();

    let rows: Vec<YearlyRow> = funds
        .iter()
        .flat_map(|fund| {
            let benchmark_years = &benchmark_years;
            annual_returns(fund)
                .into_iter()
                .map(move |(year, fund_return)| YearlyRow {
                    fund: fund.id().to_string(),
                    year,
                    fund_return,
                    benchmark_returns: benchmark_years
                        .iter()
                        .map(|by_year| by_year.get(&year).copied())
                        .collect(),
                })
        })
        .collect();

    tracing::info!(
        funds = funds.len(),
        benchmarks = benchmarks.len(),
        rows = rows.len(),
        "Built yearly comparison"
    );

    YearlyComparisonTable {
        funds: funds.iter().map(|f| f.id().to_string()).collect(),
        benchmarks: benchmarks.iter().map(|b| b.id().to_string()).collect(),
        rows,
    }
}

impl Tabular for YearlyComparisonTable {
    fn headers(&self) -> Vec<String> {
        let mut headers = vec!["fund".to_string(), "year".to_string(), "fund_return".to_string()];
        headers.extend(self.benchmarks.iter().cloned());
        headers
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    Cell::from(row.fund.as_str()),
                    Cell::Integer(row.year as i64),
                    Cell::Percent(Some(row.fund_return)),
                ];
                cells.extend(row.benchmark_returns.iter().map(|r| Cell::Percent(*r)));
                cells
            })
            .collect()
    }
}
