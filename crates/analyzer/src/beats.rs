use crate::yearly::YearlyComparisonTable;
use storage::{Cell, Tabular};

/// How often one fund beat one benchmark, counted in calendar years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatEntry {
    pub fund: String,
    pub benchmark: String,
    /// Years in which the fund's return was strictly greater.
    pub beats: usize,
    /// Years in which both the fund and the benchmark have a return.
    pub years: usize,
}

impl BeatEntry {
    /// `"beats/years"`, e.g. `"3/5"`.
    pub fn beat_ratio(&self) -> String {
        format!("{}/{}", self.beats, self.years)
    }

    /// Percentage of overlapping years won, e.g. `60.0`.
    ///
    /// `None` when fund and benchmark share no year: there is no data to
    /// judge, which is different from never winning.
    pub fn beat_pct(&self) -> Option<f64> {
        (self.years > 0).then(|| self.beats as f64 * 100.0 / self.years as f64)
    }
}

/// Beat counts for every fund against every benchmark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatSummary {
    pub entries: Vec<BeatEntry>,
}

impl BeatSummary {
    pub fn get(&self, fund: &str, benchmark: &str) -> Option<&BeatEntry> {
        self.entries
            .iter()
            .find(|e| e.fund == fund && e.benchmark.eq_ignore_ascii_case(benchmark))
    }

    /// The benchmark name as it appears in the summary, matched case-insensitively.
    pub fn benchmark_name(&self, benchmark: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.benchmark.eq_ignore_ascii_case(benchmark))
            .map(|e| e.benchmark.as_str())
    }
}

/// Counts, for every fund/benchmark pair, the years the fund came out ahead.
///
/// A year where the benchmark has no return is left out of both the count and
/// the denominator; it never fails the computation.
pub fn beat_summary_multi(table: &YearlyComparisonTable) -> BeatSummary {
    let mut entries = Vec::new();

    for fund in table.funds() {
        for (idx, benchmark) in table.benchmarks.iter().enumerate() {
            let mut entry = BeatEntry {
                fund: fund.to_string(),
                benchmark: benchmark.clone(),
                beats: 0,
                years: 0,
            };

            for row in table.rows_for(fund) {
                if let Some(bench_return) = row.benchmark_returns.get(idx).copied().flatten() {
                    entry.years += 1;
                    if row.fund_return > bench_return {
                        entry.beats += 1;
                    }
                }
            }

            if entry.years == 0 {
                tracing::warn!(fund = %fund, benchmark = %benchmark, "No overlapping years");
            }
            entries.push(entry);
        }
    }

    BeatSummary { entries }
}

impl Tabular for BeatSummary {
    fn headers(&self) -> Vec<String> {
        ["fund", "benchmark", "beats", "years", "beat_ratio", "beat_pct"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.entries
            .iter()
            .map(|e| {
                vec![
                    Cell::from(e.fund.as_str()),
                    Cell::from(e.benchmark.as_str()),
                    Cell::Integer(e.beats as i64),
                    Cell::Integer(e.years as i64),
                    Cell::Text(e.beat_ratio()),
                    Cell::Number(e.beat_pct()),
                ]
            })
            .collect()
    }
}
