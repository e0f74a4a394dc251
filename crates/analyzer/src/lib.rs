//! # FundScope Analyzer
//!
//! Turns loaded fund and benchmark series into the four result tables:
//! per-fund metrics, year-by-year comparison, beat counts and the weighted
//! ranking. Everything here is pure computation over in-memory series except
//! the `Analyzer` loaders, which read CSV snapshots through `storage`.

use analytics::{AnalyticsEngine, PeriodConvention};
use configuration::{Config, Normalization};
use core_types::PriceSeries;
use std::collections::BTreeMap;
use std::path::Path;
use storage::SeriesStore;

pub mod beats;
pub mod compare;
pub mod error;
pub mod ranking;
pub mod yearly;

pub use beats::{BeatEntry, BeatSummary, beat_summary_multi};
pub use compare::{MetricsTable, compare_funds, compare_series};
pub use error::AnalyzerError;
pub use ranking::{RankField, RankedFund, RankingTable, rank_funds_multi};
pub use yearly::{YearlyComparisonTable, YearlyRow, yearly_comparison_multi_index};

/// Every table produced for one fund directory and set of benchmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub metrics: MetricsTable,
    pub yearly: YearlyComparisonTable,
    pub beats: BeatSummary,
    pub ranking: RankingTable,
}

/// The main analysis pipeline, configured once and run per fund directory.
#[derive(Debug, Clone)]
pub struct Analyzer {
    engine: AnalyticsEngine,
    benchmarks: SeriesStore,
    weights: BTreeMap<String, f64>,
    normalization: Normalization,
}

impl Analyzer {
    pub fn new(
        engine: AnalyticsEngine,
        benchmark_dir: impl AsRef<Path>,
        weights: BTreeMap<String, f64>,
        normalization: Normalization,
    ) -> Self {
        Self {
            engine,
            benchmarks: SeriesStore::new(benchmark_dir.as_ref()),
            weights,
            normalization,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AnalyzerError> {
        let convention = match config.metrics.periods_per_year {
            Some(p) => PeriodConvention::Fixed(p),
            None => PeriodConvention::Calendar,
        };
        let engine = AnalyticsEngine::new(convention, config.metrics.risk_free_rate)?;

        Ok(Self::new(
            engine,
            &config.data.benchmark_dir,
            config.ranking.weights.clone(),
            config.ranking.normalization,
        ))
    }

    /// Overrides the configured normalization method.
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn engine(&self) -> &AnalyticsEngine {
        &self.engine
    }

    /// Loads every fund CSV in `dir`, ordered by identifier.
    pub fn load_funds(&self, dir: &Path) -> Result<Vec<PriceSeries>, AnalyzerError> {
        let funds = SeriesStore::new(dir).load_all()?;
        tracing::info!(dir = %dir.display(), funds = funds.len(), "Loaded fund series");
        Ok(funds)
    }

    /// Loads `<benchmark_dir>/<SYMBOL>.csv` for each symbol, in order.
    pub fn load_benchmarks(&self, symbols: &[String]) -> Result<Vec<PriceSeries>, AnalyzerError> {
        Ok(self.benchmarks.load_many(symbols)?)
    }

    pub fn compare(&self, funds: &[PriceSeries]) -> MetricsTable {
        compare_series(funds, &self.engine)
    }

    /// Ranks funds by the configured weights.
    pub fn rank(&self, metrics: &MetricsTable, beats: &BeatSummary) -> Result<RankingTable, AnalyzerError> {
        rank_funds_multi(metrics, beats, &self.weights, self.normalization)
    }

    /// Runs the whole pipeline over the funds in `fund_dir`.
    pub fn run(&self, fund_dir: &Path, symbols: &[String]) -> Result<AnalysisReport, AnalyzerError> {
        // 1. Load
        let funds = self.load_funds(fund_dir)?;
        let benchmarks = self.load_benchmarks(symbols)?;

        // 2. Compute
        let metrics = self.compare(&funds);
        let yearly = yearly_comparison_multi_index(&funds, &benchmarks);
        let beats = beat_summary_multi(&yearly);

        // 3. Rank
        let ranking = self.rank(&metrics, &beats)?;

        Ok(AnalysisReport {
            metrics,
            yearly,
            beats,
            ranking,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::yearly_series;
    use storage::write_series_csv;
    use tempfile::TempDir;

    fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn run_produces_every_table() {
        let funds_dir = TempDir::new().unwrap();
        let bench_dir = TempDir::new().unwrap();
        let steady = yearly_series("STEADY", 2019, &[100.0, 108.0, 116.64, 125.9712]);
        let choppy = yearly_series("CHOPPY", 2019, &[100.0, 130.0, 91.0, 100.1]);
        let index = yearly_series("VNINDEX", 2019, &[1000.0, 1050.0, 1102.5, 1157.625]);
        write_series_csv(&funds_dir.path().join("STEADY.csv"), &steady, "nav_per_unit").unwrap();
        write_series_csv(&funds_dir.path().join("CHOPPY.csv"), &choppy, "nav_per_unit").unwrap();
        write_series_csv(&bench_dir.path().join("VNINDEX.csv"), &index, "close").unwrap();

        let analyzer = Analyzer::new(
            AnalyticsEngine::new(PeriodConvention::Fixed(1.0), 0.0).unwrap(),
            bench_dir.path(),
            weights(&[("cagr", 0.5), ("beat_pct:VNINDEX", 0.5)]),
            Normalization::MinMax,
        );

        let report = analyzer
            .run(funds_dir.path(), &["VNINDEX".to_string()])
            .unwrap();

        assert_eq!(report.metrics.rows.len(), 2);
        assert_eq!(report.yearly.years(), vec![2020, 2021, 2022]);
        // STEADY (+8% a year) beats the +5% index every year.
        assert_eq!(report.beats.get("STEADY", "VNINDEX").unwrap().beat_ratio(), "3/3");
        assert_eq!(report.ranking.entries[0].fund, "STEADY");
    }

    #[test]
    fn missing_benchmark_is_an_error() {
        let funds_dir = TempDir::new().unwrap();
        let bench_dir = TempDir::new().unwrap();
        let analyzer = Analyzer::new(
            AnalyticsEngine::default(),
            bench_dir.path(),
            weights(&[("cagr", 1.0)]),
            Normalization::MinMax,
        );

        let err = analyzer
            .run(funds_dir.path(), &["VN30".to_string()])
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Storage(_)));
    }

    #[test]
    fn from_config_maps_periods_per_year() {
        let mut config = Config::default();
        config.metrics.periods_per_year = Some(252.0);
        let analyzer = Analyzer::from_config(&config)
            .unwrap()
            .with_normalization(Normalization::ZScore);

        assert_eq!(analyzer.engine().convention(), PeriodConvention::Fixed(252.0));
        assert_eq!(analyzer.normalization, Normalization::ZScore);
    }
}
