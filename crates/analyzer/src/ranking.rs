use crate::beats::BeatSummary;
use crate::compare::MetricsTable;
use crate::error::AnalyzerError;
use analytics::Metric;
use configuration::Normalization;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use storage::{Cell, Tabular};

const BEAT_PREFIX: &str = "beat_pct:";

/// A column that can carry a ranking weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankField {
    Metric(Metric),
    /// Percentage of years the fund beat the named benchmark.
    BeatPct(String),
}

impl RankField {
    /// Resolves a weight key against the available metrics and benchmarks.
    fn parse(key: &str, beats: &BeatSummary) -> Result<Self, AnalyzerError> {
        let key = key.trim();
        let prefix = key.get(..BEAT_PREFIX.len());
        if prefix.is_some_and(|p| p.eq_ignore_ascii_case(BEAT_PREFIX)) {
            let benchmark = &key[BEAT_PREFIX.len()..];
            return beats
                .benchmark_name(benchmark)
                .map(|name| RankField::BeatPct(name.to_string()))
                .ok_or_else(|| AnalyzerError::UnknownBenchmark(benchmark.to_string()));
        }
        key.parse::<Metric>()
            .map(RankField::Metric)
            .map_err(AnalyzerError::UnknownMetric)
    }

    fn value(&self, fund: &str, metrics: &MetricsTable, beats: &BeatSummary) -> Option<f64> {
        match self {
            RankField::Metric(m) => metrics.get(fund).and_then(|row| row.get(*m)),
            RankField::BeatPct(b) => beats.get(fund, b).and_then(|e| e.beat_pct()),
        }
    }
}

impl fmt::Display for RankField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankField::Metric(m) => write!(f, "{m}"),
            RankField::BeatPct(b) => write!(f, "{BEAT_PREFIX}{b}"),
        }
    }
}

/// One fund's place in the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFund {
    /// 1-based.
    pub rank: usize,
    pub fund: String,
    pub score: f64,
    /// Weighted, normalized value per field, aligned with `RankingTable::fields`.
    pub contributions: Vec<f64>,
}

/// Funds ordered by composite score, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingTable {
    pub fields: Vec<(RankField, f64)>,
    pub entries: Vec<RankedFund>,
}

impl RankingTable {
    pub fn get(&self, fund: &str) -> Option<&RankedFund> {
        self.entries.iter().find(|e| e.fund == fund)
    }
}

/// Scores every fund in `metrics` by a weighted sum of normalized columns.
///
/// Each weighted column is normalized across funds first. A fund without a
/// value for a column contributes 0.0 for it. Ties are broken by fund
/// identifier so the order is deterministic.
pub fn rank_funds_multi(
    metrics: &MetricsTable,
    beats: &BeatSummary,
    weights: &BTreeMap<String, f64>,
    normalization: Normalization,
) -> Result<RankingTable, AnalyzerError> {
    // 1. Resolve weight keys
    let fields = weights
        .iter()
        .map(|(key, weight)| {
            if !weight.is_finite() {
                return Err(AnalyzerError::InvalidWeight(key.clone(), *weight));
            }
            Ok((RankField::parse(key, beats)?, *weight))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // 2. Normalize each column across funds
    let columns: Vec<Vec<Option<f64>>> = fields
        .iter()
        .map(|(field, _)| {
            let raw: Vec<Option<f64>> = metrics
                .rows
                .iter()
                .map(|row| field.value(&row.fund, metrics, beats))
                .collect();
            normalize_column(&raw, normalization)
        })
        .collect();

    // 3. Score
    let mut entries: Vec<RankedFund> = metrics
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let contributions: Vec<f64> = fields
                .iter()
                .zip(&columns)
                .map(|((_, weight), column)| weight * column[i].unwrap_or(0.0))
                .collect();
            RankedFund {
                rank: 0,
                fund: row.fund.clone(),
                score: contributions.iter().sum(),
                contributions,
            }
        })
        .collect();

    // 4. Rank
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.fund.cmp(&b.fund))
    });
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    if let Some(top) = entries.first() {
        tracing::info!(funds = entries.len(), leader = %top.fund, score = top.score, "Ranked funds");
    }

    Ok(RankingTable { fields, entries })
}

/// Normalizes the present values of a column; missing values stay missing.
fn normalize_column(values: &[Option<f64>], method: Normalization) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return vec![None; values.len()];
    }

    match method {
        Normalization::MinMax => {
            let (min, max) = find_min_max(&present);
            values.iter().map(|v| v.map(|v| normalize(v, min, max))).collect()
        }
        Normalization::ZScore => {
            let n = present.len() as f64;
            let mean = present.iter().sum::<f64>() / n;
            let std = (present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
            values
                .iter()
                .map(|v| v.map(|v| if std > 0.0 { (v - mean) / std } else { 0.0 }))
                .collect()
        }
    }
}

fn find_min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        })
}

/// Normalizes a value to a 0.0-1.0 scale.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if min == max {
        return 1.0; // Every fund is equal on this column
    }
    (value - min) / (max - min)
}

impl Tabular for RankingTable {
    fn headers(&self) -> Vec<String> {
        let mut headers = vec!["rank".to_string(), "fund".to_string(), "score".to_string()];
        headers.extend(self.fields.iter().map(|(f, w)| format!("{f} (w={w})")));
        headers
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.entries
            .iter()
            .map(|e| {
                let mut cells = vec![
                    Cell::Integer(e.rank as i64),
                    Cell::from(e.fund.as_str()),
                    Cell::Number(Some(e.score)),
                ];
                cells.extend(e.contributions.iter().map(|c| Cell::Number(Some(*c))));
                cells
            })
            .collect()
    }
}
