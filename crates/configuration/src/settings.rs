use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an absent `fundscope.toml` is not an error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub metrics: MetricsConfig,
    pub ranking: RankingConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

/// Where the CSV snapshots live on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root directory for fund CSVs. Category downloads go in sub-directories.
    pub data_dir: PathBuf,
    /// Directory holding one `<SYMBOL>.csv` per benchmark index.
    pub benchmark_dir: PathBuf,
}

/// Parameters for the metric functions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Annual risk-free rate as a fraction (0.03 is 3%).
    pub risk_free_rate: f64,
    /// Fixed observations per year (252 for trading days, 12 for monthly).
    /// When absent, it is inferred from the calendar span of each series.
    pub periods_per_year: Option<f64>,
}

/// How metric columns are brought onto a common scale before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Normalization {
    /// `(v - min) / (max - min)`, mapping each column onto 0.0-1.0.
    #[default]
    #[cfg_attr(feature = "clap", value(name = "minmax"))]
    MinMax,
    /// `(v - mean) / stdev`.
    #[cfg_attr(feature = "clap", value(name = "zscore"))]
    ZScore,
}

/// Configuration for the composite ranking of funds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub normalization: Normalization,
    /// Metric name to weight. Beat percentages are addressed as `beat_pct:<BENCHMARK>`.
    /// A negative weight penalises the metric.
    pub weights: BTreeMap<String, f64>,
}

/// Settings for the data-provider downloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base URL of the open-ended fund API.
    pub fund_base_url: String,
    /// Base URL of the index/stock quote API.
    pub quote_base_url: String,
    /// Number of funds downloaded before pausing.
    pub chunk_size: usize,
    /// Pause between chunks, to stay under the provider's rate limit.
    pub chunk_pause_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            benchmark_dir: PathBuf::from("data/index"),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            periods_per_year: None,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        let weights = [
            ("cagr", 0.3),
            ("sharpe", 0.3),
            ("calmar", 0.2),
            ("max_drawdown", 0.2),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            normalization: Normalization::MinMax,
            weights,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            fund_base_url: "https://api.fmarket.vn".to_string(),
            quote_base_url: "https://apipubaws.tcbs.com.vn".to_string(),
            chunk_size: 10,
            chunk_pause_secs: 300,
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
