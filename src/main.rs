use analyzer::{Analyzer, beat_summary_multi, yearly_comparison_multi_index};
use anyhow::{Context, bail};
use api_client::{FundDataClient, ProviderClient, download_category};
use charts::{HeatmapValue, bar_rank, plot_yearly_heatmap, save_svg};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use configuration::{Config, Normalization, init_tracing, load_config};
use core_types::FundCategory;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::{Cell, SeriesStore, Tabular, write_table_csv};

/// The main entry point for the FundScope application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging).context("Failed to initialise logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Fetch => handle_fetch(&config).await,
        Commands::FetchIndex(args) => handle_fetch_index(args, &config).await,
        Commands::Compare(args) => handle_compare(args, &config),
        Commands::Yearly(args) => handle_yearly(args, &config),
        Commands::Beats(args) => handle_beats(args, &config),
        Commands::Rank(args) => handle_rank(args, &config),
        Commands::Heatmap(args) => handle_heatmap(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance analytics for Vietnamese open-ended mutual funds.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (default: ./fundscope.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the NAV history of every bond, balanced and stock fund.
    Fetch,
    /// Download the daily closes of an index or stock.
    FetchIndex(FetchIndexArgs),
    /// Print the metrics of every fund in a directory.
    Compare(CompareArgs),
    /// Print calendar-year returns next to benchmark returns.
    Yearly(BenchmarkArgs),
    /// Print how often each fund beat each benchmark.
    Beats(BenchmarkArgs),
    /// Rank funds by the configured metric weights.
    Rank(RankArgs),
    /// Render the yearly returns as an SVG heatmap.
    Heatmap(HeatmapArgs),
}

#[derive(Args)]
struct FetchIndexArgs {
    /// The symbol to download (e.g., "VNINDEX", "VN30", "FPT").
    #[arg(long)]
    symbol: String,

    /// The start date (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// The end date (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,

    /// Output directory (default: the configured benchmark directory).
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Args)]
struct CompareArgs {
    /// Directory of fund CSV files.
    #[arg(long)]
    dir: PathBuf,

    /// Also write the table to this CSV file.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct BenchmarkArgs {
    /// Directory of fund CSV files.
    #[arg(long)]
    dir: PathBuf,

    /// Benchmark symbols, loaded from the benchmark directory.
    #[arg(long = "benchmark", required = true, num_args = 1..)]
    benchmarks: Vec<String>,

    /// Also write the table to this CSV file.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct RankArgs {
    /// Directory of fund CSV files.
    #[arg(long)]
    dir: PathBuf,

    /// Benchmarks available to `beat_pct:<SYMBOL>` weights.
    #[arg(long = "benchmark", num_args = 1..)]
    benchmarks: Vec<String>,

    /// Overrides the configured normalization.
    #[arg(long, value_enum)]
    normalization: Option<Normalization>,

    /// Also write the ranking to this CSV file.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Render the scores as an SVG bar chart.
    #[arg(long)]
    chart: Option<PathBuf>,
}

#[derive(Args)]
struct HeatmapArgs {
    /// Directory of fund CSV files.
    #[arg(long)]
    dir: PathBuf,

    /// Benchmark symbols, loaded from the benchmark directory.
    #[arg(long = "benchmark", required = true, num_args = 1..)]
    benchmarks: Vec<String>,

    /// The SVG file to write.
    #[arg(long)]
    out: PathBuf,

    /// Show returns in excess of this benchmark instead of raw returns.
    #[arg(long)]
    excess: Option<String>,
}

// ==============================================================================
// Download Commands
// ==============================================================================

async fn handle_fetch(config: &Config) -> anyhow::Result<()> {
    let client = ProviderClient::new(&config.fetch).context("Failed to build HTTP client")?;
    let pause = Duration::from_secs(config.fetch.chunk_pause_secs);

    for category in FundCategory::ALL {
        let store = SeriesStore::new(config.data.data_dir.join(category.dir_name()));
        tracing::info!(category = %category, dir = %store.dir().display(), "Downloading funds");

        let summary = download_category(&client, &store, category, config.fetch.chunk_size, pause)
            .await
            .with_context(|| format!("Failed to list {category} funds"))?;

        println!("{category}: saved {}, skipped {}", summary.saved.len(), summary.failed.len());
        if !summary.failed.is_empty() {
            let skipped = summary.skipped_ids();
            tracing::warn!(category = %category, ?skipped, "Some funds were not downloaded");
        }
    }
    Ok(())
}

async fn handle_fetch_index(args: FetchIndexArgs, config: &Config) -> anyhow::Result<()> {
    if args.from > args.to {
        bail!("--from ({}) must not be after --to ({})", args.from, args.to);
    }
    let client = ProviderClient::new(&config.fetch).context("Failed to build HTTP client")?;
    let series = client
        .fetch_index_history(&args.symbol, args.from, args.to)
        .await
        .with_context(|| format!("Failed to download {}", args.symbol))?;

    tracing::info!(symbol = %args.symbol, rows = series.len(), "Downloaded index history");

    let dir = args.dir.unwrap_or_else(|| config.data.benchmark_dir.clone());
    let path = SeriesStore::new(dir)
        .save(&series, "close")
        .context("Failed to save index history")?;
    println!("Saved {} rows of {} to {}", series.len(), series.id(), path.display());
    Ok(())
}

// ==============================================================================
// Analysis Commands
// ==============================================================================

fn handle_compare(args: CompareArgs, config: &Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(config)?;
    let funds = analyzer.load_funds(&args.dir).context("Failed to load funds")?;
    let metrics = analyzer.compare(&funds);
    let empty = metrics.rows.iter().filter(|r| r.observations == 0).count();
    if empty > 0 {
        tracing::warn!(funds = empty, dir = %args.dir.display(), "Funds without observations");
    }

    print_table("Fund metrics", &metrics);
    export(args.out.as_deref(), &metrics)
}

fn handle_yearly(args: BenchmarkArgs, config: &Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(config)?;
    let funds = analyzer.load_funds(&args.dir).context("Failed to load funds")?;
    let benchmarks = analyzer
        .load_benchmarks(&args.benchmarks)
        .context("Failed to load benchmarks")?;
    let yearly = yearly_comparison_multi_index(&funds, &benchmarks);

    print_table("Calendar-year returns", &yearly);
    export(args.out.as_deref(), &yearly)
}

fn handle_beats(args: BenchmarkArgs, config: &Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(config)?;
    let funds = analyzer.load_funds(&args.dir).context("Failed to load funds")?;
    let benchmarks = analyzer
        .load_benchmarks(&args.benchmarks)
        .context("Failed to load benchmarks")?;
    let beats = beat_summary_multi(&yearly_comparison_multi_index(&funds, &benchmarks));

    print_table("Years beating the benchmark", &beats);
    export(args.out.as_deref(), &beats)
}

fn handle_rank(args: RankArgs, config: &Config) -> anyhow::Result<()> {
    let mut analyzer = Analyzer::from_config(config)?;
    if let Some(normalization) = args.normalization {
        analyzer = analyzer.with_normalization(normalization);
    }

    let report = analyzer
        .run(&args.dir, &args.benchmarks)
        .context("Failed to rank funds")?;
    tracing::info!(
        funds = report.ranking.entries.len(),
        benchmarks = args.benchmarks.len(),
        "Ranking complete"
    );

    print_table("Fund ranking", &report.ranking);
    export(args.out.as_deref(), &report.ranking)?;

    if let Some(path) = args.chart {
        save_svg(&path, &bar_rank(&report.ranking, "Composite fund score"))?;
        println!("Chart written to {}", path.display());
    }
    Ok(())
}

fn handle_heatmap(args: HeatmapArgs, config: &Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(config)?;
    let funds = analyzer.load_funds(&args.dir).context("Failed to load funds")?;
    let benchmarks = analyzer
        .load_benchmarks(&args.benchmarks)
        .context("Failed to load benchmarks")?;
    let yearly = yearly_comparison_multi_index(&funds, &benchmarks);

    let (value, title) = match args.excess {
        Some(symbol) => {
            let title = format!("Excess return over {symbol} (%)");
            (HeatmapValue::ExcessOver(symbol), title)
        }
        None => (HeatmapValue::FundReturn, "Calendar-year returns (%)".to_string()),
    };
    let document = plot_yearly_heatmap(&yearly, &value, &title)?;
    save_svg(&args.out, &document)?;
    println!("Heatmap written to {}", args.out.display());
    Ok(())
}

// ==============================================================================
// Output Helpers
// ==============================================================================

fn print_table(title: &str, data: &impl Tabular) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(data.headers());

    for row in data.rows() {
        table.add_row(row.iter().map(|cell| {
            let alignment = match cell {
                Cell::Text(_) => CellAlignment::Left,
                _ => CellAlignment::Right,
            };
            comfy_table::Cell::new(cell).set_alignment(alignment)
        }));
    }

    println!("{title}");
    println!("{table}");
}

fn export(out: Option<&Path>, data: &impl Tabular) -> anyhow::Result<()> {
    if let Some(path) = out {
        write_table_csv(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(file = %path.display(), "Table exported");
        println!("Table written to {}", path.display());
    }
    Ok(())
}
