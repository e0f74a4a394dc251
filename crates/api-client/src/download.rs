use crate::{FundDataClient, error::ApiError};
use core_types::FundCategory;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use storage::SeriesStore;

/// The outcome of one category download.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub saved: Vec<PathBuf>,
    /// Funds that were skipped, with the reason.
    pub failed: Vec<(String, String)>,
}

impl DownloadSummary {
    /// Identifiers of the skipped funds, in download order.
    pub fn skipped_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|(fund, _)| fund.as_str()).collect()
    }
}

/// Downloads the NAV history of every fund in `category` into `store`.
///
/// Funds are fetched one at a time in chunks of `chunk_size`, pausing for
/// `pause` between chunks. A fund that fails to download or save is logged
/// and skipped. Only a failure to list the category aborts the download.
pub async fn download_category(
    client: &dyn FundDataClient,
    store: &SeriesStore,
    category: FundCategory,
    chunk_size: usize,
    pause: Duration,
) -> Result<DownloadSummary, ApiError> {
    let funds = client.list_funds(category).await?;
    let mut summary = DownloadSummary::default();

    let progress_bar = ProgressBar::new(funds.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        progress_bar.set_style(style.progress_chars("#>-"));
    }

    let chunks: Vec<_> = funds.chunks(chunk_size.max(1)).collect();
    for (idx, chunk) in chunks.iter().enumerate() {
        if idx > 0 && !pause.is_zero() {
            progress_bar.set_message(format!("Waiting {}s before the next chunk", pause.as_secs()));
            tracing::info!(chunk = idx + 1, total = chunks.len(), "Pausing between chunks");
            tokio::time::sleep(pause).await;
        }

        for fund in chunk.iter() {
            progress_bar.set_message(format!("Fetching {}...", fund.short_name));
            let result = match client.fetch_nav_history(fund).await {
                Ok(series) => store.save(&series, "nav_per_unit").map_err(ApiError::from),
                Err(e) => Err(e),
            };

            match result {
                Ok(path) => summary.saved.push(path),
                Err(e) => {
                    tracing::warn!(fund = %fund.short_name, error = %e, "Skipping fund");
                    summary.failed.push((fund.short_name.clone(), e.to_string()));
                }
            }
            progress_bar.inc(1);
        }
    }

    progress_bar.finish_with_message(format!("{category} funds done"));
    tracing::info!(
        category = %category,
        saved = summary.saved.len(),
        failed = summary.failed.len(),
        dir = %store.dir().display(),
        "Category download complete"
    );
    Ok(summary)
}
