//! # FundScope Charts
//!
//! Renders ranking and yearly tables as standalone SVG documents. The
//! functions only lay out what they are given; every number comes from the
//! `analyzer` tables.

use std::path::Path;

mod bar;
pub mod error;
mod heatmap;
mod svg;

pub use bar::bar_rank;
pub use error::ChartError;
pub use heatmap::{HeatmapValue, plot_yearly_heatmap};

/// Writes a rendered chart to `path`, creating the parent directory if needed.
pub fn save_svg(path: &Path, document: &str) -> Result<(), ChartError> {
    let io_err = |source| ChartError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, document).map_err(io_err)?;
    tracing::info!(file = %path.display(), "Chart written");
    Ok(())
}
