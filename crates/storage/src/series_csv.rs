use crate::error::StorageError;
use chrono::NaiveDate;
use core_types::{PricePoint, PriceSeries};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// Date columns, in order of preference.
pub const DATE_COLUMNS: &[&str] = &["date", "time", "tradingDate"];

/// Value columns, in order of preference: fund NAV first, then index close.
pub const VALUE_COLUMNS: &[&str] = &["nav_per_unit", "close", "value"];

const NAME_COLUMN: &str = "short_name";

/// Loads one price series from a CSV file.
///
/// The identifier is taken from the first non-empty `short_name` cell, or else
/// from the upper-cased file stem. Rows with an empty value cell are skipped;
/// anything else that does not parse is an error naming the line.
pub fn read_series_csv(path: &Path) -> Result<PriceSeries, StorageError> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let headers = reader.headers()?.clone();

    let find = |candidates: &[&str]| {
        candidates
            .iter()
            .find_map(|name| headers.iter().position(|h| h == *name))
    };
    let date_idx = find(DATE_COLUMNS).ok_or_else(|| StorageError::MissingColumn {
        path: path.to_path_buf(),
        kind: "date",
        expected: DATE_COLUMNS.join(", "),
    })?;
    let value_idx = find(VALUE_COLUMNS).ok_or_else(|| StorageError::MissingColumn {
        path: path.to_path_buf(),
        kind: "value",
        expected: VALUE_COLUMNS.join(", "),
    })?;
    let name_idx = headers.iter().position(|h| h == NAME_COLUMN);

    let mut name: Option<String> = None;
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let invalid = |reason: String| StorageError::InvalidRow {
            path: path.to_path_buf(),
            line,
            reason,
        };

        if name.is_none() {
            name = name_idx
                .and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string);
        }

        let raw_value = record.get(value_idx).unwrap_or_default();
        if raw_value.is_empty() {
            skipped += 1;
            continue;
        }

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| invalid(format!("bad date '{raw_date}'")))?;
        let value = parse_decimal(raw_value)
            .ok_or_else(|| invalid(format!("bad value '{raw_value}'")))?;

        points.push(PricePoint::new(date, value));
    }

    if skipped > 0 {
        tracing::warn!(file = %path.display(), skipped, "Skipped rows with an empty value");
    }

    let id = name.unwrap_or_else(|| stem_id(path));
    Ok(PriceSeries::new(id, points)?)
}

/// Writes a series as `date,<value_column>,short_name`, readable by [`read_series_csv`].
pub fn write_series_csv(
    path: &Path,
    series: &PriceSeries,
    value_column: &str,
) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", value_column, NAME_COLUMN])?;
    for point in series.points() {
        writer.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            point.value.normalize().to_string(),
            series.id().to_string(),
        ])?;
    }
    writer.flush().map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// The upper-cased file stem, used as identifier when the file names none.
fn stem_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

/// Parses `YYYY-MM-DD`, ignoring any time component that follows.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
