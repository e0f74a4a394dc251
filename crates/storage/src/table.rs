use crate::error::StorageError;
use std::fmt;
use std::path::Path;

/// One cell of a result table.
///
/// Numbers are kept raw so that CSV export loses no precision; `Display`
/// formats them for a terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    /// A plain number. `None` is a missing value.
    Number(Option<f64>),
    /// A fraction shown as a percentage (0.125 is 12.50%). `None` is a missing value.
    Percent(Option<f64>),
}

impl Cell {
    /// The CSV representation: raw numbers, empty for missing.
    pub fn to_csv_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(i) => i.to_string(),
            Cell::Number(v) | Cell::Percent(v) => v.map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Number(Some(v)) => write!(f, "{v:.2}"),
            Cell::Percent(Some(v)) => write!(f, "{:.2}%", v * 100.0),
            Cell::Number(None) | Cell::Percent(None) => f.write_str("n/a"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// Anything that can be laid out as a header row plus data rows.
pub trait Tabular {
    fn headers(&self) -> Vec<String>;
    fn rows(&self) -> Vec<Vec<Cell>>;
}

/// Exports a table as CSV, creating the parent directory if needed.
pub fn write_table_csv<T: Tabular + ?Sized>(path: &Path, table: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Cell::to_csv_field))?;
    }
    writer.flush().map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(file = %path.display(), "Table exported");
    Ok(())
}
