use crate::error::StorageError;
use crate::series_csv::{read_series_csv, write_series_csv};
use core_types::PriceSeries;
use std::path::{Path, PathBuf};

/// A directory holding one `<ID>.csv` per fund or index.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    dir: PathBuf,
}

impl SeriesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file that holds (or will hold) the series `id`.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.csv"))
    }

    /// Identifiers of every CSV in the directory, sorted.
    ///
    /// A missing directory is reported as `NotFound` rather than as an empty list.
    pub fn list_ids(&self) -> Result<Vec<String>, StorageError> {
        if !self.dir.is_dir() {
            return Err(StorageError::NotFound(self.dir.clone()));
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                ids.push(
                    path.file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Loads the series stored under `id`.
    ///
    /// The file name is matched exactly first, then case-insensitively, so that
    /// `vnindex` finds `VNINDEX.csv`.
    pub fn load(&self, id: &str) -> Result<PriceSeries, StorageError> {
        let exact = self.path_for(id);
        if exact.exists() {
            return read_series_csv(&exact);
        }

        let fallback = self
            .list_ids()
            .ok()
            .and_then(|ids| ids.into_iter().find(|candidate| candidate.eq_ignore_ascii_case(id)));
        match fallback {
            Some(found) => read_series_csv(&self.path_for(&found)),
            None => Err(StorageError::NotFound(exact)),
        }
    }

    /// Loads several series. The first failure aborts the whole load.
    pub fn load_many(&self, ids: &[String]) -> Result<Vec<PriceSeries>, StorageError> {
        ids.iter().map(|id| self.load(id)).collect()
    }

    /// Loads every series in the directory.
    ///
    /// Two files that resolve to the same series identifier keep only the first
    /// in file-name order; the other is logged and dropped.
    pub fn load_all(&self) -> Result<Vec<PriceSeries>, StorageError> {
        let ids = self.list_ids()?;
        tracing::debug!(dir = %self.dir.display(), count = ids.len(), "Loading series");

        let mut loaded: Vec<PriceSeries> = Vec::with_capacity(ids.len());
        for (file, series) in ids.iter().zip(self.load_many(&ids)?) {
            if loaded.iter().any(|s| s.id() == series.id()) {
                tracing::warn!(
                    id = %series.id(),
                    file = %self.path_for(file).display(),
                    "Duplicate series identifier, ignoring file"
                );
                continue;
            }
            loaded.push(series);
        }
        Ok(loaded)
    }

    /// Saves `series` as `<dir>/<ID>.csv`, creating the directory if needed.
    pub fn save(&self, series: &PriceSeries, value_column: &str) -> Result<PathBuf, StorageError> {
        let path = self.path_for(series.id());
        write_series_csv(&path, series, value_column)?;
        Ok(path)
    }
}
