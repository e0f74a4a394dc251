//! # FundScope Storage
//!
//! The flat-file "archive" of the toolkit. Price histories live as one CSV per
//! fund or index, and result tables are exported as CSV.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate is the only place that knows about CSV layouts. It
//!   hands the rest of the application validated `PriceSeries` values.
//! - **Tolerant reader:** The provider's column set is an external contract. The
//!   reader looks for the first known date and value columns and ignores the rest.
//!
//! ## Public API
//!
//! - `SeriesStore`: a directory of series CSVs, addressed by identifier.
//! - `read_series_csv` / `write_series_csv`: single-file load and save.
//! - `Tabular`, `Cell`, `write_table_csv`: the table shape shared by CSV export
//!   and terminal rendering.
//! - `StorageError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod series_csv;
pub mod store;
pub mod table;

pub use error::StorageError;
pub use series_csv::{read_series_csv, write_series_csv, DATE_COLUMNS, VALUE_COLUMNS};
pub use store::SeriesStore;
pub use table::{Cell, Tabular, write_table_csv};
