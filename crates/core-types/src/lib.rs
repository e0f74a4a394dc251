//! # FundScope Core Types
//!
//! The vocabulary shared by every other crate in the workspace.
//!
//! ## Architectural Principles
//!
//! - **Layer 0:** This crate has no knowledge of files, HTTP or configuration.
//!   Everything above it speaks in terms of `PriceSeries`.
//! - **Validated on construction:** A `PriceSeries` is sorted, de-duplicated and
//!   non-negative by the time anyone can hold one.

pub mod enums;
pub mod error;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use enums::FundCategory;
pub use error::CoreError;
pub use series::{PricePoint, PriceSeries};
