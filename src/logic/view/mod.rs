//! View Module
//!
//! Computes what the live table shows from a store snapshot.
//! Stateless per call; never mutates the store.
//!
//! ## Structure
//! - `types`: ViewConfig, RiskFilter, SortKey, SortDirection (lenient parsing)
//! - `projection`: filter / sort / truncate
//! - `export`: CSV of the current projection

pub mod types;
pub mod projection;
pub mod export;

#[cfg(test)]
mod tests;

pub use types::{RawViewConfig, RiskFilter, SortDirection, SortKey, ViewConfig};
pub use projection::{project, project_snapshot, ProjectedRow, Projection};
pub use export::{render_csv, write_csv_file, CSV_HEADER};
