//! Store Module
//!
//! Live Result Store: bounded, deduplicated set of classification records
//! plus the aggregate stats derived from it.
//!
//! ## Structure
//! - `types`: Snapshot, AggregateStats, Diagnostics, StoreSettings, IngestMode
//! - `stats`: stats derivation (risk counts, threat level, events per minute)
//! - `clock`: wall clock abstraction (system / manual)
//! - `live`: LiveResultStore (ingest, clear, snapshot)
//!
//! ## Usage
//! ```ignore
//! let mut store = LiveResultStore::new(StoreSettings::with_capacity(200));
//! let snapshot = store.ingest(&payloads);
//! println!("threat level: {}", snapshot.stats().threat_level);
//! ```

pub mod types;
pub mod stats;
pub mod clock;
pub mod live;

#[cfg(test)]
mod tests;

pub use types::{AggregateStats, Diagnostics, IngestMode, Snapshot, StoreSettings};
pub use clock::{Clock, ManualClock, SystemClock};
pub use live::{IngestReport, LiveResultStore};
