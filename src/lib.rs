//! Traffic Monitor Core
//!
//! Live store and view engine for network traffic classification results.
//! Classification events arrive over an event channel, are normalized into
//! records, retained in a bounded newest-first store, and projected through
//! a filter/search/sort view that can be exported as CSV.
//!
//! # Usage
//! ```ignore
//! use std::sync::Arc;
//! use traffic_monitor_core::{LiveMonitor, LocalChannel, MonitorConfig};
//!
//! let channel = LocalChannel::new();
//! channel.open();
//! let mut monitor = LiveMonitor::new(Arc::new(channel.clone()), MonitorConfig::from_env());
//! monitor.attach();
//!
//! channel.publish("real_time_prediction", &payload)?;
//! monitor.pump();
//! let csv = monitor.export_current_view();
//! ```

pub mod constants;
pub mod config;
pub mod error;
pub mod logic;

pub use config::MonitorConfig;
pub use error::{ChannelError, Error, ExportError, ReplayError, Result};
pub use logic::channel::{EventChannel, LocalChannel};
pub use logic::monitor::LiveMonitor;
pub use logic::record::{ClassificationRecord, RiskLevel};
pub use logic::store::{AggregateStats, IngestMode, LiveResultStore, Snapshot};
pub use logic::view::{Projection, RiskFilter, SortDirection, SortKey, ViewConfig};
