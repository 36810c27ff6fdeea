//! Configuration module

use std::path::PathBuf;

use crate::constants;

/// Monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Maximum records held by the live store
    pub capacity: usize,

    /// Most recent arrivals inspected for the current threat level
    pub threat_window: usize,

    /// Most recent arrivals flagged as fresh in projections
    pub fresh_window: u64,

    /// Trailing window for events-per-minute, in seconds
    pub rate_window_secs: i64,

    /// Bound of the inbox between the channel and the store
    pub pending_limit: usize,

    /// Rows shown when the view config does not say otherwise
    pub max_visible: usize,

    /// Where `export_to_file` writes CSV files
    pub export_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            capacity: constants::DEFAULT_CAPACITY,
            threat_window: constants::DEFAULT_THREAT_WINDOW,
            fresh_window: constants::DEFAULT_FRESH_WINDOW,
            rate_window_secs: constants::DEFAULT_RATE_WINDOW_SECS,
            pending_limit: constants::DEFAULT_PENDING_LIMIT,
            max_visible: constants::DEFAULT_MAX_VISIBLE,
            export_dir: PathBuf::from("."),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            capacity: constants::get_capacity(),
            threat_window: constants::get_threat_window(),
            fresh_window: constants::get_fresh_window(),
            rate_window_secs: constants::get_rate_window_secs(),
            pending_limit: constants::get_pending_limit(),
            max_visible: constants::get_max_visible(),
            export_dir: constants::get_export_dir(),
        }
    }

    /// Same config with a different capacity (tests, embedding)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}
