//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment; unparsable or
//! zero values fall back to the default instead of failing startup.

use std::path::PathBuf;

/// Default store capacity (records kept in memory)
pub const DEFAULT_CAPACITY: usize = 200;

/// Number of most recent arrivals inspected for the current threat level
pub const DEFAULT_THREAT_WINDOW: usize = 20;

/// Number of most recent arrivals highlighted as fresh
pub const DEFAULT_FRESH_WINDOW: u64 = 10;

/// Trailing window for events-per-minute (seconds)
pub const DEFAULT_RATE_WINDOW_SECS: i64 = 60;

/// Bounded inbox between the channel handler and the store
pub const DEFAULT_PENDING_LIMIT: usize = 1024;

/// Rows shown by default in the projected view
pub const DEFAULT_MAX_VISIBLE: usize = 100;

/// Hard ceiling for `max_visible`
pub const MAX_VISIBLE_LIMIT: usize = 1000;

/// Delay between replayed events (milliseconds)
pub const DEFAULT_REPLAY_INTERVAL_MS: u64 = 0;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Traffic Monitor";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_positive<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
        .unwrap_or(default)
}

/// Get store capacity from environment or use default
pub fn get_capacity() -> usize {
    env_positive("TRAFFIC_MONITOR_CAPACITY", DEFAULT_CAPACITY)
}

/// Get threat window from environment or use default
pub fn get_threat_window() -> usize {
    env_positive("TRAFFIC_MONITOR_THREAT_WINDOW", DEFAULT_THREAT_WINDOW)
}

/// Get fresh-highlight window from environment or use default
pub fn get_fresh_window() -> u64 {
    env_positive("TRAFFIC_MONITOR_FRESH_WINDOW", DEFAULT_FRESH_WINDOW)
}

/// Get rate window from environment or use default
pub fn get_rate_window_secs() -> i64 {
    env_positive("TRAFFIC_MONITOR_RATE_WINDOW_SECS", DEFAULT_RATE_WINDOW_SECS)
}

/// Get inbox bound from environment or use default
pub fn get_pending_limit() -> usize {
    env_positive("TRAFFIC_MONITOR_PENDING_LIMIT", DEFAULT_PENDING_LIMIT)
}

/// Get default visible rows from environment or use default
pub fn get_max_visible() -> usize {
    env_positive("TRAFFIC_MONITOR_MAX_VISIBLE", DEFAULT_MAX_VISIBLE).min(MAX_VISIBLE_LIMIT)
}

/// Get replay pacing from environment (0 = as fast as possible)
pub fn get_replay_interval_ms() -> u64 {
    std::env::var("TRAFFIC_MONITOR_REPLAY_INTERVAL_MS")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_REPLAY_INTERVAL_MS)
}

/// Get export directory from environment or use the local data dir
pub fn get_export_dir() -> PathBuf {
    std::env::var("TRAFFIC_MONITOR_EXPORT_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_export_dir)
}

fn default_export_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("traffic-monitor")
        .join("exports")
}
