//! Traffic Monitor - Replay Entry Point
//!
//! `traffic-monitor [REPLAY_FILE]`
//!
//! Replays recorded classification events (JSONL, stdin when no file is
//! given) through a local channel into a live monitor, logs running stats,
//! then prints the current view as CSV and writes it to the export dir.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;

use traffic_monitor_core::constants;
use traffic_monitor_core::logic::replay::{self, ReplaySummary};
use traffic_monitor_core::{LiveMonitor, LocalChannel, MonitorConfig, Result};

/// How often queued events are drained into the store
const PUMP_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    let config = MonitorConfig::from_env();
    let source = std::env::args().nth(1).map(PathBuf::from);

    if let Err(e) = run(config, source).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: MonitorConfig, source: Option<PathBuf>) -> Result<()> {
    log::info!(
        "Config: capacity={}, threat_window={}, fresh_window={}, rate_window={}s",
        config.capacity,
        config.threat_window,
        config.fresh_window,
        config.rate_window_secs
    );

    let channel = LocalChannel::new();
    channel.open();

    let mut monitor = LiveMonitor::new(Arc::new(channel.clone()), config.clone());
    monitor.attach();

    let interval = Duration::from_millis(constants::get_replay_interval_ms());
    let replay_channel = channel.clone();
    let mut replay_task = tokio::spawn(async move {
        match source {
            Some(path) => replay::replay_file(&path, &replay_channel, interval).await,
            None => {
                log::info!("Replaying events from stdin");
                let stdin = BufReader::new(tokio::io::stdin());
                replay::replay_lines(stdin, &replay_channel, interval).await
            }
        }
    });

    let mut ticker = tokio::time::interval(PUMP_INTERVAL);
    let summary: Option<ReplaySummary> = loop {
        tokio::select! {
            _ = ticker.tick() => {
                if monitor.pump() > 0 {
                    log_stats(&monitor);
                }
            }
            joined = &mut replay_task => {
                break match joined {
                    Ok(result) => Some(result?),
                    Err(e) => {
                        log::error!("Replay task failed: {}", e);
                        None
                    }
                };
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, stopping replay");
                replay_task.abort();
                break None;
            }
        }
    };

    channel.close();
    if monitor.pump() > 0 {
        log_stats(&monitor);
    }

    if let Some(summary) = summary {
        log::info!(
            "Replay: {} lines, {} published, {} invalid",
            summary.lines,
            summary.published,
            summary.invalid
        );
    }

    let diagnostics = monitor.diagnostics();
    log::info!(
        "Diagnostics: batches={}, malformed={}, degraded={}, stale={}, overflow={}, raw_packets={}",
        diagnostics.batches,
        diagnostics.malformed_skipped,
        diagnostics.degraded_payloads,
        diagnostics.stale_redeliveries,
        diagnostics.dropped_overflow,
        diagnostics.ignored_raw_packets
    );

    print!("{}", monitor.export_current_view());

    let path = monitor.export_to_file(&config.export_dir)?;
    log::info!("Current view exported to {:?}", path);

    monitor.detach();
    Ok(())
}

fn log_stats(monitor: &LiveMonitor) {
    let snapshot = monitor.get_snapshot();
    let stats = snapshot.stats();
    log::info!(
        "Processed {} | retained {} | threat {} | high {} | {:.1} events/min",
        stats.total_processed,
        stats.retained,
        stats.threat_level,
        stats.high_risk_count,
        stats.events_per_minute
    );
}
