//! Replay Source
//!
//! Publishes recorded backend events into a `LocalChannel`.
//! One JSON value per line: either `{"event": <name>, "data": <payload>}`
//! or a bare payload, which is treated as a classification event.
//! Unreadable lines are skipped and counted.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::error::{ChannelError, ReplayError};
use crate::logic::channel::{events, LocalChannel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Non-empty lines read
    pub lines: usize,
    pub published: usize,
    /// Lines that were not valid JSON
    pub invalid: usize,
    /// Events not delivered because the channel was closed
    pub undelivered: usize,
}

/// Replay a JSONL file
pub async fn replay_file(
    path: &Path,
    channel: &LocalChannel,
    interval: Duration,
) -> Result<ReplaySummary, ReplayError> {
    let file = File::open(path).await?;
    log::info!("Replaying events from {:?}", path);
    replay_lines(BufReader::new(file), channel, interval).await
}

/// Replay JSONL from any async reader (stdin, file, memory)
pub async fn replay_lines<R>(
    reader: R,
    channel: &LocalChannel,
    interval: Duration,
) -> Result<ReplaySummary, ReplayError>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;

        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Replay line {}: {}", summary.lines, e);
                summary.invalid += 1;
                continue;
            }
        };

        let (event, payload) = split_envelope(value);
        match channel.publish(&event, &payload) {
            Ok(_) => summary.published += 1,
            Err(ChannelError::Closed(_)) => summary.undelivered += 1,
            Err(e) => log::warn!("Replay publish failed: {}", e),
        }

        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }

    log::info!(
        "Replay finished: {} published, {} invalid, {} undelivered",
        summary.published,
        summary.invalid,
        summary.undelivered
    );
    Ok(summary)
}

/// `{"event": name, "data": payload, ..}` -> (name, payload); bare value -> classification.
/// Extra envelope keys (ids, sequence numbers) are ignored.
fn split_envelope(value: Value) -> (String, Value) {
    if let Value::Object(mut obj) = value {
        let is_envelope =
            obj.get("event").map_or(false, Value::is_string) && obj.contains_key("data");
        if is_envelope {
            let event = obj
                .remove("event")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| events::CLASSIFICATION.to_string());
            let data = obj.remove("data").unwrap_or(Value::Null);
            return (event, data);
        }
        return (events::CLASSIFICATION.to_string(), Value::Object(obj));
    }
    (events::CLASSIFICATION.to_string(), value)
}
