//! Current-view export
//!
//! CSV of the projected rows only, fixed column order:
//! id, flow_id, prediction, confidence (percent, 1 decimal), risk.

use std::fmt::Write as _;
use std::path::Path;

use super::projection::ProjectedRow;
use crate::error::ExportError;

pub const CSV_HEADER: &str = "id,flow_id,prediction,confidence,risk";

/// Placeholder for missing values
const MISSING: &str = "-";

/// Render rows as CSV text. An empty slice yields the header only.
pub fn render_csv(rows: &[ProjectedRow]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for row in rows {
        let record = &row.record;
        let confidence = record
            .confidence
            .map(format_percent)
            .unwrap_or_else(|| MISSING.to_string());

        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            record.arrival_rank,
            escape_field(record.flow_id.as_deref().unwrap_or(MISSING)),
            escape_field(record.label.as_deref().unwrap_or(MISSING)),
            confidence,
            escape_field(record.risk_display()),
        );
    }

    out
}

/// Write the CSV to `path`, returning the number of data rows
pub fn write_csv_file(rows: &[ProjectedRow], path: &Path) -> Result<usize, ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_csv(rows))?;
    log::info!("Exported {} rows to {:?}", rows.len(), path);
    Ok(rows.len())
}

/// 0.934 -> "93.4%"
pub fn format_percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// Quote fields holding separators, quotes or line breaks
fn escape_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
