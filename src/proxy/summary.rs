//! End-of-run summary written to `stats.txt`

use crate::proxy::autosave::write_atomic;
use crate::proxy::models::ProxyType;
use crate::proxy::parser::ParsedList;
use crate::proxy::store::StatsSnapshot;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::io;
use std::path::Path;
use std::time::Duration;

pub const STATS_FILE: &str = "stats.txt";

/// Everything reported about a finished scan
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the summary was produced, i.e. the end of the run
    pub finished_at: DateTime<Local>,
    pub total_input_lines: usize,
    pub duplicates_removed: usize,
    pub stats: StatsSnapshot,
    pub duration: Duration,
}

impl RunSummary {
    /// Summarize a finished scan, stamped with the current local time
    pub fn new(input: &ParsedList, stats: StatsSnapshot, duration: Duration) -> Self {
        Self {
            finished_at: Local::now(),
            total_input_lines: input.total_lines,
            duplicates_removed: input.duplicates_removed,
            stats,
            duration,
        }
    }

    /// Endpoints checked per second over the whole run
    pub fn average_speed(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.stats.done as f64 / secs
        } else {
            0.0
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "proxy-sweep run summary");
        let _ = writeln!(out, "Date: {}", self.finished_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "Total input lines: {}", self.total_input_lines);
        let _ = writeln!(out, "Duplicates removed: {}", self.duplicates_removed);
        let _ = writeln!(out, "Checked: {}", self.stats.done);
        let _ = writeln!(out, "Found valid: {}", self.stats.found);
        for protocol in ProxyType::ALL {
            let _ = writeln!(out, "{}: {}", protocol, self.stats.ok(protocol));
        }
        let _ = writeln!(out, "Duration: {:.2}s", self.duration.as_secs_f64());
        let _ = writeln!(out, "Average speed p/s: {:.2}", self.average_speed());
        out
    }
}

/// Atomically write `stats.txt` into `dir`
pub async fn write_summary(dir: &Path, summary: &RunSummary) -> io::Result<()> {
    write_atomic(&dir.join(STATS_FILE), summary.render().as_bytes()).await
}
