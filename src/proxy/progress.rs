//! Live throughput / ETA status line

use crate::proxy::models::ProxyType;
use crate::proxy::store::{ResultStore, StatsSnapshot};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Width the last-endpoint column is padded or truncated to
const LAST_COLUMN_WIDTH: usize = 40;

/// One computed progress sample
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub done: u64,
    pub total: u64,
    pub percent: f64,
    /// Endpoints per second since the previous sample
    pub speed: f64,
    /// `None` while nothing completed during the last interval
    pub eta: Option<Duration>,
}

/// Turns successive counter readings into throughput and ETA
#[derive(Debug)]
pub struct ProgressMeter {
    prev_done: u64,
    prev_at: Instant,
}

impl ProgressMeter {
    pub fn new(start: Instant) -> Self {
        Self {
            prev_done: 0,
            prev_at: start,
        }
    }

    pub fn tick(&mut self, stats: &StatsSnapshot, now: Instant) -> Progress {
        let mut elapsed = now.saturating_duration_since(self.prev_at).as_secs_f64();
        if elapsed <= 0.0 {
            elapsed = 1.0;
        }
        let delta = stats.done.saturating_sub(self.prev_done);
        let speed = delta as f64 / elapsed;
        self.prev_done = stats.done;
        self.prev_at = now;

        let percent = if stats.total == 0 {
            100.0
        } else {
            stats.done as f64 * 100.0 / stats.total as f64
        };
        let remaining = stats.total.saturating_sub(stats.done);
        let eta = (speed > 0.0).then(|| Duration::from_secs_f64(remaining as f64 / speed));

        Progress {
            done: stats.done,
            total: stats.total,
            percent,
            speed,
            eta,
        }
    }
}

/// `HH:MM:SS`, or `--:--:--` when unknown
pub fn format_eta(eta: Option<Duration>) -> String {
    match eta {
        Some(eta) => {
            let secs = eta.as_secs();
            format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
        }
        None => "--:--:--".to_string(),
    }
}

/// Build the status line (without the leading carriage return)
pub fn render_line(progress: &Progress, stats: &StatsSnapshot, last: &str) -> String {
    let per_protocol = ProxyType::ALL
        .iter()
        .map(|p| format!("{}:{}", p.short_label(), stats.ok(*p)))
        .collect::<Vec<_>>()
        .join(" ");
    let last: String = last.chars().take(LAST_COLUMN_WIDTH).collect();

    format!(
        "[{}/{}] {:5.2}% OK:{} Fail:{} ({}) Speed:{:.1} p/s ETA:{} Last:{:<width$}",
        progress.done,
        progress.total,
        progress.percent,
        stats.found,
        stats.failed,
        per_protocol,
        progress.speed,
        format_eta(progress.eta),
        last,
        width = LAST_COLUMN_WIDTH,
    )
}

fn emit(line: &str) {
    let mut out = io::stdout().lock();
    // A lost status line is harmless.
    let _ = write!(out, "\r{line}");
    let _ = out.flush();
}

/// Print a status line every `interval` until `cancel` fires
pub async fn run_progress(store: Arc<ResultStore>, interval: Duration, cancel: CancellationToken) {
    let mut meter = ProgressMeter::new(Instant::now());
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    let mut last = String::from("-");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let stats = store.stats();
                if let Some(proxy) = &stats.last {
                    last = proxy.to_simple_string();
                }
                let progress = meter.tick(&stats, Instant::now());
                emit(&render_line(&progress, &stats, &last));
            }
        }
    }
}
