//! Batched, bounded-concurrency scan over a proxy list
//!
//! Endpoints are admitted in fixed-size batches. Inside a batch every endpoint
//! is its own task, but a scan-wide semaphore caps how many checks are in
//! flight. The autosave writer and the progress reporter run alongside on
//! their own timers and are stopped and joined before the final flush.

use crate::proxy::autosave;
use crate::proxy::checker::ProxyChecker;
use crate::proxy::models::Proxy;
use crate::proxy::probe::Prober;
use crate::proxy::progress;
use crate::proxy::store::{ResultSnapshot, ResultStore, StatsSnapshot};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Hard ceiling on simultaneous checks
pub const MAX_CONCURRENCY: usize = 1000;

/// Suggested worker count
pub const DEFAULT_CONCURRENCY: usize = 200;

/// Endpoints admitted per batch
pub const DEFAULT_BATCH_SIZE: usize = 600;

const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 2_000;
const DEFAULT_STATS_INTERVAL_MS: u64 = 1_000;

/// Pause before the progress line is stopped so its last tick settles
const SETTLE_DELAY_MS: u64 = 50;

/// Configuration for the scan scheduler
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Requested simultaneous checks, clamped to `1..=max_concurrency`
    pub concurrency: usize,
    pub max_concurrency: usize,
    pub batch_size: usize,
    pub autosave_interval: Duration,
    pub stats_interval: Duration,
    /// Print the live status line
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_concurrency: MAX_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            autosave_interval: Duration::from_millis(DEFAULT_AUTOSAVE_INTERVAL_MS),
            stats_interval: Duration::from_millis(DEFAULT_STATS_INTERVAL_MS),
            show_progress: true,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    pub fn with_stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Concurrency actually used by the scheduler
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, self.max_concurrency.max(1))
    }
}

/// Final state of a scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub results: ResultSnapshot,
    pub stats: StatsSnapshot,
    pub elapsed: Duration,
    /// The scan was cancelled before every endpoint was checked
    pub interrupted: bool,
}

/// Drives a [`ProxyChecker`] over a whole proxy list
pub struct Scanner {
    config: ScanConfig,
    prober: Arc<dyn Prober>,
}

impl Scanner {
    pub fn new(config: ScanConfig, prober: Arc<dyn Prober>) -> Self {
        Self { config, prober }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Check every proxy, writing result files into `out_dir`.
    ///
    /// Cancelling `cancel` aborts in-flight checks, stops admitting batches
    /// and flushes whatever has been found so far.
    pub async fn run(
        &self,
        proxies: &[Proxy],
        out_dir: &Path,
        cancel: CancellationToken,
    ) -> ScanReport {
        let started = Instant::now();
        let limit = self.config.effective_concurrency();
        let batch_size = self.config.batch_size.max(1);

        let store = Arc::new(ResultStore::new(proxies.len()));
        let checker = ProxyChecker::new(Arc::clone(&self.prober), Arc::clone(&store));
        let semaphore = Arc::new(Semaphore::new(limit));

        info!(
            total = proxies.len(),
            concurrency = limit,
            batch_size,
            "starting scan"
        );

        let autosave_stop = cancel.child_token();
        let autosave_task = tokio::spawn(autosave::run_autosave(
            Arc::clone(&store),
            out_dir.to_path_buf(),
            self.config.autosave_interval,
            autosave_stop.clone(),
        ));

        let progress_stop = cancel.child_token();
        let progress_task = self.config.show_progress.then(|| {
            tokio::spawn(progress::run_progress(
                Arc::clone(&store),
                self.config.stats_interval,
                progress_stop.clone(),
            ))
        });

        let mut interrupted = false;
        for batch in proxies.chunks(batch_size) {
            if cancel.is_cancelled() {
                interrupted = true;
                break;
            }

            let mut set = JoinSet::new();
            for proxy in batch {
                let checker = checker.clone();
                let semaphore = Arc::clone(&semaphore);
                let proxy = proxy.clone();
                set.spawn(async move {
                    // The semaphore is never closed.
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };
                    checker.check_proxy(&proxy).await;
                });
            }

            loop {
                tokio::select! {
                    joined = set.join_next() => match joined {
                        Some(Err(e)) if e.is_panic() => warn!(error = %e, "check task panicked"),
                        Some(_) => {}
                        None => break,
                    },
                    _ = cancel.cancelled() => {
                        set.abort_all();
                        interrupted = true;
                        break;
                    }
                }
            }
            if interrupted {
                break;
            }
            tokio::task::yield_now().await;
        }

        tokio::time::sleep(Duration::from_millis(SETTLE_DELAY_MS)).await;
        progress_stop.cancel();
        if let Some(task) = progress_task {
            let _ = task.await;
        }
        autosave_stop.cancel();
        let _ = autosave_task.await;

        let results = store.snapshot();
        if let Err(e) = autosave::flush(out_dir, &results).await {
            warn!(dir = %out_dir.display(), error = %e, "final flush failed");
        }

        let stats = store.stats();
        let elapsed = started.elapsed();
        info!(
            done = stats.done,
            found = stats.found,
            interrupted,
            elapsed_secs = elapsed.as_secs_f64(),
            "scan finished"
        );

        ScanReport {
            results,
            stats,
            elapsed,
            interrupted,
        }
    }
}
