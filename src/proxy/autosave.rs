//! Periodic, atomic persistence of the result lists

use crate::proxy::models::ProxyType;
use crate::proxy::store::{ResultSnapshot, ResultStore};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Combined list of every successful endpoint, HTTP first
pub const ALL_VALID_FILE: &str = "all_valid.txt";

/// Write `contents` to a `.tmp` sibling, sync it, then rename it over `path`.
///
/// Readers see either the previous file or the new one, never a partial write.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await
}

/// Render one protocol list: one `host:port` per line
fn render_list(snapshot: &ResultSnapshot, protocol: ProxyType) -> String {
    let mut body = String::new();
    for proxy in snapshot.get(protocol) {
        body.push_str(&proxy.to_simple_string());
        body.push('\n');
    }
    body
}

/// Render the combined list, joined with newlines and no trailing newline
fn render_all_valid(snapshot: &ResultSnapshot) -> String {
    snapshot
        .all_valid()
        .iter()
        .map(|p| p.to_simple_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write every result file for `snapshot` into `dir`.
///
/// A failure on one file does not stop the others; the first error is
/// returned once all files have been attempted.
pub async fn flush(dir: &Path, snapshot: &ResultSnapshot) -> io::Result<()> {
    let mut first_error = None;

    for protocol in ProxyType::ALL {
        let path = dir.join(protocol.output_file_name());
        if let Err(e) = write_atomic(&path, render_list(snapshot, protocol).as_bytes()).await {
            first_error.get_or_insert(e);
        }
    }

    let path = dir.join(ALL_VALID_FILE);
    if let Err(e) = write_atomic(&path, render_all_valid(snapshot).as_bytes()).await {
        first_error.get_or_insert(e);
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Flush the store every `interval` until `cancel` fires.
///
/// Errors are logged and the next tick tries again.
pub async fn run_autosave(
    store: Arc<ResultStore>,
    dir: PathBuf,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let snapshot = store.snapshot();
                match flush(&dir, &snapshot).await {
                    Ok(()) => debug!(dir = %dir.display(), "autosaved results"),
                    Err(e) => warn!(dir = %dir.display(), error = %e, "autosave failed"),
                }
            }
        }
    }
}
