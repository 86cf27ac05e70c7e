//! Proxy Sweep - concurrent proxy list validator
//!
//! Checks every endpoint of a proxy list for HTTP, HTTPS, SOCKS4 and SOCKS5
//! support, writing per-protocol result files as it goes.

pub mod error;
pub mod proxy;

pub use error::{ProbeError, ProbeResult};
pub use proxy::*;

use std::path::{Path, PathBuf};

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Name of the results directory created next to the input list
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Results directory used when none is given: `<input dir>/results`
pub fn default_output_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_RESULTS_DIR)
}
