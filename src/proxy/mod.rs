//! Proxy module for normalizing and checking proxy lists
//!
//! This module provides functionality for:
//! - Normalizing proxy lists (scheme stripping, de-duplication)
//! - Probing each endpoint for HTTP, HTTPS, SOCKS4 and SOCKS5 support
//! - Scheduling checks in batches under a concurrency limit
//! - Autosaving results and reporting live progress

pub mod autosave;
pub mod checker;
pub mod models;
pub mod parser;
pub mod probe;
pub mod progress;
pub mod scanner;
pub mod store;
pub mod summary;

pub use checker::{CheckerConfig, ProxyChecker};
pub use models::{Proxy, ProxyCheckResult, ProxyType};
pub use parser::{ParsedList, ProxyParser};
pub use probe::{NetworkProber, Prober};
pub use scanner::{ScanConfig, ScanReport, Scanner};
pub use store::{ResultSnapshot, ResultStore, StatsSnapshot};
pub use summary::RunSummary;
