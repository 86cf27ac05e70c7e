//! Probe configuration and the per-endpoint orchestrator

use crate::proxy::models::{Proxy, ProxyCheckResult, ProxyType};
use crate::proxy::probe::Prober;
use crate::proxy::store::ResultStore;
use std::sync::Arc;
use std::time::Duration;

/// Default URL for the plain HTTP forward-proxy probe
pub const DEFAULT_HTTP_URL: &str = "http://httpbin.org/ip";

/// Default URL for the HTTPS forward-proxy probe
pub const DEFAULT_HTTPS_URL: &str = "https://httpbin.org/ip";

/// Default destination requested through SOCKS proxies
pub const DEFAULT_SOCKS_HOST: &str = "httpbin.org";
pub const DEFAULT_SOCKS_PORT: u16 = 80;

/// Default request timeout for the HTTP/HTTPS probes in milliseconds
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 7_000;

/// Default connect/read/write timeout for the SOCKS probes in milliseconds
const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 4_000;

/// Default number of extra attempts after a transport error
const DEFAULT_RETRIES: u32 = 1;

/// Default base delay for exponential backoff in milliseconds
const DEFAULT_BACKOFF_MS: u64 = 250;

/// Configuration for the protocol probes
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// URL fetched through the candidate for the HTTP probe
    pub http_url: String,
    /// URL fetched through the candidate for the HTTPS probe
    pub https_url: String,
    /// Destination host requested through SOCKS4/SOCKS5
    pub socks_host: String,
    /// Destination port requested through SOCKS4/SOCKS5
    pub socks_port: u16,
    /// Whole-request timeout for each HTTP/HTTPS attempt
    pub http_timeout: Duration,
    /// Connect and I/O timeout for the SOCKS sockets
    pub socket_timeout: Duration,
    /// Extra attempts after a transport error (HTTP/HTTPS only)
    pub retries: u32,
    /// Backoff before retry `n` is `backoff * 2^n`
    pub backoff: Duration,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            http_url: DEFAULT_HTTP_URL.to_string(),
            https_url: DEFAULT_HTTPS_URL.to_string(),
            socks_host: DEFAULT_SOCKS_HOST.to_string(),
            socks_port: DEFAULT_SOCKS_PORT,
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            socket_timeout: Duration::from_millis(DEFAULT_SOCKET_TIMEOUT_MS),
            retries: DEFAULT_RETRIES,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_url(mut self, url: String) -> Self {
        self.http_url = url;
        self
    }

    pub fn with_https_url(mut self, url: String) -> Self {
        self.https_url = url;
        self
    }

    pub fn with_socks_target(mut self, host: String, port: u16) -> Self {
        self.socks_host = host;
        self.socks_port = port;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Runs every protocol probe against one endpoint and records the outcome.
///
/// Probes run one after another in [`ProxyType::ALL`] order and are never
/// short-circuited, so a proxy's full protocol support is always known.
pub struct ProxyChecker {
    prober: Arc<dyn Prober>,
    store: Arc<ResultStore>,
}

impl ProxyChecker {
    pub fn new(prober: Arc<dyn Prober>, store: Arc<ResultStore>) -> Self {
        Self { prober, store }
    }

    /// Check a single proxy against all four protocols
    pub async fn check_proxy(&self, proxy: &Proxy) -> ProxyCheckResult {
        let mut protocols = Vec::new();

        for protocol in ProxyType::ALL {
            if self.prober.probe(proxy, protocol).await {
                self.store.record_success(proxy, protocol);
                protocols.push(protocol);
            }
        }

        self.store.record_done(proxy, !protocols.is_empty());
        ProxyCheckResult::new(proxy.clone(), protocols)
    }
}

impl Clone for ProxyChecker {
    fn clone(&self) -> Self {
        Self {
            prober: Arc::clone(&self.prober),
            store: Arc::clone(&self.store),
        }
    }
}
