//! Proxy data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol a candidate proxy is probed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    /// Every protocol, in the fixed probe and output order
    pub const ALL: [ProxyType; 4] = [
        ProxyType::Http,
        ProxyType::Https,
        ProxyType::Socks4,
        ProxyType::Socks5,
    ];

    /// Position of this protocol inside [`ProxyType::ALL`]
    pub fn index(self) -> usize {
        match self {
            ProxyType::Http => 0,
            ProxyType::Https => 1,
            ProxyType::Socks4 => 2,
            ProxyType::Socks5 => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        }
    }

    /// Short label used on the progress line
    pub fn short_label(self) -> &'static str {
        match self {
            ProxyType::Http => "H",
            ProxyType::Https => "HS",
            ProxyType::Socks4 => "S4",
            ProxyType::Socks5 => "S5",
        }
    }

    /// Name of the per-protocol result file, e.g. `valid_socks5.txt`
    pub fn output_file_name(self) -> String {
        format!("valid_{}.txt", self.as_str())
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyType::Http => write!(f, "HTTP"),
            ProxyType::Https => write!(f, "HTTPS"),
            ProxyType::Socks4 => write!(f, "SOCKS4"),
            ProxyType::Socks5 => write!(f, "SOCKS5"),
        }
    }
}

/// A candidate proxy endpoint.
///
/// Identity is the normalized `host:port` pair; the scheme the endpoint was
/// listed with is discarded because every protocol is probed regardless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proxy {
    pub host: String,
    pub port: u16,
}

impl Proxy {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// Get the proxy string in HOST:PORT format
    pub fn to_simple_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL used when handing this endpoint to an HTTP client as a forward proxy
    pub fn http_proxy_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Outcome of running every protocol probe against one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyCheckResult {
    pub proxy: Proxy,
    /// Protocols that succeeded, in probe order
    pub protocols: Vec<ProxyType>,
}

impl ProxyCheckResult {
    pub fn new(proxy: Proxy, protocols: Vec<ProxyType>) -> Self {
        Self { proxy, protocols }
    }

    /// True when at least one protocol succeeded
    pub fn is_working(&self) -> bool {
        !self.protocols.is_empty()
    }

    pub fn supports(&self, protocol: ProxyType) -> bool {
        self.protocols.contains(&protocol)
    }
}
