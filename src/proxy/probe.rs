//! Protocol probes
//!
//! Four independent checks, one per [`ProxyType`]:
//!
//! - HTTP: a GET for `http_url` relayed by the candidate as a forward proxy.
//! - HTTPS: a GET for `https_url`, also sent to the candidate as a plain
//!   absolute-form forward request. No CONNECT tunnel is opened, so this
//!   measures whether the proxy relays a request whose target is an `https`
//!   URL, not whether it can tunnel TLS.
//! - SOCKS4 / SOCKS5: raw CONNECT handshakes over a blocking socket, run on
//!   tokio's blocking pool.
//!
//! Every probe reports `Result<bool, ProbeError>` internally; the [`Prober`]
//! trait collapses errors into `false`.

use crate::error::{ProbeError, ProbeResult};
use crate::proxy::checker::CheckerConfig;
use crate::proxy::models::{Proxy, ProxyType};
use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode, Url};
use std::future::Future;
use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream as StdTcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace};

const SOCKS4_VERSION: u8 = 0x04;
const SOCKS4_GRANTED: u8 = 0x5A;
const SOCKS5_VERSION: u8 = 0x05;
const SOCKS5_NO_AUTH: u8 = 0x00;
const SOCKS5_NO_ACCEPTABLE_METHOD: u8 = 0xFF;
const SOCKS5_ATYP_DOMAIN: u8 = 0x03;
const SOCKS5_SUCCEEDED: u8 = 0x00;
const SOCKS_CMD_CONNECT: u8 = 0x01;

/// Longest status line accepted from an HTTP forward proxy
const MAX_STATUS_LINE: u64 = 1024;

/// Uniform probe interface used by the orchestrator.
///
/// Implementations must never fail: any error is reported as `false`.
pub trait Prober: Send + Sync {
    fn probe<'a>(&'a self, proxy: &'a Proxy, protocol: ProxyType) -> BoxFuture<'a, bool>;
}

/// Delay before retry number `attempt` (0-based): `base * 2^attempt`
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
}

/// Probes candidates over the network
#[derive(Debug, Clone)]
pub struct NetworkProber {
    config: CheckerConfig,
    https_url: Url,
}

impl NetworkProber {
    /// Build a prober, validating the configured target URLs
    pub fn new(config: CheckerConfig) -> crate::Result<Self> {
        let http_url = Url::parse(&config.http_url)?;
        // reqwest only routes `http` targets through an HTTP proxy.
        if http_url.scheme() != "http" {
            anyhow::bail!("HTTP target URL must use http://: {}", config.http_url);
        }
        let https_url = Url::parse(&config.https_url)?;
        if https_url.host_str().is_none() {
            anyhow::bail!("HTTPS target URL has no host: {}", config.https_url);
        }
        Ok(Self { config, https_url })
    }

    /// Run one protocol probe, keeping the failure reason
    pub async fn check(&self, proxy: &Proxy, protocol: ProxyType) -> ProbeResult<bool> {
        match protocol {
            ProxyType::Http => Ok(self.http_check(proxy).await?.is_some()),
            ProxyType::Https => Ok(self.https_check(proxy).await?.is_some()),
            ProxyType::Socks4 => self.socks4_check(proxy).await,
            ProxyType::Socks5 => self.socks5_check(proxy).await,
        }
    }

    /// HTTP forward-proxy probe. `Some(elapsed)` on a 200 response.
    pub async fn http_check(&self, proxy: &Proxy) -> ProbeResult<Option<Duration>> {
        let client = Client::builder()
            .proxy(ReqwestProxy::http(proxy.http_proxy_url())?)
            .timeout(self.config.http_timeout)
            .build()?;
        let client = &client;

        self.with_retries(proxy, ProxyType::Http, move || async move {
            let start = Instant::now();
            let response = client.get(&self.config.http_url).send().await?;
            Ok((response.status() == StatusCode::OK).then(|| start.elapsed()))
        })
        .await
    }

    /// HTTPS probe sent as a plain forward request. `Some(elapsed)` on a 200
    /// response.
    pub async fn https_check(&self, proxy: &Proxy) -> ProbeResult<Option<Duration>> {
        self.with_retries(proxy, ProxyType::Https, move || async move {
            let start = Instant::now();
            let status = tokio::time::timeout(
                self.config.http_timeout,
                forward_request(proxy, &self.https_url),
            )
            .await
            .map_err(|_| ProbeError::Timeout)??;
            Ok((status == StatusCode::OK.as_u16()).then(|| start.elapsed()))
        })
        .await
    }

    pub async fn socks4_check(&self, proxy: &Proxy) -> ProbeResult<bool> {
        let (host, port) = (proxy.host.clone(), proxy.port);
        let (dest_host, dest_port) = (self.config.socks_host.clone(), self.config.socks_port);
        let timeout = self.config.socket_timeout;

        tokio::task::spawn_blocking(move || {
            let dest_ip = resolve_ipv4(&dest_host, dest_port)?;
            let mut stream = connect_blocking(&host, port, timeout)?;
            socks4_handshake(&mut stream, dest_ip, dest_port)
        })
        .await?
    }

    pub async fn socks5_check(&self, proxy: &Proxy) -> ProbeResult<bool> {
        let (host, port) = (proxy.host.clone(), proxy.port);
        let (dest_host, dest_port) = (self.config.socks_host.clone(), self.config.socks_port);
        let timeout = self.config.socket_timeout;

        tokio::task::spawn_blocking(move || {
            let mut stream = connect_blocking(&host, port, timeout)?;
            socks5_handshake(&mut stream, &dest_host, dest_port)
        })
        .await?
    }

    /// Retry `attempt` after transport errors only. A completed exchange with
    /// a non-200 status is a definitive answer and is not retried.
    async fn with_retries<F, Fut>(
        &self,
        proxy: &Proxy,
        protocol: ProxyType,
        mut attempt: F,
    ) -> ProbeResult<Option<Duration>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<Option<Duration>>>,
    {
        let mut tries = 0;
        loop {
            match attempt().await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if tries < self.config.retries => {
                    let delay = backoff_delay(self.config.backoff, tries);
                    trace!(%proxy, %protocol, error = %e, ?delay, "retrying probe");
                    tokio::time::sleep(delay).await;
                    tries += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Prober for NetworkProber {
    fn probe<'a>(&'a self, proxy: &'a Proxy, protocol: ProxyType) -> BoxFuture<'a, bool> {
        async move {
            match self.check(proxy, protocol).await {
                Ok(ok) => ok,
                Err(e) => {
                    debug!(%proxy, %protocol, error = %e, "probe failed");
                    false
                }
            }
        }
        .boxed()
    }
}

/// Send `GET <url>` in absolute form to the proxy and return the status code
async fn forward_request(proxy: &Proxy, url: &Url) -> ProbeResult<u16> {
    let host = url
        .host_str()
        .ok_or_else(|| ProbeError::Protocol(format!("target URL has no host: {url}")))?;
    let host_header = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let mut stream = TcpStream::connect((proxy.host.as_str(), proxy.port)).await?;
    let request = format!(
        "GET {url} HTTP/1.1\r\nHost: {host_header}\r\nAccept: */*\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await?;

    let mut line = String::new();
    BufReader::new(stream.take(MAX_STATUS_LINE))
        .read_line(&mut line)
        .await?;
    parse_status_line(&line)
}

/// Extract the status code from `HTTP/1.x NNN reason`
fn parse_status_line(line: &str) -> ProbeResult<u16> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse()
            .map_err(|_| ProbeError::Protocol(format!("bad status code: {code}"))),
        _ if line.is_empty() => Err(ProbeError::Protocol("empty response".to_string())),
        _ => Err(ProbeError::Protocol(format!(
            "bad status line: {}",
            line.trim_end()
        ))),
    }
}

/// First IPv4 address for `host`
pub fn resolve_ipv4(host: &str, port: u16) -> ProbeResult<Ipv4Addr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|_| ProbeError::Resolve(host.to_string()))?
        .find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .ok_or_else(|| ProbeError::Resolve(host.to_string()))
}

/// Blocking connect with the timeout applied to connect, reads and writes
fn connect_blocking(host: &str, port: u16, timeout: Duration) -> ProbeResult<StdTcpStream> {
    let ip = resolve_ipv4(host, port)?;
    let stream = StdTcpStream::connect_timeout(&SocketAddr::from((ip, port)), timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    Ok(stream)
}

/// SOCKS4 CONNECT to `dest:port` with an empty user id.
///
/// Granted when the second reply byte is `0x5A`; a short reply is a refusal.
pub fn socks4_handshake<S: Read + Write>(
    stream: &mut S,
    dest: Ipv4Addr,
    port: u16,
) -> ProbeResult<bool> {
    let mut request = Vec::with_capacity(9);
    request.extend_from_slice(&[SOCKS4_VERSION, SOCKS_CMD_CONNECT]);
    request.extend_from_slice(&port.to_be_bytes());
    request.extend_from_slice(&dest.octets());
    request.push(0x00);
    stream.write_all(&request)?;

    let mut reply = [0u8; 8];
    let n = stream.read(&mut reply)?;
    Ok(n >= 2 && reply[1] == SOCKS4_GRANTED)
}

/// SOCKS5 no-auth greeting followed by a domain-name CONNECT.
///
/// The CONNECT is only sent when the server accepted the no-auth method.
pub fn socks5_handshake<S: Read + Write>(
    stream: &mut S,
    dest_host: &str,
    port: u16,
) -> ProbeResult<bool> {
    let host = dest_host.as_bytes();
    let host_len = u8::try_from(host.len())
        .map_err(|_| ProbeError::Protocol(format!("hostname too long: {dest_host}")))?;

    stream.write_all(&[SOCKS5_VERSION, 0x01, SOCKS5_NO_AUTH])?;
    let mut greeting = [0u8; 2];
    let n = stream.read(&mut greeting)?;
    if n < 2 || greeting[1] == SOCKS5_NO_ACCEPTABLE_METHOD {
        return Ok(false);
    }

    let mut request = Vec::with_capacity(7 + host.len());
    request.extend_from_slice(&[SOCKS5_VERSION, SOCKS_CMD_CONNECT, 0x00, SOCKS5_ATYP_DOMAIN]);
    request.push(host_len);
    request.extend_from_slice(host);
    request.extend_from_slice(&port.to_be_bytes());
    stream.write_all(&request)?;

    let mut reply = [0u8; 10];
    let n = stream.read(&mut reply)?;
    Ok(n >= 2 && reply[1] == SOCKS5_SUCCEEDED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    /// In-memory stream: reads come from `input`, writes are captured
    struct MockStream {
        input: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl MockStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                written: Vec::new(),
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            Read::read(&mut self.input, buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn proxy_at(port: u16) -> Proxy {
        Proxy::new("127.0.0.1".to_string(), port)
    }

    fn fast_config() -> CheckerConfig {
        CheckerConfig::new()
            .with_http_timeout(Duration::from_millis(300))
            .with_socket_timeout(Duration::from_millis(500))
            .with_backoff(Duration::from_millis(250))
            .with_socks_target("127.0.0.1".to_string(), 80)
    }

    /// Mock forward proxy that answers every request with `status` (or never
    /// answers when `None`). Returns its port, an accepted-connection counter
    /// and the first request line it saw.
    async fn spawn_http_proxy(
        status: Option<u16>,
    ) -> (u16, Arc<AtomicUsize>, Arc<tokio::sync::Mutex<Option<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));
        let first_line = Arc::new(tokio::sync::Mutex::new(None));

        let counter = Arc::clone(&accepted);
        let seen = Arc::clone(&first_line);
        tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut reader = BufReader::new(stream);
                let mut line = String::new();
                if reader.read_line(&mut line).await.is_err() {
                    continue;
                }
                seen.lock().await.get_or_insert(line.trim_end().to_string());
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) if header == "\r\n" => break,
                        Ok(_) => {}
                    }
                }
                let mut stream = reader.into_inner();
                match status {
                    Some(code) => {
                        let response = format!(
                            "HTTP/1.1 {code} X\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{{}}"
                        );
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    }
                    None => held.push(stream),
                }
            }
        });

        (port, accepted, first_line)
    }

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(250));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(2));
        // Must not panic on absurd attempt counts.
        let _ = backoff_delay(base, 200);
    }

    #[test]
    fn test_parse_status_line() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK\r\n").unwrap(), 200);
        assert_eq!(parse_status_line("HTTP/1.0 407 Proxy Auth\r\n").unwrap(), 407);
        assert!(parse_status_line("").is_err());
        assert!(parse_status_line("SSH-2.0-OpenSSH\r\n").is_err());
        assert!(parse_status_line("HTTP/1.1 abc\r\n").is_err());
    }

    #[test]
    fn test_rejects_invalid_target_url() {
        let config = CheckerConfig::new().with_https_url("not a url".to_string());
        assert!(NetworkProber::new(config).is_err());
        assert!(NetworkProber::new(CheckerConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_scheme_for_http_target() {
        let config = CheckerConfig::new().with_http_url("https://httpbin.org/ip".to_string());
        assert!(NetworkProber::new(config).is_err());

        let config = CheckerConfig::new().with_http_url("http://example.com:8080/ip".to_string());
        assert!(NetworkProber::new(config).is_ok());
    }

    #[test]
    fn test_socks4_request_bytes_and_grant() {
        let mut stream = MockStream::new(&[0x00, 0x5A, 0, 0, 0, 0, 0, 0]);
        let ok = socks4_handshake(&mut stream, Ipv4Addr::new(1, 2, 3, 4), 80).unwrap();
        assert!(ok);
        assert_eq!(stream.written, vec![0x04, 0x01, 0x00, 0x50, 1, 2, 3, 4, 0x00]);
    }

    #[test]
    fn test_socks4_rejections() {
        for reply in [&[0x00, 0x5B, 0, 0, 0, 0, 0, 0][..], &[0x00][..], &[][..]] {
            let mut stream = MockStream::new(reply);
            let ok = socks4_handshake(&mut stream, Ipv4Addr::LOCALHOST, 80).unwrap();
            assert!(!ok, "reply {reply:?}");
        }
    }

    #[test]
    fn test_socks5_no_acceptable_method_skips_connect() {
        let mut stream = MockStream::new(&[0x05, 0xFF]);
        let ok = socks5_handshake(&mut stream, "httpbin.org", 80).unwrap();
        assert!(!ok);
        assert_eq!(stream.written, vec![0x05, 0x01, 0x00]);
    }

    #[test]
    fn test_socks5_short_greeting_fails() {
        let mut stream = MockStream::new(&[0x05]);
        assert!(!socks5_handshake(&mut stream, "httpbin.org", 80).unwrap());
        assert_eq!(stream.written, vec![0x05, 0x01, 0x00]);
    }

    #[test]
    fn test_socks5_connect_success() {
        let mut stream =
            MockStream::new(&[0x05, 0x00, 0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
        let ok = socks5_handshake(&mut stream, "httpbin.org", 80).unwrap();
        assert!(ok);

        let mut expected = vec![0x05, 0x01, 0x00, 0x05, 0x01, 0x00, 0x03, 11];
        expected.extend_from_slice(b"httpbin.org");
        expected.extend_from_slice(&[0x00, 0x50]);
        assert_eq!(stream.written, expected);
    }

    #[test]
    fn test_socks5_connect_refused() {
        let mut stream =
            MockStream::new(&[0x05, 0x00, 0x05, 0x05, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
        assert!(!socks5_handshake(&mut stream, "httpbin.org", 80).unwrap());
    }

    #[test]
    fn test_socks5_hostname_too_long() {
        let mut stream = MockStream::new(&[0x05, 0x00]);
        let host = "a".repeat(256);
        assert!(matches!(
            socks5_handshake(&mut stream, &host, 80),
            Err(ProbeError::Protocol(_))
        ));
    }

    #[test]
    fn test_resolve_ipv4_literal() {
        assert_eq!(resolve_ipv4("127.0.0.1", 80).unwrap(), Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    async fn test_socks4_unresolvable_target_skips_connect() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = fast_config().with_socks_target("nonexistent.invalid".to_string(), 80);
        let prober = NetworkProber::new(config).unwrap();

        assert!(matches!(
            prober.check(&proxy_at(port), ProxyType::Socks4).await,
            Err(ProbeError::Resolve(_))
        ));
        let pending = listener.accept();
        assert!(
            matches!(&pending, Err(e) if e.kind() == io::ErrorKind::WouldBlock),
            "candidate was contacted: {pending:?}"
        );
    }

    #[tokio::test]
    async fn test_socks4_over_network() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 9];
            stream.read_exact(&mut request).unwrap();
            stream.write_all(&[0x00, 0x5A, 0, 0, 0, 0, 0, 0]).unwrap();
        });

        let prober = NetworkProber::new(fast_config()).unwrap();
        assert!(prober.probe(&proxy_at(port), ProxyType::Socks4).await);
    }

    #[tokio::test]
    async fn test_socks5_over_network_rejects_auth() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut greeting = [0u8; 3];
            stream.read_exact(&mut greeting).unwrap();
            stream.write_all(&[0x05, 0xFF]).unwrap();
        });

        let prober = NetworkProber::new(fast_config()).unwrap();
        assert!(!prober.probe(&proxy_at(port), ProxyType::Socks5).await);
    }

    #[tokio::test]
    async fn test_socks_connection_refused() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let prober = NetworkProber::new(fast_config()).unwrap();
        assert!(matches!(
            prober.check(&proxy_at(port), ProxyType::Socks5).await,
            Err(ProbeError::Io(_))
        ));
        assert!(!prober.probe(&proxy_at(port), ProxyType::Socks4).await);
    }

    #[tokio::test]
    async fn test_http_probe_success() {
        let (port, accepted, first_line) = spawn_http_proxy(Some(200)).await;
        let prober = NetworkProber::new(fast_config()).unwrap();

        let elapsed = prober.http_check(&proxy_at(port)).await.unwrap();

        assert!(elapsed.is_some());
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
        let line = first_line.lock().await.clone().unwrap();
        assert_eq!(line, "GET http://httpbin.org/ip HTTP/1.1");
    }

    #[tokio::test]
    async fn test_http_probe_non_200_is_not_retried() {
        let (port, accepted, _) = spawn_http_proxy(Some(403)).await;
        let prober = NetworkProber::new(fast_config()).unwrap();

        assert!(!prober.probe(&proxy_at(port), ProxyType::Http).await);
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_http_probe_timeout_retries_once_with_backoff() {
        let (port, accepted, _) = spawn_http_proxy(None).await;
        let prober = NetworkProber::new(fast_config()).unwrap();

        let start = Instant::now();
        let ok = prober.probe(&proxy_at(port), ProxyType::Http).await;
        let elapsed = start.elapsed();

        assert!(!ok);
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
        // Two timed-out attempts plus the 250ms backoff between them.
        assert!(elapsed >= Duration::from_millis(850), "elapsed {elapsed:?}");
    }

    // The HTTPS probe deliberately forwards the https:// URL in the clear
    // instead of opening a CONNECT tunnel.
    #[tokio::test]
    async fn test_https_probe_forwards_without_connect() {
        let (port, accepted, first_line) = spawn_http_proxy(Some(200)).await;
        let prober = NetworkProber::new(fast_config()).unwrap();

        assert!(prober.probe(&proxy_at(port), ProxyType::Https).await);
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
        let line = first_line.lock().await.clone().unwrap();
        assert_eq!(line, "GET https://httpbin.org/ip HTTP/1.1");
    }

    #[tokio::test]
    async fn test_https_probe_non_200_is_not_retried() {
        let (port, accepted, _) = spawn_http_proxy(Some(403)).await;
        let prober = NetworkProber::new(fast_config()).unwrap();

        assert_eq!(prober.https_check(&proxy_at(port)).await.unwrap(), None);
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_https_probe_timeout_retries_once() {
        let (port, accepted, _) = spawn_http_proxy(None).await;
        let prober = NetworkProber::new(fast_config()).unwrap();

        let start = Instant::now();
        assert!(prober.https_check(&proxy_at(port)).await.is_err());
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_millis(850));
    }
}
