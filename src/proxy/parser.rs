//! Proxy list normalizer
//!
//! Turns raw proxy list text into an ordered, de-duplicated list of
//! `host:port` endpoints. Scheme prefixes are stripped and otherwise ignored.

use crate::proxy::models::Proxy;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Matches the scheme prefixes accepted in front of an endpoint
static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?|socks[45])://").expect("Invalid scheme regex")
});

/// Result of normalizing a proxy list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedList {
    /// Unique endpoints in first-seen order
    pub proxies: Vec<Proxy>,
    /// Physical lines in the source
    pub total_lines: usize,
    /// Blank, comment and malformed lines
    pub skipped: usize,
    /// Well-formed lines dropped because the endpoint was already listed
    pub duplicates_removed: usize,
}

impl ParsedList {
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

/// Proxy parser for parsing proxies from strings and files
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single proxy line
    ///
    /// Supports formats:
    /// - HOST:PORT
    /// - scheme://HOST:PORT (scheme one of http, https, socks4, socks5)
    ///
    /// Returns `None` for blank lines, comments and anything without a
    /// numeric port.
    pub fn parse_line(line: &str) -> Option<Proxy> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let rest = match SCHEME_REGEX.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let (host, port) = rest.split_once(':')?;
        if host.is_empty() {
            return None;
        }
        let port: u16 = port.parse().ok()?;

        Some(Proxy::new(host.to_string(), port))
    }

    /// Parse proxies from a string (multiple lines), de-duplicating by
    /// `host:port` and keeping the first occurrence
    pub fn parse_string(content: &str) -> ParsedList {
        Self::parse_lines(content.lines())
    }

    /// Parse proxies from an iterator of lines
    pub fn parse_lines<'a, I>(lines: I) -> ParsedList
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut list = ParsedList::default();
        let mut seen = HashSet::new();

        for line in lines {
            list.total_lines += 1;
            match Self::parse_line(line) {
                Some(proxy) => {
                    if seen.insert(proxy.to_simple_string()) {
                        list.proxies.push(proxy);
                    } else {
                        list.duplicates_removed += 1;
                    }
                }
                None => list.skipped += 1,
            }
        }

        list
    }

    /// Parse proxies from a file. Invalid UTF-8 is replaced rather than
    /// rejected so a single bad byte does not discard the whole list.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedList> {
        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(Self::parse_string(&content))
    }

    /// Save proxies to a file, one HOST:PORT per line
    pub fn save_to_file<P: AsRef<Path>>(proxies: &[Proxy], path: P) -> Result<()> {
        let content: String = proxies
            .iter()
            .map(|p| p.to_simple_string())
            .collect::<Vec<_>>()
            .join("\n");

        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &ParsedList) -> Vec<String> {
        list.proxies.iter().map(|p| p.to_simple_string()).collect()
    }

    #[test]
    fn test_parse_simple_format() {
        let proxy = ProxyParser::parse_line("192.168.1.1:8080").unwrap();
        assert_eq!(proxy.host, "192.168.1.1");
        assert_eq!(proxy.port, 8080);
    }

    #[test]
    fn test_parse_strips_scheme() {
        for line in [
            "http://192.168.1.1:8080",
            "https://192.168.1.1:8080",
            "socks4://192.168.1.1:8080",
            "SOCKS5://192.168.1.1:8080/",
        ] {
            let proxy = ProxyParser::parse_line(line).unwrap();
            assert_eq!(proxy.to_simple_string(), "192.168.1.1:8080", "{line}");
        }
    }

    #[test]
    fn test_parse_hostname() {
        let proxy = ProxyParser::parse_line("  proxy.example.com:3128  ").unwrap();
        assert_eq!(proxy.host, "proxy.example.com");
        assert_eq!(proxy.port, 3128);
    }

    #[test]
    fn test_parse_empty_and_comment_lines() {
        assert!(ProxyParser::parse_line("").is_none());
        assert!(ProxyParser::parse_line("   ").is_none());
        assert!(ProxyParser::parse_line("# This is a comment").is_none());
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(ProxyParser::parse_line("nota proxy").is_none());
        assert!(ProxyParser::parse_line("1.2.3.4").is_none());
        assert!(ProxyParser::parse_line("1.2.3.4:abc").is_none());
        assert!(ProxyParser::parse_line("1.2.3.4:70000").is_none());
        assert!(ProxyParser::parse_line(":8080").is_none());
        assert!(ProxyParser::parse_line("1.2.3.4:8080:user:pass").is_none());
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let list = ProxyParser::parse_lines(["1.1.1.1:80", "1.1.1.1:80", "2.2.2.2:81"]);
        assert_eq!(keys(&list), vec!["1.1.1.1:80", "2.2.2.2:81"]);
        assert_eq!(list.duplicates_removed, 1);
        assert_eq!(list.total_lines, 3);
        assert_eq!(list.skipped, 0);
    }

    #[test]
    fn test_scheme_variants_are_duplicates() {
        let list = ProxyParser::parse_string("socks5://9.9.9.9:1080\n9.9.9.9:1080\nhttp://9.9.9.9:1080");
        assert_eq!(keys(&list), vec!["9.9.9.9:1080"]);
        assert_eq!(list.duplicates_removed, 2);
    }

    #[test]
    fn test_malformed_lines_not_counted_as_duplicates() {
        let content = r#"
# HTTP Proxies
nota proxy
1.2.3.4
1.2.3.4:abc
3.3.3.3:3128
3.3.3.3:3128
"#;
        let list = ProxyParser::parse_string(content);
        assert_eq!(keys(&list), vec!["3.3.3.3:3128"]);
        assert_eq!(list.duplicates_removed, 1);
        assert_eq!(list.skipped, 5);
        assert_eq!(list.total_lines, 7);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxies.txt");
        let list = ProxyParser::parse_string("5.5.5.5:80\n6.6.6.6:8080");

        ProxyParser::save_to_file(&list.proxies, &path).unwrap();
        let reloaded = ProxyParser::parse_file(&path).unwrap();

        assert_eq!(reloaded.proxies, list.proxies);
    }
}
