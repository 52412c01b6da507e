//! Hosts-file line parser.
//!
//! Turns the raw text of one source into normalized hostnames. Lines follow
//! the conventional hosts-file shape `<address> <hostname> [# comment]`; the
//! address column is optional and must be a sink or loopback address. Anything that does not yield a plausible
//! hostname is skipped silently.

use std::net::IpAddr;
use std::str::Lines;

use crate::validation::{is_plausible_hostname, is_system_hostname};

/// Lazy iterator over the hostnames of one hosts file.
///
/// Cloning the iterator (or calling [`parse_hosts`] again) restarts parsing
/// from wherever the clone was taken.
#[derive(Debug, Clone)]
pub struct HostnameIter<'a> {
    lines: Lines<'a>,
}

impl<'a> Iterator for HostnameIter<'a> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.by_ref().find_map(parse_line)
    }
}

/// Parse hosts-file text into normalized hostnames, in file order.
///
/// # Examples
/// ```
/// use hostagg::parser::parse_hosts;
/// let text = "# header\n0.0.0.0 Ads.Example.com # tracker\n127.0.0.1 localhost\n";
/// let hosts: Vec<String> = parse_hosts(text).collect();
/// assert_eq!(hosts, vec!["ads.example.com"]);
/// ```
pub fn parse_hosts(text: &str) -> HostnameIter<'_> {
    HostnameIter {
        lines: text.lines(),
    }
}

/// Parse a single line, returning the lower-cased hostname if the line
/// carries one.
pub fn parse_line(line: &str) -> Option<String> {
    let line = line.trim_start_matches('\u{feff}').trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let content = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    };

    let mut tokens = content.split_whitespace();
    let first = tokens.next()?;
    let host = if is_sink_address(first) {
        tokens.next()?
    } else {
        first
    };

    let host = host.to_ascii_lowercase();
    if is_system_hostname(&host) || !is_plausible_hostname(&host) {
        return None;
    }

    Some(host)
}

/// Whether `token` is an address blocklists point hostnames at: the
/// unspecified address or loopback (`0.0.0.0`, `127.0.0.0/8`, `::`, `::1`).
///
/// Any other address maps a hostname somewhere real, so it is left in place
/// and the line fails the hostname check.
fn is_sink_address(token: &str) -> bool {
    match token.parse::<IpAddr>() {
        Ok(addr) => addr.is_unspecified() || addr.is_loopback(),
        Err(_) => false,
    }
}
