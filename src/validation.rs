//! Centralized validation functions for hostagg.
//!
//! This module provides unified validation for:
//! - Hostnames extracted from hosts files
//! - Source URLs and categories
//! - Output file names

use anyhow::{bail, Result};
use reqwest::Url;
use std::net::IpAddr;

/// Maximum length of a fully qualified hostname (RFC 1035).
pub const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single DNS label.
pub const MAX_LABEL_LEN: usize = 63;

/// Names that hosts-file headers map to loopback addresses. They are never
/// blocklist entries even when they look like hostnames.
pub const SYSTEM_HOSTNAMES: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "local",
    "broadcasthost",
    "ip6-localhost",
    "ip6-loopback",
    "ip6-localnet",
    "ip6-mcastprefix",
    "ip6-allnodes",
    "ip6-allrouters",
    "ip6-allhosts",
    "0.0.0.0",
];

/// Check whether an already lower-cased token is a plausible hostname.
///
/// Accepted: ASCII, at most 253 characters, at least two labels, every label
/// 1-63 characters of `[a-z0-9-]` that neither starts nor ends with `-`.
/// IP literals are rejected. Internationalized names are only accepted in
/// their `xn--` form.
///
/// # Examples
/// ```
/// use hostagg::validation::is_plausible_hostname;
/// assert!(is_plausible_hostname("ads.example.com"));
/// assert!(is_plausible_hostname("xn--bcher-kva.example"));
/// assert!(!is_plausible_hostname("localhost"));
/// assert!(!is_plausible_hostname("10.0.0.1"));
/// assert!(!is_plausible_hostname("bad_name.example"));
/// ```
pub fn is_plausible_hostname(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_HOSTNAME_LEN || !name.contains('.') {
        return false;
    }

    if name.parse::<IpAddr>().is_ok() {
        return false;
    }

    name.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Check whether a hostname is one of the reserved hosts-file system names.
pub fn is_system_hostname(name: &str) -> bool {
    SYSTEM_HOSTNAMES
        .iter()
        .any(|system| system.eq_ignore_ascii_case(name))
}

/// Validate a source URL: must parse and use `http` or `https`.
///
/// # Examples
/// ```
/// use hostagg::validation::validate_source_url;
/// assert!(validate_source_url("https://example.com/hosts").is_ok());
/// assert!(validate_source_url("ftp://example.com/hosts").is_err());
/// ```
pub fn validate_source_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "Source URL '{}' must use http or https (got '{}')",
            url,
            parsed.scheme()
        );
    }

    if parsed.host_str().is_none() {
        bail!("Source URL '{}' has no host", url);
    }

    Ok(parsed)
}

/// Validate a category label.
///
/// Categories end up in CSV cells and log lines, so empty values and control
/// characters are rejected.
pub fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        bail!("Category cannot be empty");
    }
    if category.chars().any(char::is_control) {
        bail!(
            "Category '{}' contains control characters",
            category.escape_debug()
        );
    }
    Ok(())
}

/// Validate a bare file stem used for output names (`host_entries`, `latest`).
pub fn validate_file_stem(stem: &str) -> Result<()> {
    if stem.is_empty() {
        bail!("File name cannot be empty");
    }
    if stem == "." || stem == ".." {
        bail!("Invalid file name '{}'", stem);
    }
    if !stem
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
    {
        bail!(
            "Invalid file name '{}'. Only ASCII letters, digits, '-', '_' and '.' are allowed",
            stem
        );
    }
    Ok(())
}
