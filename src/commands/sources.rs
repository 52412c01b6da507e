//! Sources command implementation.

use anyhow::Result;
use std::path::Path;

use crate::config::{Config, Source};
use crate::utils::truncate;

/// List the effective sources in precedence order
pub fn run(overrides: &[String], config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    let sources = overrides
        .iter()
        .map(|s| Source::parse_override(s))
        .collect::<Result<Vec<_>>>()?;
    config.override_sources(sources);
    config.validate()?;

    println!();
    println!(" #  CATEGORY             URL");
    println!(" ── ──────────────────── ──────────────────────────────────────────");
    for (i, source) in config.sources.iter().enumerate() {
        println!(
            " {:<2} {:<20} {}",
            i + 1,
            truncate(&source.category, 20),
            source.url
        );
    }
    println!();
    println!(" Earlier sources win when a hostname appears in several lists.");
    println!();

    Ok(())
}
