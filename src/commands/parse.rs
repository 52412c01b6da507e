//! Parse command implementation.

use anyhow::{Context, Result};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::parser::parse_hosts;

/// Print the hostnames a local hosts file yields
pub fn run(file: &Path, count_only: bool) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    let text = String::from_utf8_lossy(&bytes);

    if count_only {
        println!("{}", parse_hosts(&text).count());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for host in parse_hosts(&text) {
        writeln!(out, "{}", host)?;
    }
    out.flush()?;

    Ok(())
}
