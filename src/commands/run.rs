//! Run command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tracing::info;

use crate::cli::RunArgs;
use crate::config::{Config, Source};
use crate::fetcher::Fetcher;
use crate::pipeline;

/// Build the effective configuration from the file and command-line overrides
pub fn effective_config(args: &RunArgs, config_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::load_or_default(config_path)?;

    let sources = args
        .sources
        .iter()
        .map(|s| Source::parse_override(s))
        .collect::<Result<Vec<_>>>()?;
    if !sources.is_empty() {
        info!("Using {} sources from the command line", sources.len());
    }
    config.override_sources(sources);
    config.override_formats(&args.formats);
    if let Some(ref dir) = args.output_dir {
        config.output_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Run the run command
pub async fn run(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let config = effective_config(&args, config_path)?;
    let fetcher = Fetcher::new(&config)?;

    let summary = pipeline::run(&config, &fetcher, Utc::now())
        .await
        .context("Host aggregation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render());
    }

    Ok(())
}
