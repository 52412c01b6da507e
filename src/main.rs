//! hostagg - Hosts-file blocklist aggregator
//!
//! Fetches several hosts files, deduplicates them and writes one dataset.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use hostagg::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // Logs go to stderr so `run --json` output stays machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => hostagg::commands::run::run(args, config_path).await,
        Commands::Sources { sources } => hostagg::commands::sources::run(&sources, config_path),
        Commands::Parse { file, count } => hostagg::commands::parse::run(&file, count),
        Commands::Config => hostagg::commands::config::run(),
        Commands::Version => {
            println!("hostagg {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
