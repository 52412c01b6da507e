//! # hostagg - Hosts-file Blocklist Aggregator
//!
//! Fetches domain blocklists published in hosts-file format, merges them
//! into one deduplicated dataset and writes it as a timestamped snapshot
//! plus a stable `latest` alias. Meant to be run on a schedule.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        hostagg                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: run, sources, parse, config, version       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Source registry in precedence order                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── One attempt per source, bounded timeout and size     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Parser                                                     │
//! │    └── Hosts-file lines -> normalized hostnames             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator + RecordBuilder                                 │
//! │    └── First-seen-wins deduplication across sources         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Writer (csv, serde_json, serde_yaml, tempfile)             │
//! │    └── Snapshot + latest alias, staged then renamed         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use hostagg::config::Config;
//! use hostagg::fetcher::Fetcher;
//! use hostagg::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("hostagg.yaml")?;
//!     let fetcher = Fetcher::new(&config)?;
//!
//!     let summary = pipeline::run(&config, &fetcher, chrono::Utc::now()).await?;
//!     println!("{} unique entries", summary.unique_entries);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - First-seen-wins deduplication and the [`aggregator::Dataset`]
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Error types
//! - [`fetcher`] - HTTP client for downloading hosts files
//! - [`lock`] - File locking against overlapping runs
//! - [`parser`] - Hosts-file line parser
//! - [`pipeline`] - One end-to-end run
//! - [`record`] - Output rows and the record builder
//! - [`stats`] - Run summary
//! - [`utils`] - Formatting helpers
//! - [`validation`] - Hostname, URL and file-name checks
//! - [`writer`] - CSV/JSON/YAML artifacts with atomic visibility

pub mod aggregator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod lock;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod stats;
pub mod utils;
pub mod validation;
pub mod writer;

pub use aggregator::Dataset;
pub use config::{Config, Source};
pub use error::{FetchError, HostaggError};
pub use record::AggregatedRecord;
