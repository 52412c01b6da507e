//! One aggregation run: fetch, parse, deduplicate, build, write.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::aggregator::{Aggregator, Dataset};
use crate::config::Config;
use crate::error::HostaggError;
use crate::fetcher::Fetcher;
use crate::lock::LockGuard;
use crate::parser::parse_hosts;
use crate::record::RecordBuilder;
use crate::stats::{RunSummary, SourceStats};
use crate::utils::format_count;
use crate::writer::DatasetWriter;

/// Fetch and fold every source in registry order.
///
/// Fetch failures are logged and reported in the returned stats; they never
/// stop the remaining sources.
pub async fn collect(config: &Config, fetcher: &Fetcher) -> (Dataset, Vec<SourceStats>) {
    let mut aggregator = Aggregator::new();
    let mut stats = Vec::with_capacity(config.sources.len());

    for source in &config.sources {
        let doc = fetcher.fetch(source).await;
        match doc.text {
            Ok(text) => {
                let tally = aggregator.add_source(&source.category, parse_hosts(&text));
                info!(
                    "Parsed {} entries from {} ({} new, {} duplicates)",
                    format_count(tally.parsed),
                    source.category,
                    format_count(tally.added),
                    format_count(tally.duplicates)
                );
                stats.push(SourceStats::fetched(source, tally));
            }
            Err(e) => {
                stats.push(SourceStats::failed(source, &e));
            }
        }
    }

    let dataset = aggregator.into_dataset(&RecordBuilder::new(config.records.clone()));
    (dataset, stats)
}

/// Run the whole pipeline and write the artifacts.
///
/// Either every artifact is written or the run fails; an empty dataset is
/// treated as a failure so a run where all sources broke never replaces the
/// `latest` alias.
pub async fn run(
    config: &Config,
    fetcher: &Fetcher,
    timestamp: DateTime<Utc>,
) -> Result<RunSummary, HostaggError> {
    let _lock = LockGuard::acquire(&config.output_dir)?;

    info!(
        "Starting host aggregation with {} sources",
        config.sources.len()
    );

    let (dataset, stats) = collect(config, fetcher).await;

    let failed = stats.iter().filter(|s| s.error.is_some()).count();
    if failed > 0 {
        warn!("{} of {} sources failed", failed, stats.len());
    }

    if dataset.is_empty() {
        error!("No entries were processed");
        return Err(HostaggError::NoEntries);
    }

    let files = DatasetWriter::from_config(config).write(&dataset, timestamp)?;
    let summary = RunSummary::new(timestamp, stats, &dataset, files);

    info!(
        "Host aggregation completed: {} parsed, {} unique",
        format_count(summary.total_parsed),
        format_count(summary.unique_entries)
    );

    Ok(summary)
}
