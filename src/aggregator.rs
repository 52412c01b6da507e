//! Cross-source deduplication.
//!
//! Sources are folded in registry order. The first source to produce a
//! hostname owns it; later sources producing the same hostname are counted
//! as duplicates and leave the existing record untouched.

use std::collections::HashSet;
use tracing::debug;

use crate::config::Source;
use crate::record::{AggregatedRecord, RecordBuilder};

/// A hostname bound to the category of the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameCandidate {
    pub hostname: String,
    pub source_category: String,
}

/// Per-source counts from one [`Aggregator::add_source`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceTally {
    /// Hostnames the parser yielded
    pub parsed: usize,
    /// Hostnames new to the dataset
    pub added: usize,
    /// Hostnames already owned by an earlier source (or earlier in this one)
    pub duplicates: usize,
}

/// First-seen-wins accumulator.
#[derive(Debug, Default)]
pub struct Aggregator {
    seen: HashSet<String>,
    entries: Vec<HostnameCandidate>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one source's hostnames into the set.
    pub fn add_source<I>(&mut self, category: &str, hostnames: I) -> SourceTally
    where
        I: IntoIterator<Item = String>,
    {
        let mut tally = SourceTally::default();

        for hostname in hostnames {
            tally.parsed += 1;
            if self.seen.contains(&hostname) {
                debug!("Duplicate entry {} ({})", hostname, category);
                tally.duplicates += 1;
                continue;
            }
            self.seen.insert(hostname.clone());
            self.entries.push(HostnameCandidate {
                hostname,
                source_category: category.to_string(),
            });
            tally.added += 1;
        }

        tally
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand every unique hostname into a full record, keeping first-seen order.
    pub fn into_dataset(self, builder: &RecordBuilder) -> Dataset {
        let records = self
            .entries
            .into_iter()
            .map(|c| builder.build(c.hostname, &c.source_category))
            .collect();
        Dataset { records }
    }
}

/// Aggregate already-parsed sources in one call.
///
/// `None` stands for a source that could not be fetched; it contributes
/// nothing and does not affect the others.
pub fn aggregate<'a, I, H>(sources: I, builder: &RecordBuilder) -> Dataset
where
    I: IntoIterator<Item = (&'a Source, Option<H>)>,
    H: IntoIterator<Item = String>,
{
    let mut aggregator = Aggregator::new();
    for (source, hostnames) in sources {
        if let Some(hostnames) = hostnames {
            aggregator.add_source(&source.category, hostnames);
        }
    }
    aggregator.into_dataset(builder)
}

/// The deduplicated records of one run, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<AggregatedRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[AggregatedRecord] {
        &self.records
    }

    /// Number of records per category, in order of first appearance.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for record in &self.records {
            match counts.iter_mut().find(|(c, _)| *c == record.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((record.category.clone(), 1)),
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a AggregatedRecord;
    type IntoIter = std::slice::Iter<'a, AggregatedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
