//! Run summary and its display.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::{Dataset, SourceTally};
use crate::config::Source;
use crate::error::FetchError;
use crate::utils::{format_count, truncate};
use crate::writer::WrittenArtifact;

/// Outcome of one source
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Ok,
    Failed,
}

/// Statistics for a single source
#[derive(Debug, Clone, Serialize)]
pub struct SourceStats {
    pub url: String,
    pub category: String,
    pub status: SourceStatus,
    pub parsed: usize,
    pub added: usize,
    pub duplicates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceStats {
    pub fn fetched(source: &Source, tally: SourceTally) -> Self {
        Self {
            url: source.url.clone(),
            category: source.category.clone(),
            status: SourceStatus::Ok,
            parsed: tally.parsed,
            added: tally.added,
            duplicates: tally.duplicates,
            error_kind: None,
            error: None,
        }
    }

    pub fn failed(source: &Source, error: &FetchError) -> Self {
        Self {
            url: source.url.clone(),
            category: source.category.clone(),
            status: SourceStatus::Failed,
            parsed: 0,
            added: 0,
            duplicates: 0,
            error_kind: Some(error.kind()),
            error: Some(error.to_string()),
        }
    }
}

/// Records per category in the final dataset
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub entries: usize,
}

/// Everything a caller needs to know about a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<SourceStats>,
    pub total_parsed: usize,
    pub unique_entries: usize,
    pub categories: Vec<CategoryCount>,
    pub files: Vec<WrittenArtifact>,
}

impl RunSummary {
    pub fn new(
        timestamp: DateTime<Utc>,
        sources: Vec<SourceStats>,
        dataset: &Dataset,
        files: Vec<WrittenArtifact>,
    ) -> Self {
        let total_parsed = sources.iter().map(|s| s.parsed).sum();
        let categories = dataset
            .category_counts()
            .into_iter()
            .map(|(category, entries)| CategoryCount { category, entries })
            .collect();

        Self {
            timestamp,
            sources,
            total_parsed,
            unique_entries: dataset.len(),
            categories,
            files,
        }
    }

    pub fn failed_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| s.status == SourceStatus::Failed)
            .count()
    }

    /// Human-readable table
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "══════════════════════════════════════════════════════════════════";

        out.push_str(rule);
        out.push('\n');
        out.push_str(" HOST AGGREGATION SUMMARY\n");
        out.push_str(rule);
        out.push_str("\n\n");

        out.push_str(" CATEGORY             STATUS     PARSED      ADDED   DUPLICATE\n");
        out.push_str(" ──────────────────── ──────── ────────── ────────── ──────────\n");
        for source in &self.sources {
            let status = match source.status {
                SourceStatus::Ok => "ok",
                SourceStatus::Failed => "FAILED",
            };
            out.push_str(&format!(
                " {:<20} {:<8} {:>10} {:>10} {:>10}\n",
                truncate(&source.category, 20),
                status,
                format_count(source.parsed),
                format_count(source.added),
                format_count(source.duplicates),
            ));
        }
        out.push_str(" ──────────────────── ──────── ────────── ────────── ──────────\n");
        out.push_str(&format!(
            " {:<20} {:<8} {:>10} {:>10}\n",
            "TOTAL",
            "",
            format_count(self.total_parsed),
            format_count(self.unique_entries),
        ));

        let failures: Vec<&SourceStats> = self
            .sources
            .iter()
            .filter(|s| s.status == SourceStatus::Failed)
            .collect();
        if !failures.is_empty() {
            out.push_str("\n Failed sources:\n");
            for source in failures {
                out.push_str(&format!(
                    "   - {}: {}\n",
                    source.url,
                    source.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        if !self.files.is_empty() {
            out.push_str("\n Output files:\n");
            for file in &self.files {
                out.push_str(&format!("   {}\n", file.snapshot.display()));
                out.push_str(&format!("   {}\n", file.latest.display()));
            }
        }

        out.push_str(rule);
        out.push('\n');
        out
    }
}
