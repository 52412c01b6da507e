//! Dataset serialization with all-or-nothing file visibility.
//!
//! Every artifact is written and synced to a temporary file inside the output
//! directory first. Only when all of them succeeded are they renamed into
//! place: timestamped snapshots first, then the `latest` aliases.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::aggregator::Dataset;
use crate::config::{Config, OutputFormat};
use crate::error::HostaggError;
use crate::record::COLUMNS;
use crate::utils::format_count;

/// Timestamp layout used in snapshot names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Collision suffixes tried before giving up on a snapshot stem.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Paths produced for one output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    pub format: OutputFormat,
    pub snapshot: PathBuf,
    pub latest: PathBuf,
}

/// Writes a dataset as a timestamped snapshot plus a `latest` alias.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    output_dir: PathBuf,
    file_prefix: String,
    latest_name: String,
    formats: Vec<OutputFormat>,
}

struct Staged {
    format: OutputFormat,
    snapshot: NamedTempFile,
    latest: NamedTempFile,
}

/// Renames already done by one write, undone if a later one fails.
#[derive(Default)]
struct Published {
    snapshots: Vec<PathBuf>,
    /// Each replaced alias with a copy of what it held before, if anything
    aliases: Vec<(PathBuf, Option<NamedTempFile>)>,
}

impl Published {
    fn rollback(self) {
        for path in self.snapshots.into_iter().rev() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to remove {:?} during rollback: {}", path, e);
            }
        }
        for (path, previous) in self.aliases.into_iter().rev() {
            let restored = match previous {
                Some(backup) => backup.persist(&path).map(|_| ()).map_err(|e| e.error),
                None => std::fs::remove_file(&path),
            };
            if let Err(e) = restored {
                warn!("Failed to restore {:?} during rollback: {}", path, e);
            }
        }
    }
}

impl DatasetWriter {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        file_prefix: impl Into<String>,
        latest_name: impl Into<String>,
        formats: Vec<OutputFormat>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
            latest_name: latest_name.into(),
            formats,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.output_dir.clone(),
            config.file_prefix.clone(),
            config.latest_name.clone(),
            config.formats.clone(),
        )
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every configured format.
    ///
    /// Either every snapshot and alias of this run becomes visible or none
    /// does: a failed rename removes the snapshots already renamed and puts
    /// the previous aliases back.
    pub fn write(
        &self,
        dataset: &Dataset,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<WrittenArtifact>, HostaggError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| HostaggError::write(&self.output_dir, e))?;

        for format in &self.formats {
            let alias = self.latest_path(*format);
            if alias.is_dir() {
                return Err(HostaggError::write(
                    alias,
                    io::Error::new(io::ErrorKind::Other, "alias path is a directory"),
                ));
            }
        }

        let mut staged = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let bytes = encode(dataset, *format)?;
            staged.push(Staged {
                format: *format,
                snapshot: self.stage(&bytes)?,
                latest: self.stage(&bytes)?,
            });
            debug!("Staged {} ({} bytes)", format, bytes.len());
        }

        let stem = self.free_stem(timestamp)?;
        let mut published = Published::default();
        match self.publish(staged, &stem, &mut published) {
            Ok(written) => {
                info!(
                    "Wrote {} entries as {}",
                    format_count(dataset.len()),
                    stem
                );
                Ok(written)
            }
            Err(e) => {
                published.rollback();
                Err(e)
            }
        }
    }

    fn latest_path(&self, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.latest_name, format.extension()))
    }

    fn stage(&self, bytes: &[u8]) -> Result<NamedTempFile, HostaggError> {
        let mut temp = NamedTempFile::new_in(&self.output_dir)
            .map_err(|e| HostaggError::write(&self.output_dir, e))?;
        let path = temp.path().to_path_buf();
        temp.write_all(bytes)
            .and_then(|_| temp.flush())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| HostaggError::write(path, e))?;
        Ok(temp)
    }

    /// First `<stem>[_n]` free for every configured format, so all snapshots
    /// of one run share a name.
    fn free_stem(&self, timestamp: DateTime<Utc>) -> Result<String, HostaggError> {
        let base = snapshot_stem(&self.file_prefix, timestamp);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let stem = if attempt == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, attempt)
            };
            let taken = self.formats.iter().any(|format| {
                self.output_dir
                    .join(format!("{}.{}", stem, format.extension()))
                    .symlink_metadata()
                    .is_ok()
            });
            if !taken {
                return Ok(stem);
            }
            debug!("Snapshot name {} already taken, trying next", stem);
        }

        Err(HostaggError::write(
            self.output_dir.join(base),
            io::Error::new(io::ErrorKind::AlreadyExists, "no free snapshot name"),
        ))
    }

    /// Rename snapshots (never overwriting) and then aliases into place,
    /// recording each rename in `published`.
    fn publish(
        &self,
        staged: Vec<Staged>,
        stem: &str,
        published: &mut Published,
    ) -> Result<Vec<WrittenArtifact>, HostaggError> {
        let mut pending = Vec::with_capacity(staged.len());
        for item in staged {
            let snapshot = self
                .output_dir
                .join(format!("{}.{}", stem, item.format.extension()));
            item.snapshot
                .persist_noclobber(&snapshot)
                .map_err(|e| HostaggError::write(&snapshot, e.error))?;
            published.snapshots.push(snapshot.clone());
            pending.push((item.format, snapshot, item.latest));
        }

        let mut written = Vec::with_capacity(pending.len());
        for (format, snapshot, latest_tmp) in pending {
            let latest = self.latest_path(format);
            let previous = self.backup(&latest)?;
            latest_tmp
                .persist(&latest)
                .map_err(|e| HostaggError::write(&latest, e.error))?;
            published.aliases.push((latest.clone(), previous));

            debug!("Published {:?} and {:?}", snapshot, latest);
            written.push(WrittenArtifact {
                format,
                snapshot,
                latest,
            });
        }

        Ok(written)
    }

    /// Copy an existing alias aside so a failed run can put it back.
    fn backup(&self, alias: &Path) -> Result<Option<NamedTempFile>, HostaggError> {
        if !alias.exists() {
            return Ok(None);
        }
        let backup = NamedTempFile::new_in(&self.output_dir)
            .map_err(|e| HostaggError::write(&self.output_dir, e))?;
        std::fs::copy(alias, backup.path()).map_err(|e| HostaggError::write(alias, e))?;
        Ok(Some(backup))
    }
}

/// `<prefix>_<YYYYmmdd_HHMMSS>`
pub fn snapshot_stem(prefix: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}_{}", prefix, timestamp.format(TIMESTAMP_FORMAT))
}

/// Serialize the dataset in one format.
pub fn encode(dataset: &Dataset, format: OutputFormat) -> Result<Vec<u8>, HostaggError> {
    let serialize_err = |message: String| HostaggError::Serialize {
        format: format.to_string(),
        message,
    };

    match format {
        OutputFormat::Csv => encode_csv(dataset).map_err(|e| serialize_err(e.to_string())),
        OutputFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(dataset.records())
                .map_err(|e| serialize_err(e.to_string()))?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        OutputFormat::Yaml => serde_yaml::to_string(dataset.records())
            .map(String::into_bytes)
            .map_err(|e| serialize_err(e.to_string())),
    }
}

fn encode_csv(dataset: &Dataset) -> Result<Vec<u8>, csv::Error> {
    // Header written by hand so an empty dataset still gets one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for record in dataset {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
