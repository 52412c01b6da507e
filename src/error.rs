//! Error types for hostagg.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single source could not be fetched.
///
/// These never abort a run: the pipeline records them and moves on to the
/// next source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("Response too large: {size} bytes (max: {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// Short machine-readable label used in run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Connection(_) => "connection",
            FetchError::Http { .. } => "http",
            FetchError::TooLarge { .. } => "too_large",
            FetchError::Body(_) => "body",
        }
    }
}

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum HostaggError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize dataset as {format}: {message}")]
    Serialize { format: String, message: String },

    #[error("No entries were collected from any source")]
    NoEntries,

    #[error("Another run is already writing to {0:?}")]
    Locked(PathBuf),
}

impl HostaggError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HostaggError::Write {
            path: path.into(),
            source,
        }
    }
}
