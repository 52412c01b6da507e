//! Configuration management for hostagg.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::HostaggError;
use crate::record::RecordDefaults;
use crate::validation::{validate_category, validate_file_stem, validate_source_url};

/// Default per-source fetch timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum size per source document (32 MB)
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 32 * 1024 * 1024;

const STEVENBLACK_BASE: &str = "https://raw.githubusercontent.com/StevenBlack/hosts/master";

/// A remote hosts file and the category assigned to everything it lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub url: String,
    pub category: String,
}

impl Source {
    pub fn new(category: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
        }
    }

    /// Parse a `<category>=<url>` command-line override.
    ///
    /// The split happens at the first `=`, so URLs may carry query strings.
    pub fn parse_override(arg: &str) -> Result<Self> {
        let (category, url) = arg.split_once('=').ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid source '{}'. Use the form '<category>=<url>'",
                arg
            )
        })?;
        let source = Self::new(category.trim(), url.trim());
        validate_category(&source.category)?;
        validate_source_url(&source.url)?;
        Ok(source)
    }
}

/// Serialization format of an output artifact.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!(
                "Unknown format '{}'. Valid values: csv, json, yaml",
                other
            )),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Sources in precedence order: earlier sources win category conflicts
    pub sources: Vec<Source>,

    /// Directory receiving the snapshot and alias files
    pub output_dir: PathBuf,

    /// Stem of timestamped snapshot files (`<prefix>_<timestamp>.<ext>`)
    pub file_prefix: String,

    /// Stem of the alias file (`<latest_name>.<ext>`)
    pub latest_name: String,

    /// Per-source fetch timeout in seconds
    pub timeout_secs: u64,

    /// Largest accepted source document in bytes
    pub max_source_bytes: u64,

    /// HTTP User-Agent header
    pub user_agent: String,

    /// Output formats written on each run
    pub formats: Vec<OutputFormat>,

    /// Values applied to every output row
    pub records: RecordDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            output_dir: PathBuf::from("data"),
            file_prefix: "host_entries".to_string(),
            latest_name: "latest".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            user_agent: format!("hostagg/{}", env!("CARGO_PKG_VERSION")),
            formats: vec![OutputFormat::Csv],
            records: RecordDefaults::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the file if one was given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(HostaggError::Config("At least one source is required".to_string()).into());
        }

        let mut urls = HashSet::new();
        for source in &self.sources {
            validate_source_url(&source.url)
                .with_context(|| format!("Invalid source for category '{}'", source.category))?;
            validate_category(&source.category)
                .with_context(|| format!("Invalid category for source {}", source.url))?;
            if !urls.insert(source.url.as_str()) {
                return Err(HostaggError::Config(format!(
                    "Source URL listed more than once: {}",
                    source.url
                ))
                .into());
            }
        }

        if self.timeout_secs == 0 {
            return Err(HostaggError::Config("timeout_secs must be greater than 0".to_string()).into());
        }

        if self.max_source_bytes == 0 {
            return Err(
                HostaggError::Config("max_source_bytes must be greater than 0".to_string()).into(),
            );
        }

        if self.formats.is_empty() {
            return Err(HostaggError::Config("At least one output format is required".to_string()).into());
        }

        validate_file_stem(&self.file_prefix).context("Invalid file_prefix")?;
        validate_file_stem(&self.latest_name).context("Invalid latest_name")?;
        if self.file_prefix == self.latest_name {
            return Err(HostaggError::Config(
                "file_prefix and latest_name must differ".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Save configuration to YAML file atomically
    ///
    /// Uses tempfile + rename pattern to prevent corruption on crash.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let path = path.as_ref();
        let content = serde_yaml::to_string(self).with_context(|| "Failed to serialize config")?;

        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .context("Failed to create temporary file for config")?;

        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;

        temp_file
            .persist(path)
            .with_context(|| format!("Failed to persist config file: {:?}", path))?;

        Ok(())
    }

    /// Replace the registry with command-line sources, keeping their order.
    pub fn override_sources(&mut self, sources: Vec<Source>) {
        if !sources.is_empty() {
            self.sources = sources;
        }
    }

    /// Replace the output formats, dropping repeats.
    pub fn override_formats(&mut self, formats: &[OutputFormat]) {
        if formats.is_empty() {
            return;
        }
        let mut seen = HashSet::new();
        self.formats = formats.iter().copied().filter(|f| seen.insert(*f)).collect();
    }

    /// Generate default config with comments
    pub fn generate_default_yaml() -> String {
        include_str!("../templates/config.yaml").to_string()
    }
}

/// The default source registry, in precedence order.
pub fn default_sources() -> Vec<Source> {
    vec![
        Source::new("Adware & Malware", format!("{}/hosts", STEVENBLACK_BASE)),
        Source::new(
            "Fake news",
            format!("{}/alternates/fakenews-only/hosts", STEVENBLACK_BASE),
        ),
        Source::new(
            "Gambling",
            format!("{}/alternates/gambling-only/hosts", STEVENBLACK_BASE),
        ),
        Source::new(
            "Porn",
            format!("{}/alternates/porn-only/hosts", STEVENBLACK_BASE),
        ),
        Source::new(
            "Social",
            format!("{}/alternates/social-only/hosts", STEVENBLACK_BASE),
        ),
    ]
}
