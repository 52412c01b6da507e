//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

#[derive(Parser)]
#[command(name = "hostagg")]
#[command(author, version, about = "Aggregate hosts-file blocklists into a deduplicated dataset")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every source and write the snapshot and latest files
    Run(RunArgs),

    /// List the effective sources in precedence order
    Sources {
        /// Replace the configured sources (same syntax as `run --source`)
        #[arg(long = "source", value_name = "CATEGORY=URL")]
        sources: Vec<String>,
    },

    /// Parse a local hosts file and print the hostnames it yields
    Parse {
        /// Hosts file to read
        file: PathBuf,

        /// Only print the number of hostnames
        #[arg(long)]
        count: bool,
    },

    /// Print a commented default configuration
    Config,

    /// Show version
    Version,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Replace the configured sources; repeat in precedence order
    #[arg(long = "source", value_name = "CATEGORY=URL")]
    pub sources: Vec<String>,

    /// Output formats (csv, json, yaml)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub formats: Vec<OutputFormat>,

    /// Output directory
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "hostagg",
            "run",
            "--source",
            "Malware=https://a.example/hosts",
            "--source",
            "Gambling=https://b.example/hosts",
            "--formats",
            "csv,json",
            "--output-dir",
            "/tmp/out",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.sources.len(), 2);
                assert_eq!(args.sources[0], "Malware=https://a.example/hosts");
                assert_eq!(args.formats, vec![OutputFormat::Csv, OutputFormat::Json]);
                assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
                assert!(!args.json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_formats_space_separated() {
        let cli = Cli::try_parse_from(["hostagg", "run", "--formats", "csv", "yaml"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.formats, vec![OutputFormat::Csv, OutputFormat::Yaml])
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["hostagg", "run", "--formats", "xml"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["hostagg", "sources", "-v", "--config", "x.yaml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
    }
}
