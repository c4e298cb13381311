//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ScoreStats - summary statistics for graph-simulation score logs
///
/// Summarize the mapping-literal score columns of tab-separated simulation
/// logs (centrality scoring and independent-cascade results) into a
/// Markdown or JSON report.
///
/// Examples:
///   scorestats --logs-dir target/classes/ws/logs
///   scorestats --logs-dir logs --format json -o stats.json
///   scorestats --logs-dir logs --categories "combined scoring" --latest 3
///   scorestats --logs-dir logs --tally --year 2001 --seeds 5
///   scorestats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory containing the simulation log files
    #[arg(
        short,
        long,
        default_value = "logs",
        value_name = "DIR",
        env = "SCORESTATS_LOGS"
    )]
    pub logs_dir: PathBuf,

    /// Output file path for the report
    #[arg(
        short,
        long,
        default_value = "stats_scores.md",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .scorestats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only summarize these categories (comma-separated names or prefixes)
    ///
    /// Example: --categories "simple scores,page_rank"
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// Only summarize the latest N log files per category
    #[arg(long, value_name = "COUNT")]
    pub latest: Option<usize>,

    /// Append a timestamp to the output file name
    ///
    /// Matches the simulation's own log naming (stats_scores__YYYY_MM_DD_HH_MM_SS).
    #[arg(short, long)]
    pub timestamp: bool,

    /// Fail if more than this many records are skipped
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is exceeded;
    /// skipped records usually mean a log-format drift, not noise.
    #[arg(long, value_name = "COUNT")]
    pub fail_on_skipped: Option<usize>,

    /// Tally infected-node counts instead of summarizing scores
    ///
    /// Merges the latest independent-cascade result logs and counts how often
    /// each node was infected per seed. Requires --year and --seeds.
    #[arg(long, requires = "year", requires = "seeds")]
    pub tally: bool,

    /// Simulation year to tally (e.g. 2001)
    #[arg(long, value_name = "YEAR", requires = "tally")]
    pub year: Option<i32>,

    /// Seed-set size to tally (e.g. 5)
    #[arg(long, value_name = "COUNT", requires = "tally")]
    pub seeds: Option<u32>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: discover log files without summarizing them
    ///
    /// Shows which files would be processed and exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .scorestats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(latest) = self.latest {
            if latest == 0 {
                return Err("--latest must be at least 1".to_string());
            }
        }

        if !self.logs_dir.exists() {
            return Err(format!(
                "Logs directory does not exist: {}",
                self.logs_dir.display()
            ));
        }
        if !self.logs_dir.is_dir() {
            return Err(format!(
                "Logs path is not a directory: {}",
                self.logs_dir.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
