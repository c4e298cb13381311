//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.scorestats.toml` files. The per-category column schemas live here as a
//! table, so adding a new log category is a config edit, not a code change.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Log categories to summarize.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,

    /// Infection-tally settings.
    #[serde(default)]
    pub tally: TallyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            scanner: ScannerConfig::default(),
            report: ReportConfig::default(),
            categories: default_categories(),
            tally: TallyConfig::default(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "stats_scores.md".to_string()
}

/// Log discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Directory the simulation writes its logs to.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,

    /// Only summarize the latest N logs per category (None = all).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<usize>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            latest: None,
        }
    }
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the skipped-records section in the report.
    #[serde(default = "default_true")]
    pub include_failures: bool,

    /// Maximum skipped records listed per file.
    #[serde(default = "default_max_failure_records")]
    pub max_failure_records: usize,

    /// Append a `__YYYY_MM_DD_HH_MM_SS` timestamp to the output file name.
    #[serde(default)]
    pub timestamp_output: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_failures: true,
            max_failure_records: default_max_failure_records(),
            timestamp_output: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_failure_records() -> usize {
    10
}

/// One log category: a file-name prefix plus its column schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Human-readable category name.
    pub name: String,

    /// File-name prefix the simulation uses for this category.
    pub prefix: String,

    /// Column names, in file order (logs carry no header row).
    pub columns: Vec<String>,

    /// Which of the columns hold mapping-literal score records.
    pub score_columns: Vec<String>,
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig {
            name: "simple scores".to_string(),
            prefix: "simple_weight_".to_string(),
            columns: vec!["year".to_string(), "scores".to_string()],
            score_columns: vec!["scores".to_string()],
        },
        CategoryConfig {
            name: "page rank scores".to_string(),
            prefix: "page_rank_".to_string(),
            columns: vec!["year".to_string(), "scores".to_string()],
            score_columns: vec!["scores".to_string()],
        },
        CategoryConfig {
            name: "combined scoring".to_string(),
            prefix: "scoring_".to_string(),
            columns: vec![
                "year".to_string(),
                "scores".to_string(),
                "normalized_scores".to_string(),
                "weights".to_string(),
                "combined".to_string(),
            ],
            score_columns: vec![
                "scores".to_string(),
                "normalized_scores".to_string(),
                "weights".to_string(),
                "combined".to_string(),
            ],
        },
    ]
}

/// Infection-tally settings (independent-cascade result logs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    /// File-name prefix of cascade result logs.
    #[serde(default = "default_tally_prefix")]
    pub prefix: String,

    /// Column names of cascade result logs.
    #[serde(default = "default_tally_columns")]
    pub columns: Vec<String>,

    /// How many of the most recent result logs to merge.
    #[serde(default = "default_tally_latest")]
    pub latest: usize,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            prefix: default_tally_prefix(),
            columns: default_tally_columns(),
            latest: default_tally_latest(),
        }
    }
}

fn default_tally_prefix() -> String {
    "ic_results__".to_string()
}

fn default_tally_columns() -> Vec<String> {
    vec![
        "year".to_string(),
        "numSeeds".to_string(),
        "infectedNodes".to_string(),
    ]
}

fn default_tally_latest() -> usize {
    30
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".scorestats.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Scanner settings - logs dir always comes from CLI (it has a default)
        self.scanner.logs_dir = args.logs_dir.to_string_lossy().to_string();

        if let Some(latest) = args.latest {
            self.scanner.latest = Some(latest);
        }

        // Category filter - only override if provided
        if let Some(ref names) = args.categories {
            self.categories.retain(|c| {
                names
                    .iter()
                    .any(|n| n.eq_ignore_ascii_case(&c.name) || c.prefix.starts_with(n.as_str()))
            });
        }

        // Flags always override
        if args.timestamp {
            self.report.timestamp_output = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scanner.logs_dir, "logs");
        assert_eq!(config.categories.len(), 3);
        assert_eq!(config.tally.latest, 30);
        assert_eq!(config.tally.prefix, "ic_results__");
    }

    #[test]
    fn test_default_category_schemas() {
        let config = Config::default();
        let combined = config
            .categories
            .iter()
            .find(|c| c.prefix == "scoring_")
            .unwrap();
        assert_eq!(combined.columns.len(), 5);
        assert_eq!(combined.score_columns.len(), 4);
        assert!(!combined.score_columns.contains(&"year".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"
verbose = true

[scanner]
logs_dir = "runs/logs"
latest = 5

[[categories]]
name = "custom scores"
prefix = "custom_"
columns = ["year", "scores"]
score_columns = ["scores"]

[tally]
latest = 10
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert!(config.general.verbose);
        assert_eq!(config.scanner.logs_dir, "runs/logs");
        assert_eq!(config.scanner.latest, Some(5));
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].prefix, "custom_");
        assert_eq!(config.tally.latest, 10);
        // Unset tally fields keep their defaults.
        assert_eq!(config.tally.prefix, "ic_results__");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[[categories]]"));
        assert!(toml_str.contains("[tally]"));
    }
}
