//! Data models for score-log summarization.
//!
//! This module contains the core data structures used throughout the
//! application for representing statistics, per-file results, and reports.

use crate::record::ParseFailure;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Descriptive statistics over a flattened numeric sample.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SummaryStatistics {
    /// Number of values in the sample.
    pub count: usize,
    /// Smallest value.
    pub minimum: f64,
    /// Largest value.
    pub maximum: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Unbiased sample variance (n−1 denominator). NaN when count is 1;
    /// serde_json renders that as `null`.
    pub variance: f64,
}

impl SummaryStatistics {
    /// Compute statistics over a sample. Returns `None` for an empty sample.
    pub fn from_sample(sample: &[f64]) -> Option<Self> {
        if sample.is_empty() {
            return None;
        }

        let count = sample.len();
        let mut minimum = sample[0];
        let mut maximum = sample[0];
        let mut sum = 0.0;
        for &value in sample {
            minimum = minimum.min(value);
            maximum = maximum.max(value);
            sum += value;
        }
        let mean = sum / count as f64;

        let variance = if count > 1 {
            let squared_deviations: f64 = sample.iter().map(|v| (v - mean) * (v - mean)).sum();
            squared_deviations / (count - 1) as f64
        } else {
            f64::NAN
        };

        Some(Self {
            count,
            minimum,
            maximum,
            mean,
            variance,
        })
    }

    /// Variance rendered for humans: `n/a` when undefined.
    pub fn variance_display(&self) -> String {
        if self.variance.is_nan() {
            "n/a".to_string()
        } else {
            format!("{:.6}", self.variance)
        }
    }
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min-max: ({}, {}), mean: {:.6}, var: {}",
            self.minimum,
            self.maximum,
            self.mean,
            self.variance_display()
        )
    }
}

/// Result of summarizing one score column of one log file.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    /// Column name from the category schema.
    pub column: String,
    /// Number of rows that carried a record in this column.
    pub records: usize,
    /// Statistics, or `None` when no record yielded any numeric value.
    pub stats: Option<SummaryStatistics>,
    /// Records that failed to parse, in row order.
    pub failures: Vec<ParseFailure>,
}

impl ColumnSummary {
    /// Number of records skipped in this column.
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }
}

/// All summarized columns of one log file.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    /// File name relative to the logs directory.
    pub file: String,
    /// Number of data rows read.
    pub rows: usize,
    /// One entry per score column that was present in the file.
    pub columns: Vec<ColumnSummary>,
}

impl FileSummary {
    /// Total skipped records across all columns of this file.
    pub fn skipped(&self) -> usize {
        self.columns.iter().map(ColumnSummary::skipped).sum()
    }
}

/// All files of one log category.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    /// Human-readable category name (e.g. "combined scoring").
    pub category: String,
    /// Per-file summaries, in file-name order.
    pub files: Vec<FileSummary>,
}

/// Metadata about a summarization run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// The logs directory that was scanned.
    pub logs_dir: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of log files processed.
    pub files_processed: usize,
    /// Total number of records skipped because they failed to parse.
    pub records_skipped: usize,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete score-statistics report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// One section per log category.
    pub categories: Vec<CategorySummary>,
}

impl Report {
    /// Total skipped records across the whole report.
    pub fn total_skipped(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.files)
            .map(FileSummary::skipped)
            .sum()
    }
}

/// Per-seed infection counts merged across simulation runs.
///
/// Maps seed id → (infected node id → number of runs in which that node was
/// reached from the seed). BTreeMaps keep report output stable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InfectionTally {
    /// Merged counters, seed → node → occurrences.
    pub counts: BTreeMap<String, BTreeMap<i64, usize>>,
    /// Number of log rows that contributed to the tally.
    pub rows_merged: usize,
    /// Rows whose infected-nodes column failed to parse.
    pub failures: Vec<ParseFailure>,
}

impl InfectionTally {
    /// Total infection events, counting repeats.
    pub fn total_infections(&self) -> usize {
        self.counts.values().flat_map(|m| m.values()).sum()
    }

    /// Number of distinct nodes infected across all seeds.
    pub fn distinct_nodes(&self) -> usize {
        let mut nodes: Vec<i64> = self
            .counts
            .values()
            .flat_map(|m| m.keys().copied())
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes.len()
    }
}

/// The complete infection-tally report.
#[derive(Debug, Clone, Serialize)]
pub struct TallyReport {
    /// Year the tally was filtered on.
    pub year: i32,
    /// Seed-set size the tally was filtered on.
    pub num_seeds: u32,
    /// Log files that were merged.
    pub files_merged: Vec<String>,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The merged tally.
    pub tally: InfectionTally,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_empty_sample() {
        assert!(SummaryStatistics::from_sample(&[]).is_none());
    }

    #[test]
    fn test_stats_basic() {
        let stats = SummaryStatistics::from_sample(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.minimum, 1.0);
        assert_eq!(stats.maximum, 3.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.variance, 1.0);
    }

    #[test]
    fn test_stats_sample_variance_denominator() {
        // n−1 denominator: [2, 4] → mean 3, variance (1+1)/1 = 2.
        let stats = SummaryStatistics::from_sample(&[2.0, 4.0]).unwrap();
        assert_eq!(stats.variance, 2.0);
    }

    #[test]
    fn test_stats_singleton_variance_is_nan() {
        let stats = SummaryStatistics::from_sample(&[5.0]).unwrap();
        assert!(stats.variance.is_nan());
        assert_eq!(stats.variance_display(), "n/a");
    }

    #[test]
    fn test_stats_min_mean_max_ordering() {
        let stats = SummaryStatistics::from_sample(&[-3.5, 0.0, 7.25, 1.0]).unwrap();
        assert!(stats.minimum <= stats.mean);
        assert!(stats.mean <= stats.maximum);
    }

    #[test]
    fn test_stats_display() {
        let stats = SummaryStatistics::from_sample(&[1.0, 3.0]).unwrap();
        let text = stats.to_string();
        assert!(text.contains("min-max: (1, 3)"));
        assert!(text.contains("mean: 2.000000"));
    }

    #[test]
    fn test_nan_variance_serializes_as_null() {
        let stats = SummaryStatistics::from_sample(&[5.0]).unwrap();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"variance\":null"));
    }

    #[test]
    fn test_tally_totals() {
        let mut tally = InfectionTally::default();
        tally
            .counts
            .entry("85".to_string())
            .or_default()
            .insert(7208, 3);
        tally
            .counts
            .entry("85".to_string())
            .or_default()
            .insert(103, 1);
        tally
            .counts
            .entry("102".to_string())
            .or_default()
            .insert(103, 2);

        assert_eq!(tally.total_infections(), 6);
        assert_eq!(tally.distinct_nodes(), 2);
    }
}
