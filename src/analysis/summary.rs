//! Per-file score summarization.
//!
//! Bridges the TSV framing and the record aggregator: for each score column
//! a category declares, collect the rows that carry a record, summarize them
//! as one batch, and remap any failure indices back to original row numbers
//! so a skipped record can be traced to its line in the log file.

use crate::config::CategoryConfig;
use crate::logfile::LogTable;
use crate::models::{ColumnSummary, FileSummary};
use crate::record::{self, ParseFailure};
use crate::scanner;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, warn};

/// Summarize every score column of one log file.
pub fn summarize_file(path: &Path, category: &CategoryConfig) -> Result<FileSummary> {
    let table = LogTable::read(path, &category.columns)?;
    let mut columns = Vec::new();

    for column in &category.score_columns {
        // A column the schema names but no row carries is simply absent;
        // the combined-scoring logs omit weights when a run had none.
        if !table.has_values(column) {
            debug!("column '{}' absent in {}", column, path.display());
            continue;
        }
        let Some(cells) = table.column(column) else {
            continue;
        };

        // Batch up the present cells, remembering which row each came from.
        let mut batch: Vec<&str> = Vec::new();
        let mut row_of: Vec<usize> = Vec::new();
        for (row, cell) in cells.iter().enumerate() {
            if let Some(text) = cell {
                batch.push(text);
                row_of.push(row);
            }
        }

        let summary = match record::summarize(&batch) {
            Ok(summary) => ColumnSummary {
                column: column.clone(),
                records: batch.len(),
                stats: Some(summary.stats),
                failures: remap_rows(summary.failures, &row_of),
            },
            Err(empty) => {
                warn!(
                    "column '{}' of {} yielded no numeric values",
                    column,
                    path.display()
                );
                ColumnSummary {
                    column: column.clone(),
                    records: batch.len(),
                    stats: None,
                    failures: remap_rows(empty.failures, &row_of),
                }
            }
        };
        columns.push(summary);
    }

    Ok(FileSummary {
        file: scanner::file_name(path),
        rows: table.rows(),
        columns,
    })
}

/// Rewrite batch-local failure indices as file row numbers.
fn remap_rows(failures: Vec<ParseFailure>, row_of: &[usize]) -> Vec<ParseFailure> {
    failures
        .into_iter()
        .map(|mut failure| {
            if let Some(&row) = row_of.get(failure.index) {
                failure.index = row;
            }
            failure
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn category(prefix: &str) -> CategoryConfig {
        Config::default()
            .categories
            .into_iter()
            .find(|c| c.prefix == prefix)
            .unwrap()
    }

    #[test]
    fn test_summarize_simple_score_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("simple_weight_clu__2019.txt");
        fs::write(&path, "2001\t{1=0.5, 2=0.75}\n2002\t{1=0.25}\n").unwrap();

        let summary = summarize_file(&path, &category("simple_weight_")).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns.len(), 1);

        let scores = &summary.columns[0];
        assert_eq!(scores.column, "scores");
        assert_eq!(scores.records, 2);
        let stats = scores.stats.unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.minimum, 0.25);
        assert_eq!(stats.maximum, 0.75);
        assert!(scores.failures.is_empty());
    }

    #[test]
    fn test_absent_optional_columns_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scoring_bet__2019.txt");
        // Only scores + normalized_scores present; weights/combined omitted.
        fs::write(&path, "2001\t{1=2.0}\t{1=1.0}\n").unwrap();

        let summary = summarize_file(&path, &category("scoring_")).unwrap();
        let names: Vec<&str> = summary.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["scores", "normalized_scores"]);
    }

    #[test]
    fn test_failure_index_is_file_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("simple_weight_bet__2019.txt");
        // Row 1 has an empty scores cell, row 2 is malformed.
        fs::write(&path, "2001\t{1=2}\n2002\t\n2003\t{broken\n").unwrap();

        let summary = summarize_file(&path, &category("simple_weight_")).unwrap();
        let scores = &summary.columns[0];
        assert_eq!(scores.records, 2);
        assert_eq!(scores.failures.len(), 1);
        // The malformed record sits on row 2 of the file, not index 1 of the batch.
        assert_eq!(scores.failures[0].index, 2);
        assert_eq!(summary.skipped(), 1);
    }

    #[test]
    fn test_all_malformed_column_reports_no_stats() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page_rank_clu__2019.txt");
        fs::write(&path, "2001\tnot a mapping\n").unwrap();

        let summary = summarize_file(&path, &category("page_rank_")).unwrap();
        let scores = &summary.columns[0];
        assert!(scores.stats.is_none());
        assert_eq!(scores.failures.len(), 1);
    }
}
