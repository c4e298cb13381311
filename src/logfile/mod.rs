//! Tab-separated log file reading.
//!
//! The simulation writes its logs as header-less TSV; the column layout is
//! known per log category (two-column score logs, five-column combined
//! scoring, three-column cascade results) and supplied by the caller as a
//! list of names, the way the original analysis scripts named columns when
//! loading each file.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// One parsed log file: named columns over rows of optional cells.
///
/// Rows shorter than the schema pad with absent cells; the combined-scoring
/// logs legitimately omit their trailing columns when a run had no weights.
#[derive(Debug, Clone)]
pub struct LogTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl LogTable {
    /// Read a TSV file with the given column schema.
    pub fn read(path: &Path, columns: &[String]) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file: {}", path.display()))?;
        let table = Self::parse(&content, columns);
        debug!(
            "read {} rows x {} columns from {}",
            table.rows.len(),
            columns.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse TSV content with the given column schema.
    pub fn parse(content: &str, columns: &[String]) -> Self {
        let mut rows = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }

            let mut cells: Vec<Option<String>> = line
                .split('\t')
                .take(columns.len())
                .map(|cell| {
                    let cell = cell.trim();
                    if cell.is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            cells.resize(columns.len(), None);
            rows.push(cells);
        }

        Self {
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Number of data rows.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// All cells of a named column, one entry per row. `None` if the schema
    /// has no such column.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row[index].as_deref())
                .collect(),
        )
    }

    /// Whether a named column carries at least one value.
    ///
    /// Mirrors the "skip the column if every row is null" check the original
    /// analysis applied to the optional weight/combined columns.
    pub fn has_values(&self, name: &str) -> bool {
        self.column(name)
            .map(|cells| cells.iter().any(|c| c.is_some()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn schema(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_two_column_log() {
        let table = LogTable::parse("2001\t{1=2}\n2002\t{3=4}\n", &schema(&["year", "scores"]));
        assert_eq!(table.rows(), 2);

        let years = table.column("year").unwrap();
        assert_eq!(years, vec![Some("2001"), Some("2002")]);
        let scores = table.column("scores").unwrap();
        assert_eq!(scores, vec![Some("{1=2}"), Some("{3=4}")]);
    }

    #[test]
    fn test_short_rows_pad_with_absent_cells() {
        let columns = schema(&["year", "scores", "normalized_scores", "weights", "combined"]);
        let table = LogTable::parse("2001\t{1=2}\t{1=1.0}\n", &columns);

        assert_eq!(table.rows(), 1);
        assert!(table.has_values("scores"));
        assert!(table.has_values("normalized_scores"));
        assert!(!table.has_values("weights"));
        assert!(!table.has_values("combined"));
    }

    #[test]
    fn test_unknown_column() {
        let table = LogTable::parse("2001\t{1=2}\n", &schema(&["year", "scores"]));
        assert!(table.column("weights").is_none());
        assert!(!table.has_values("weights"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = LogTable::parse("\n2001\t{1=2}\n\n\n", &schema(&["year", "scores"]));
        assert_eq!(table.rows(), 1);
    }

    #[test]
    fn test_extra_cells_ignored() {
        let table = LogTable::parse("2001\t{1=2}\textra\n", &schema(&["year", "scores"]));
        assert_eq!(table.rows(), 1);
        assert_eq!(table.column("scores").unwrap(), vec![Some("{1=2}")]);
    }

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "2018\t{{85=[85, 7208]}}\n").unwrap();

        let table = LogTable::read(file.path(), &schema(&["year", "scores"])).unwrap();
        assert_eq!(table.rows(), 1);
        assert_eq!(
            table.column("scores").unwrap(),
            vec![Some("{85=[85, 7208]}")]
        );
    }

    #[test]
    fn test_read_missing_file_fails() {
        let result = LogTable::read(Path::new("/nonexistent/log.txt"), &schema(&["year"]));
        assert!(result.is_err());
    }
}
