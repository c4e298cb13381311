//! Log file discovery.
//!
//! The simulation drops all of its logs into one flat directory, with the
//! category encoded as a file-name prefix and a sortable timestamp suffix
//! (`scoring_bet_simple__2019_03_14_09_26_53.txt`). Discovery is a prefix
//! match plus a lexicographic sort, so "the latest N logs of a category" is
//! just the tail of the sorted list.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Log file scanner rooted at a logs directory.
pub struct LogScanner {
    logs_dir: PathBuf,
}

impl LogScanner {
    /// Create a scanner for the given logs directory.
    pub fn new(logs_dir: PathBuf) -> Self {
        Self { logs_dir }
    }

    /// The directory this scanner reads from.
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Find all `.txt` logs whose file name starts with `prefix`, sorted by
    /// file name (and therefore by embedded timestamp).
    pub fn discover(&self, prefix: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.logs_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.with_context(|| {
                format!("Failed to scan logs directory: {}", self.logs_dir.display())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with(prefix) && name.ends_with(".txt") {
                files.push(entry.into_path());
            }
        }

        debug!("{} log(s) matching prefix '{}'", files.len(), prefix);
        Ok(files)
    }

    /// Find the latest `n` logs for a prefix. `None` means all of them.
    pub fn latest(&self, prefix: &str, n: Option<usize>) -> Result<Vec<PathBuf>> {
        let mut files = self.discover(prefix)?;
        if let Some(n) = n {
            if files.len() > n {
                files.drain(..files.len() - n);
            }
        }
        Ok(files)
    }
}

/// File name of a path, for report labels.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn test_discover_matches_prefix_and_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "simple_weight_clu__2019_01_01_00_00_00.txt");
        touch(dir.path(), "simple_weight_bet__2019_01_02_00_00_00.txt");
        touch(dir.path(), "page_rank_clu__2019_01_01_00_00_00.txt");
        touch(dir.path(), "simple_weight_notes.md");

        let scanner = LogScanner::new(dir.path().to_path_buf());
        let found = scanner.discover("simple_weight_").unwrap();

        let names: Vec<String> = found.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            names,
            vec![
                "simple_weight_bet__2019_01_02_00_00_00.txt",
                "simple_weight_clu__2019_01_01_00_00_00.txt",
            ]
        );
    }

    #[test]
    fn test_discover_ignores_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("ic_results_old")).unwrap();
        touch(dir.path(), "ic_results__2019_01_01_00_00_00.txt");

        let scanner = LogScanner::new(dir.path().to_path_buf());
        let found = scanner.discover("ic_results__").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_latest_takes_tail_of_sorted_list() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ic_results__2019_01_01_00_00_00.txt");
        touch(dir.path(), "ic_results__2019_01_03_00_00_00.txt");
        touch(dir.path(), "ic_results__2019_01_02_00_00_00.txt");

        let scanner = LogScanner::new(dir.path().to_path_buf());
        let found = scanner.latest("ic_results__", Some(2)).unwrap();

        let names: Vec<String> = found.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            names,
            vec![
                "ic_results__2019_01_02_00_00_00.txt",
                "ic_results__2019_01_03_00_00_00.txt",
            ]
        );
    }

    #[test]
    fn test_latest_none_returns_all() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "scoring_a__1.txt");
        touch(dir.path(), "scoring_b__2.txt");

        let scanner = LogScanner::new(dir.path().to_path_buf());
        assert_eq!(scanner.latest("scoring_", None).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_directory_fails() {
        let scanner = LogScanner::new(PathBuf::from("/nonexistent/logs"));
        assert!(scanner.discover("scoring_").is_err());
    }
}
