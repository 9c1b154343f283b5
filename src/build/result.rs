//! Build result types.
//!
//! Contains types for representing the outcome of build operations.

use std::path::PathBuf;
use std::time::Duration;

/// What the per-file routine reports back to the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Files the output depends on; the source file comes first
    pub dependencies: Vec<PathBuf>,
    /// Files written under the output directory
    pub outputs: Vec<PathBuf>,
}

/// Status of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Processed and written
    Built,
    /// Up to date, not processed
    Skipped,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Built => write!(f, "built"),
            FileStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Result of building a single path token.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Path token that was built
    pub token: String,
    pub status: FileStatus,
    /// Output files produced
    pub outputs: Vec<PathBuf>,
    /// Build duration
    pub duration: Duration,
}

impl FileResult {
    /// Create a built result.
    pub fn built(token: String, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        Self { token, status: FileStatus::Built, outputs, duration }
    }

    /// Create a skipped result.
    pub fn skipped(token: String) -> Self {
        Self { token, status: FileStatus::Skipped, outputs: vec![], duration: Duration::ZERO }
    }
}

/// Result of a complete build run.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Results for each token, in token order
    pub files: Vec<FileResult>,
    /// Stale outputs deleted because their source is gone
    pub removed: Vec<PathBuf>,
    /// Total build duration
    pub total_duration: Duration,
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file result.
    pub fn add_result(&mut self, result: FileResult) {
        self.files.push(result);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Get the number of built files.
    pub fn built_count(&self) -> usize {
        self.files.iter().filter(|r| r.status == FileStatus::Built).count()
    }

    /// Get the number of skipped files.
    pub fn skipped_count(&self) -> usize {
        self.files.iter().filter(|r| r.status == FileStatus::Skipped).count()
    }

    /// Get all outputs produced in this run.
    pub fn all_outputs(&self) -> Vec<&PathBuf> {
        self.files.iter().flat_map(|r| r.outputs.iter()).collect()
    }

    /// Format a summary of the build result.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Build succeeded: {} built, {} skipped ({} total) in {:?}",
            self.built_count(),
            self.skipped_count(),
            self.files.len(),
            self.total_duration
        )];

        if !self.removed.is_empty() {
            lines.push(format!("Removed {} stale output(s):", self.removed.len()));
            for path in self.removed.iter().take(5) {
                lines.push(format!("  - {}", path.display()));
            }
            if self.removed.len() > 5 {
                lines.push(format!("  ... and {} more", self.removed.len() - 5));
            }
        }

        lines.join("\n")
    }
}
