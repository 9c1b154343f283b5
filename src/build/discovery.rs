//! Source file discovery and selection.
//!
//! Lists every file below the input roots and decides which of them the
//! build processes.

use crate::build::InputFile;
use crate::extension::has_extension;
use crate::filter::FileFilterList;
use glob::{glob, Pattern};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Error during source discovery.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// Input root is missing or not a directory
    #[error("Input root '{}' is not a directory", .0.display())]
    MissingRoot(PathBuf),
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, #[source] glob::PatternError),
}

/// List every file below `root`, recursively.
///
/// Directories are not returned. Entries that cannot be read, and paths that
/// are not valid UTF-8 and so cannot round-trip through a token, are logged
/// and skipped. Results are sorted by relative path.
pub fn discover_files(root: &Path) -> Result<Vec<InputFile>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
    }

    let pattern = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
    let paths = glob(&pattern).map_err(|e| DiscoveryError::InvalidPattern(pattern.clone(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => {
                if path.to_str().is_none() {
                    tracing::warn!(path = %path.display(), "skipping path that is not valid UTF-8");
                    continue;
                }
                if let Some(relative_path) = relative_path(root, &path) {
                    files.push(InputFile::new(path, root, relative_path));
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "skipping unreadable path"),
        }
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

/// `path` relative to `root`, joined with `/` on every host.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rest = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rest
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Discover files under every root, keeping root order.
pub fn discover_all(roots: &[PathBuf]) -> Result<Vec<InputFile>, DiscoveryError> {
    let per_root = roots.iter().map(|root| discover_files(root)).collect::<Result<Vec<_>, _>>()?;
    Ok(flatten(per_root))
}

/// Concatenate nested lists, preserving order.
pub fn flatten<T>(lists: Vec<Vec<T>>) -> Vec<T> {
    lists.into_iter().flatten().collect()
}

/// Rules deciding which discovered files get processed.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Accepted extensions when no include list is set
    pub extensions: Vec<String>,
    /// When set, accept exactly the files it matches
    pub include: Option<FileFilterList>,
    /// When set, reject the files it matches; checked first
    pub exclude: Option<FileFilterList>,
}

impl Selection {
    pub fn new(
        extensions: Vec<String>,
        include: Option<FileFilterList>,
        exclude: Option<FileFilterList>,
    ) -> Self {
        Self { extensions, include, exclude }
    }

    /// Whether the file at `relative_path` is processed.
    pub fn should_process_file(&self, relative_path: &str) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.matches(relative_path) {
                return false;
            }
        }

        if let Some(include) = &self.include {
            return include.matches(relative_path);
        }

        self.extensions.iter().any(|ext| has_extension(ext, relative_path))
    }

    /// Keep the files this selection accepts.
    pub fn select(&self, files: Vec<InputFile>) -> Vec<InputFile> {
        files.into_iter().filter(|f| self.should_process_file(&f.relative_path)).collect()
    }
}
