//! Path tokens.
//!
//! The build cache keys work by string. Each selected file is packed into a
//! [`PathToken`] holding its absolute path, its input root and its path
//! relative to that root, joined by [`DELIMITER`].

use crate::extension::{replace_extension, ExtensionError};
use std::fmt;
use std::path::PathBuf;

/// Separator between token parts; the host's path-list separator.
#[cfg(windows)]
pub const DELIMITER: char = ';';
#[cfg(not(windows))]
pub const DELIMITER: char = ':';

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputFile {
    /// Full path of the file
    pub absolute_path: PathBuf,
    /// Input root the file was found under
    pub input_root: PathBuf,
    /// Path below `input_root`, `/`-separated
    pub relative_path: String,
}

impl InputFile {
    pub fn new(
        absolute_path: impl Into<PathBuf>,
        input_root: impl Into<PathBuf>,
        relative_path: impl Into<String>,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            input_root: input_root.into(),
            relative_path: relative_path.into(),
        }
    }
}

/// Opaque cache key for one input file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathToken(String);

impl PathToken {
    /// Pack an input file into a token.
    pub fn encode(file: &InputFile) -> Self {
        Self(format!(
            "{}{d}{}{d}{}",
            file.absolute_path.to_string_lossy(),
            file.input_root.to_string_lossy(),
            file.relative_path,
            d = DELIMITER
        ))
    }

    /// Unpack a token.
    ///
    /// Missing parts come back empty; a path containing the delimiter does
    /// not survive the trip.
    pub fn decode(&self) -> InputFile {
        let mut parts = self.0.splitn(3, DELIMITER);
        let absolute_path = parts.next().unwrap_or_default();
        let input_root = parts.next().unwrap_or_default();
        let relative_path = parts.next().unwrap_or_default();
        InputFile::new(absolute_path, input_root, relative_path)
    }

    /// Wrap an already encoded token.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Output path for a relative source path.
///
/// With a target extension the source extension is replaced; otherwise the
/// relative path is kept as is.
pub fn destination_path(
    relative_path: &str,
    target_extension: Option<&str>,
) -> Result<String, ExtensionError> {
    match target_extension {
        Some(extension) => replace_extension(extension, relative_path),
        None => Ok(relative_path.to_string()),
    }
}
