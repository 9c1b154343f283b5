//! Include/exclude file filters.
//!
//! A filter is a literal file name, a regular expression, or an arbitrary
//! predicate. Config files can only express the first two; predicates are
//! for library callers.

use regex::Regex;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error building a filter from configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FilterError {
    /// Value is neither a string nor a `{ pattern = "..." }` table
    #[error("'{0}' is not a valid 'FileFilter'.")]
    Invalid(String),
    /// Pattern failed to compile
    #[error("invalid filter pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A single file filter.
#[derive(Clone)]
pub enum FileFilter {
    /// Exact match against the relative path
    Literal(String),
    /// Regex search anywhere in the relative path
    Pattern(Regex),
    /// Caller supplied predicate
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl FileFilter {
    /// Build a literal filter.
    pub fn literal(name: impl Into<String>) -> Self {
        FileFilter::Literal(name.into())
    }

    /// Compile a pattern filter.
    pub fn pattern(pattern: &str) -> Result<Self, FilterError> {
        Regex::new(pattern)
            .map(FileFilter::Pattern)
            .map_err(|source| FilterError::Pattern { pattern: pattern.to_string(), source })
    }

    /// Wrap a predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        FileFilter::Predicate(Arc::new(f))
    }

    /// Build a filter from a raw config value.
    ///
    /// Strings are literals and `{ pattern = "..." }` tables are patterns.
    /// Anything else is rejected here so that bad config fails before any
    /// file is looked at.
    pub fn from_value(value: &toml::Value) -> Result<Self, FilterError> {
        match value {
            toml::Value::String(name) => Ok(FileFilter::literal(name.as_str())),
            toml::Value::Table(table) if table.len() == 1 => match table.get("pattern") {
                Some(toml::Value::String(pattern)) => FileFilter::pattern(pattern),
                _ => Err(FilterError::Invalid(value.to_string())),
            },
            other => Err(FilterError::Invalid(other.to_string())),
        }
    }

    /// Whether `file_name` matches this filter.
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            FileFilter::Literal(name) => name == file_name,
            FileFilter::Pattern(re) => re.is_match(file_name),
            FileFilter::Predicate(f) => f(file_name),
        }
    }
}

impl fmt::Debug for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFilter::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
            FileFilter::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            FileFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A list of filters; matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct FileFilterList(Vec<FileFilter>);

impl FileFilterList {
    pub fn new(filters: Vec<FileFilter>) -> Self {
        Self(filters)
    }

    /// Build a list from raw config values, failing on the first bad entry.
    pub fn from_values(values: &[toml::Value]) -> Result<Self, FilterError> {
        values.iter().map(FileFilter::from_value).collect::<Result<Vec<_>, _>>().map(Self)
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.0.iter().any(|filter| filter.matches(file_name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<FileFilter>> for FileFilterList {
    fn from(filters: Vec<FileFilter>) -> Self {
        Self(filters)
    }
}

impl FromIterator<FileFilter> for FileFilterList {
    fn from_iter<I: IntoIterator<Item = FileFilter>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
