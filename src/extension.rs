//! File extension helpers.
//!
//! Extension checks are plain suffix comparisons on the file name: no case
//! folding and no path normalization.

use thiserror::Error;

/// Error raised when an extension is required but absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ExtensionError {
    /// The file name contains no `.`
    #[error("'{0}' is missing a file extension.")]
    Missing(String),
}

/// Whether `file_name` ends with the file extension `extension`.
///
/// Only the final suffix counts: `foo.css.bar` has the extension `bar`,
/// not `css`.
pub fn has_extension(extension: &str, file_name: &str) -> bool {
    file_name
        .strip_suffix(extension)
        .is_some_and(|rest| rest.ends_with('.'))
}

/// Replace the final file extension in `file_name` with `new_extension`.
///
/// # Example
///
/// ```
/// use multicss::extension::replace_extension;
///
/// assert_eq!(replace_extension("css", "foo.bar.sass").unwrap(), "foo.bar.css");
/// assert!(replace_extension("css", "foo").is_err());
/// ```
pub fn replace_extension(new_extension: &str, file_name: &str) -> Result<String, ExtensionError> {
    let dot = file_name.rfind('.').ok_or_else(|| ExtensionError::Missing(file_name.to_string()))?;
    Ok(format!("{}.{}", &file_name[..dot], new_extension))
}
