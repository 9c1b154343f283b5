//! Result messages emitted by plugins.
//!
//! Plugins talk back to the build through messages attached to the
//! [`ProcessResult`](crate::process::ProcessResult). Two kinds are understood
//! here: requests to write an extra output file, and extra input files the
//! output depends on. Everything else is carried along and ignored.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;
use thiserror::Error;

/// Message type tag for extra output files.
pub const WRITE_FILE_MESSAGE: &str = "broccoli-write-file";

/// Message type tag for extra dependencies.
pub const DEPENDENCY_MESSAGE: &str = "broccoli-dependency";

/// Character encoding for reading and writing files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8 text
    #[default]
    Utf8,
    /// Raw bytes
    Binary,
}

/// File content, either text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Binary(Vec<u8>),
}

impl Content {
    /// Bytes to put on disk for this content under `encoding`.
    ///
    /// Text is always stored as UTF-8. With [`Encoding::Binary`] byte content
    /// is written untouched; with [`Encoding::Utf8`] invalid sequences in byte
    /// content are replaced.
    pub fn encode(&self, encoding: Encoding) -> Cow<'_, [u8]> {
        match (self, encoding) {
            (Content::Text(text), _) => Cow::Borrowed(text.as_bytes()),
            (Content::Binary(bytes), Encoding::Binary) => Cow::Borrowed(bytes.as_slice()),
            (Content::Binary(bytes), Encoding::Utf8) => match String::from_utf8_lossy(bytes) {
                Cow::Borrowed(_) => Cow::Borrowed(bytes.as_slice()),
                Cow::Owned(text) => Cow::Owned(text.into_bytes()),
            },
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Binary(bytes)
    }
}

/// A file to write into the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileToWrite {
    /// Path relative to the output directory
    pub path: String,
    pub content: Content,
    /// Overrides the configured output encoding
    pub encoding: Option<Encoding>,
}

/// A message attached to a process result.
///
/// Fields are optional because plugins build these loosely; validation
/// happens in [`is_write_file_message`] and [`is_dependency_message`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
}

impl ResultMessage {
    /// Create a message with only a type and plugin name.
    pub fn new(kind: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self { kind: kind.into(), plugin: Some(plugin.into()), ..Default::default() }
    }

    /// Request an extra output file.
    pub fn write_file(
        plugin: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<Content>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            content: Some(content.into()),
            ..Self::new(WRITE_FILE_MESSAGE, plugin)
        }
    }

    /// Declare an extra dependency.
    pub fn dependency(plugin: impl Into<String>, path: impl Into<String>) -> Self {
        Self { path: Some(path.into()), ..Self::new(DEPENDENCY_MESSAGE, plugin) }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    fn valid_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }
}

/// A message failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageError {
    #[error("'{0}' is missing a valid 'path'.")]
    MissingPath(&'static str),
    #[error("'{0}' is missing valid 'content'.")]
    MissingContent(&'static str),
}

/// Whether `message` asks for an extra output file.
///
/// Returns `Ok(false)` for other message types. A write-file message without
/// a non-empty path or without content is an error.
pub fn is_write_file_message(message: &ResultMessage) -> Result<bool, MessageError> {
    if message.kind != WRITE_FILE_MESSAGE {
        return Ok(false);
    }
    if message.valid_path().is_none() {
        return Err(MessageError::MissingPath("WriteFileMessage"));
    }
    if message.content.is_none() {
        return Err(MessageError::MissingContent("WriteFileMessage"));
    }
    Ok(true)
}

/// Whether `message` declares an extra dependency.
///
/// Returns `Ok(false)` for other message types. A dependency message without
/// a non-empty path is an error.
pub fn is_dependency_message(message: &ResultMessage) -> Result<bool, MessageError> {
    if message.kind != DEPENDENCY_MESSAGE {
        return Ok(false);
    }
    if message.valid_path().is_none() {
        return Err(MessageError::MissingPath("DependencyMessage"));
    }
    Ok(true)
}

/// A validated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    WriteFile(FileToWrite),
    Dependency(PathBuf),
    /// Some other message type
    Ignored,
}

/// Validate and classify a message.
pub fn classify(message: &ResultMessage) -> Result<Classified, MessageError> {
    if is_write_file_message(message)? {
        // Both fields were checked above.
        if let (Some(path), Some(content)) = (&message.path, &message.content) {
            return Ok(Classified::WriteFile(FileToWrite {
                path: path.clone(),
                content: content.clone(),
                encoding: message.encoding,
            }));
        }
    }
    if is_dependency_message(message)? {
        if let Some(path) = &message.path {
            return Ok(Classified::Dependency(PathBuf::from(path)));
        }
    }
    Ok(Classified::Ignored)
}

/// Split a message sequence into extra files and extra dependencies.
///
/// Order within each list follows the message order. The first invalid
/// message aborts the whole split.
pub fn partition_messages(
    messages: &[ResultMessage],
) -> Result<(Vec<FileToWrite>, Vec<PathBuf>), MessageError> {
    let mut files = Vec::new();
    let mut dependencies = Vec::new();
    for message in messages {
        match classify(message)? {
            Classified::WriteFile(file) => files.push(file),
            Classified::Dependency(path) => dependencies.push(path),
            Classified::Ignored => {}
        }
    }
    Ok((files, dependencies))
}
