//! CSS processing with an ordered plugin chain.
//!
//! A [`Processor`] parses a stylesheet with lightningcss, hands it to each
//! [`Plugin`] in order together with a [`ProcessResult`] that plugins can
//! attach messages to, and finally prints the stylesheet back to CSS.
//!
//! # Example
//!
//! ```ignore
//! use multicss::process::{ProcessOptions, Processor};
//! use multicss::process::plugins::SelectorMetadata;
//!
//! let processor = Processor::new(vec![Box::new(SelectorMetadata::default())]);
//! let result = processor.process(".a { color: red }", ProcessOptions::new("a.css", "a.css"))?;
//! assert_eq!(result.messages.len(), 1);
//! ```

pub mod plugins;

use crate::messages::ResultMessage;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use std::path::PathBuf;
use thiserror::Error;

/// Options for processing a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Source path, relative to its input root
    pub from: String,
    /// Destination path, relative to the output directory
    pub to: Option<String>,
    /// Absolute path of the source file
    pub absolute_path: PathBuf,
    /// Input root the source file was found in
    pub input_root: PathBuf,
    /// All input roots, for resolving references across roots
    pub input_roots: Vec<PathBuf>,
    /// Target browsers (browserslist syntax) from the `css.browsers` setting.
    ///
    /// Passed through untouched for plugins that want it. The built-in
    /// plugins and the printer do not read it.
    pub browsers: Vec<String>,
}

impl ProcessOptions {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: Some(to.into()), ..Default::default() }
    }
}

/// Output of processing a single file.
#[derive(Debug, Clone, Default)]
pub struct ProcessResult {
    /// Printed CSS, filled once all plugins ran
    pub css: String,
    /// Effective options; plugins may change `to`
    pub opts: ProcessOptions,
    /// Messages in the order plugins emitted them
    pub messages: Vec<ResultMessage>,
    /// Print without whitespace
    pub minify: bool,
}

impl ProcessResult {
    pub fn new(opts: ProcessOptions) -> Self {
        Self { opts, ..Default::default() }
    }

    /// The effective destination, if it is usable.
    pub fn destination(&self) -> Option<&str> {
        self.opts.to.as_deref().filter(|to| !to.is_empty())
    }

    /// Override the destination path.
    pub fn set_destination(&mut self, to: impl Into<String>) {
        self.opts.to = Some(to.into());
    }

    pub fn push_message(&mut self, message: ResultMessage) {
        self.messages.push(message);
    }
}

/// Error reported by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PluginError(pub String);

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Error during processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProcessError {
    /// The source is not valid CSS
    #[error("Failed to parse '{file}': {message}")]
    Parse { file: String, message: String },
    /// A plugin failed
    #[error("Plugin '{plugin}' failed on '{file}': {message}")]
    Plugin { plugin: String, file: String, message: String },
    /// The stylesheet could not be printed
    #[error("Failed to print '{file}': {message}")]
    Print { file: String, message: String },
    /// No usable destination path after processing
    #[error("No destination path for '{0}' after processing")]
    MissingDestination(String),
}

/// A transformation step run against a parsed stylesheet.
pub trait Plugin: Send + Sync {
    /// Name used in messages and errors.
    fn name(&self) -> &str;

    /// Transform `sheet` and/or attach messages to `result`.
    fn run(
        &self,
        sheet: &mut StyleSheet<'_>,
        result: &mut ProcessResult,
    ) -> Result<(), PluginError>;
}

/// Runs an ordered chain of plugins over CSS sources.
pub struct Processor {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Processor {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// Names of the configured plugins, in run order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Process one stylesheet.
    pub fn process(&self, css: &str, opts: ProcessOptions) -> Result<ProcessResult, ProcessError> {
        let mut result = ProcessResult::new(opts);
        let file = result.opts.from.clone();

        let parser_options = ParserOptions { filename: file.clone(), ..ParserOptions::default() };
        let mut sheet = StyleSheet::parse(css, parser_options)
            .map_err(|e| ProcessError::Parse { file: file.clone(), message: e.to_string() })?;

        for plugin in &self.plugins {
            tracing::trace!(plugin = plugin.name(), file = %file, "running plugin");
            plugin.run(&mut sheet, &mut result).map_err(|e| ProcessError::Plugin {
                plugin: plugin.name().to_string(),
                file: file.clone(),
                message: e.to_string(),
            })?;
        }

        let printer_options = PrinterOptions { minify: result.minify, ..PrinterOptions::default() };
        let printed = sheet
            .to_css(printer_options)
            .map_err(|e| ProcessError::Print { file: file.clone(), message: e.to_string() })?;
        result.css = printed.code;

        Ok(result)
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor").field("plugins", &self.plugin_names()).finish()
    }
}
