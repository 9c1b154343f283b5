//! Multi-file build orchestration.
//!
//! [`MultiCssBuild`] discovers the files under its input roots, keeps the
//! ones the selection rules accept, packs each into a [`PathToken`] and hands
//! the token set to a [`BuildCache`] together with the per-file routine.

use crate::build::{
    discover_all, BuildCache, BuildResult, DiscoveryError, InputFile, ManifestError, PathToken,
    Selection,
};
use crate::config::{default_concurrency, ConfigError};
use crate::extension::ExtensionError;
use crate::filter::FileFilterList;
use crate::messages::{Encoding, MessageError};
use crate::process::{Plugin, ProcessError, Processor};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error during build execution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Discovery error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
    /// IO error on a specific file
    #[error("IO error on '{path}': {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Output path leaves the output directory
    #[error("Output path '{0}' is not inside the output directory")]
    OutsideOutput(String),
    /// Destination extension could not be replaced
    #[error(transparent)]
    Extension(#[from] ExtensionError),
    /// A plugin emitted a malformed message
    #[error(transparent)]
    Message(#[from] MessageError),
    /// Processing a file failed
    #[error(transparent)]
    Process(#[from] ProcessError),
    /// Manifest could not be read or written
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    /// Worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl BuildError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| BuildError::Io { path, source }
    }
}

/// Resolved build settings.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Extensions of files to process when no include list is set
    pub extensions: Vec<String>,
    /// Replaces the source extension in destination paths
    pub target_extension: Option<String>,
    /// Files to process regardless of extension
    pub include: Option<FileFilterList>,
    /// Files never to process
    pub exclude: Option<FileFilterList>,
    /// Encoding used to read sources
    pub input_encoding: Encoding,
    /// Encoding for written files without their own
    pub output_encoding: Encoding,
    /// Maximum number of files processed at once
    pub concurrency: usize,
    /// Target browsers, handed to plugins
    pub browsers: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["css".to_string()],
            target_extension: None,
            include: None,
            exclude: None,
            input_encoding: Encoding::Utf8,
            output_encoding: Encoding::Utf8,
            concurrency: default_concurrency(),
            browsers: Vec::new(),
        }
    }
}

impl BuildOptions {
    /// Selection rules described by these options.
    pub fn selection(&self) -> Selection {
        Selection::new(self.extensions.clone(), self.include.clone(), self.exclude.clone())
    }
}

/// Builds every selected file under a set of input roots.
#[derive(Debug)]
pub struct MultiCssBuild {
    pub(crate) input_roots: Vec<PathBuf>,
    pub(crate) out_dir: PathBuf,
    pub(crate) options: BuildOptions,
    pub(crate) processor: Processor,
    selection: Selection,
}

impl MultiCssBuild {
    /// Create a build.
    ///
    /// Fails when `plugins` is empty.
    pub fn new(
        input_roots: Vec<PathBuf>,
        out_dir: PathBuf,
        options: BuildOptions,
        plugins: Vec<Box<dyn Plugin>>,
    ) -> Result<Self, ConfigError> {
        if plugins.is_empty() {
            return Err(ConfigError::EmptyPluginList);
        }

        let selection = options.selection();
        Ok(Self { input_roots, out_dir, options, processor: Processor::new(plugins), selection })
    }

    pub fn input_roots(&self) -> &[PathBuf] {
        &self.input_roots
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// List every file under every input root, in root order.
    pub fn read_input_paths(&self) -> Result<Vec<InputFile>, DiscoveryError> {
        discover_all(&self.input_roots)
    }

    /// Whether the file at `relative_path` is processed.
    pub fn should_process_file(&self, relative_path: &str) -> bool {
        self.selection.should_process_file(relative_path)
    }

    /// Discover and select files, returning their tokens.
    pub fn tokens(&self) -> Result<Vec<PathToken>, DiscoveryError> {
        let files = self.read_input_paths()?;
        let discovered = files.len();
        let tokens: Vec<_> = self.selection.select(files).iter().map(PathToken::encode).collect();
        tracing::debug!(discovered, selected = tokens.len(), "selected input files");
        Ok(tokens)
    }

    /// Run one build through `cache`.
    pub fn build<C: BuildCache>(&self, cache: &mut C) -> Result<BuildResult, BuildError> {
        let tokens = self.tokens()?;
        tracing::info!(
            files = tokens.len(),
            out_dir = %self.out_dir.display(),
            concurrency = self.options.concurrency,
            "building"
        );

        cache.build_and_cache(&tokens, &self.out_dir, self.options.concurrency, |token, out_dir| {
            self.process_file(token, out_dir)
        })
    }
}
