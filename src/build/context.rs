//! Build context containing configuration and state for a build.

use crate::build::{BuildOptions, MultiCssBuild, Selection};
use crate::config::{jobs_from_env, resolve_concurrency, ConfigError, MultiCssConfig};
use crate::filter::FileFilterList;
use crate::process::plugins::plugin_from_config;
use crate::process::Plugin;
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a build operation.
///
/// Construction resolves everything that can fail before any file is
/// touched: filter lists, plugin names and options, and the concurrency
/// bound (the only place `JOBS` is read).
pub struct BuildContext {
    /// The loaded configuration
    config: MultiCssConfig,
    /// Project root directory (where multicss.toml is located)
    project_root: PathBuf,
    /// Options resolved from `config`
    options: BuildOptions,
    /// Plugin chain built from `config`
    plugins: Vec<Box<dyn Plugin>>,
}

impl BuildContext {
    /// Create a new build context.
    ///
    /// # Arguments
    /// - `config` - The loaded configuration
    /// - `project_root` - The project root directory
    pub fn new(config: MultiCssConfig, project_root: PathBuf) -> Result<Self, ConfigError> {
        let css = &config.css;
        let include = css.include.as_deref().map(FileFilterList::from_values).transpose()?;
        let exclude = css.exclude.as_deref().map(FileFilterList::from_values).transpose()?;

        let options = BuildOptions {
            extensions: css.extensions.clone(),
            target_extension: css.target_extension.clone(),
            include,
            exclude,
            input_encoding: css.input_encoding,
            output_encoding: css.output_encoding,
            concurrency: resolve_concurrency(css.concurrency, jobs_from_env().as_deref()),
            browsers: css.browsers.clone(),
        };

        let plugins = config.plugins.iter().map(plugin_from_config).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { config, project_root, options, plugins })
    }

    /// Get the configuration.
    pub fn config(&self) -> &MultiCssConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the resolved build options.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Names of the configured plugins, in run order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Get the input roots (resolved to absolute paths).
    pub fn input_roots(&self) -> Vec<PathBuf> {
        self.config.project.inputs.iter().map(|p| self.resolve_path(p)).collect()
    }

    /// Get the output directory (resolved to absolute path).
    pub fn out_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.out)
    }

    /// Selection rules from the config.
    pub fn selection(&self) -> Selection {
        self.options.selection()
    }

    /// Resolve a path relative to the project root.
    ///
    /// If the path is absolute, returns it unchanged.
    /// If relative, joins it with the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::config::resolve_path(&self.project_root, path)
    }

    /// Turn the context into a runnable build.
    ///
    /// Fails when no plugins are configured.
    pub fn into_build(self) -> Result<MultiCssBuild, ConfigError> {
        let input_roots = self.input_roots();
        let out_dir = self.out_dir();
        MultiCssBuild::new(input_roots, out_dir, self.options, self.plugins)
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("project_root", &self.project_root)
            .field("options", &self.options)
            .field("plugins", &self.plugin_names())
            .finish()
    }
}
