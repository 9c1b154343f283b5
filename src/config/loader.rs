//! Configuration loading and discovery for `multicss.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{CssConfig, MultiCssConfig, ProjectConfig};
use crate::filter::FilterError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILENAME: &str = "multicss.toml";

/// Environment variable overriding the default concurrency
pub const JOBS_ENV: &str = "JOBS";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse multicss.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    /// No plugins configured
    #[error("You must provide at least one plugin to the 'plugins' array")]
    EmptyPluginList,
    /// Bad include/exclude entry
    #[error(transparent)]
    Filter(#[from] FilterError),
    /// Plugin name not recognised
    #[error("Unknown plugin '{0}'")]
    UnknownPlugin(String),
    /// Plugin options did not deserialize
    #[error("Invalid options for plugin '{plugin}': {source}")]
    PluginOptions {
        plugin: String,
        #[source]
        source: toml::de::Error,
    },
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output directory
    pub out: Option<PathBuf>,
    /// Replace the input roots
    pub inputs: Vec<PathBuf>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

/// Find multicss.toml by walking up from the current working directory.
///
/// # Example
/// ```ignore
/// if let Some(config_path) = find_config() {
///     println!("Found config at: {}", config_path.display());
/// }
/// ```
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find multicss.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a multicss.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<MultiCssConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<MultiCssConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: MultiCssConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    tracing::debug!(path = %path.display(), plugins = config.plugins.len(), "loaded config");
    Ok(config)
}

/// Create a default configuration when no multicss.toml is found.
///
/// The project name is the current directory name. The plugin list is
/// empty, so building with it fails until plugins are configured.
pub fn default_config() -> MultiCssConfig {
    let project_name = env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unnamed".to_string());

    MultiCssConfig {
        project: ProjectConfig {
            name: project_name,
            inputs: vec![PathBuf::from("src")],
            out: PathBuf::from("dist"),
        },
        css: CssConfig::default(),
        plugins: Vec::new(),
    }
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut MultiCssConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.project.out = out.clone();
    }

    if !overrides.inputs.is_empty() {
        config.project.inputs = overrides.inputs.clone();
    }

    if let Some(jobs) = overrides.jobs {
        config.css.concurrency = Some(jobs);
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Concurrency used when nothing else is configured: one less than the
/// number of available cores, at least 1.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).saturating_sub(1).max(1)
}

/// Read the raw `JOBS` value, if set.
pub fn jobs_from_env() -> Option<String> {
    env::var(JOBS_ENV).ok()
}

/// Pick the concurrency bound.
///
/// An explicit value wins, then a positive integer in `jobs_env`, then
/// [`default_concurrency`].
pub fn resolve_concurrency(explicit: Option<usize>, jobs_env: Option<&str>) -> usize {
    if let Some(n) = explicit {
        return n.max(1);
    }
    match jobs_env.map(str::trim) {
        None | Some("") => default_concurrency(),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                tracing::warn!(value = raw, "ignoring invalid {} value", JOBS_ENV);
                default_concurrency()
            }
        },
    }
}
