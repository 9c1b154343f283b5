//! Configuration schema types for `multicss.toml`
//!
//! Defines the structure and validation rules for a multicss project.

use crate::messages::Encoding;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required)
    pub name: String,
    /// Input roots, scanned in order
    #[serde(default = "default_inputs")]
    pub inputs: Vec<PathBuf>,
    /// Build output directory
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

fn default_inputs() -> Vec<PathBuf> {
    vec![PathBuf::from("src")]
}

fn default_out() -> PathBuf {
    PathBuf::from("dist")
}

/// File selection and encoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CssConfig {
    /// Extensions of files to process
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Extension of output files; keeps the source extension when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_extension: Option<String>,
    /// Files to process regardless of extension.
    ///
    /// Entries are file names or `{ pattern = "regex" }` tables. Kept as raw
    /// values so that bad entries are reported with their original text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<toml::Value>>,
    /// Files never to process; wins over `include`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<toml::Value>>,
    /// Encoding used to read sources
    #[serde(default)]
    pub input_encoding: Encoding,
    /// Default encoding for written files
    #[serde(default)]
    pub output_encoding: Encoding,
    /// Maximum files processed at once; overrides `JOBS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Target browsers, handed to plugins
    #[serde(default)]
    pub browsers: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["css".to_string()]
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            target_extension: None,
            include: None,
            exclude: None,
            input_encoding: Encoding::Utf8,
            output_encoding: Encoding::Utf8,
            concurrency: None,
            browsers: Vec::new(),
        }
    }
}

/// A `[[plugins]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Built-in plugin name
    pub name: String,
    /// Plugin specific options
    #[serde(default)]
    pub options: toml::Table,
}

impl PluginConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), options: toml::Table::new() }
    }
}

/// Complete multicss.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiCssConfig {
    /// Project metadata (required)
    pub project: ProjectConfig,
    /// Selection and encoding settings
    #[serde(default)]
    pub css: CssConfig,
    /// Plugin chain, run in order
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "css.extensions")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "multicss.toml: '{}' {}", self.field, self.message)
    }
}

impl MultiCssConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: &str| {
            errors.push(ConfigValidationError { field, message: message.to_string() });
        };

        if self.project.name.is_empty() {
            push("project.name".to_string(), "must be a non-empty string");
        }

        if self.project.inputs.is_empty() {
            push("project.inputs".to_string(), "must contain at least one directory");
        }

        if self.css.extensions.is_empty() {
            push("css.extensions".to_string(), "must contain at least one extension");
        }
        for (i, ext) in self.css.extensions.iter().enumerate() {
            if ext.is_empty() {
                push(format!("css.extensions[{}]", i), "must be a non-empty string");
            }
        }

        if matches!(self.css.target_extension.as_deref(), Some("")) {
            push("css.target_extension".to_string(), "must be a non-empty string when set");
        }

        if self.css.concurrency == Some(0) {
            push("css.concurrency".to_string(), "must be a positive integer");
        }

        for (i, plugin) in self.plugins.iter().enumerate() {
            if plugin.name.is_empty() {
                push(format!("plugins[{}].name", i), "must be a non-empty string");
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parse() {
        let toml = r#"
[project]
name = "test-project"
"#;
        let config: MultiCssConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.project.name, "test-project");
        assert_eq!(config.project.inputs, vec![PathBuf::from("src")]);
        assert_eq!(config.project.out, PathBuf::from("dist"));
        assert_eq!(config.css.extensions, vec!["css"]);
        assert_eq!(config.css.input_encoding, Encoding::Utf8);
        assert_eq!(config.css.output_encoding, Encoding::Utf8);
        assert!(config.css.include.is_none());
        assert!(config.css.concurrency.is_none());
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
name = "site"
inputs = ["styles", "vendor"]
out = "public/css"

[css]
extensions = ["css", "pcss"]
target_extension = "css"
include = ["reset.scss", { pattern = "^theme/" }]
exclude = [{ pattern = "\\.min\\.css$" }]
input_encoding = "utf8"
output_encoding = "binary"
concurrency = 3
browsers = ["> 1%", "last 2 versions"]

[[plugins]]
name = "selector-metadata"
[plugins.options]
suffix = ".sel.json"

[[plugins]]
name = "minify"
"#;
        let config: MultiCssConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.project.inputs.len(), 2);
        assert_eq!(config.project.out, PathBuf::from("public/css"));
        assert_eq!(config.css.extensions, vec!["css", "pcss"]);
        assert_eq!(config.css.target_extension.as_deref(), Some("css"));
        assert_eq!(config.css.include.as_ref().map(Vec::len), Some(2));
        assert_eq!(config.css.exclude.as_ref().map(Vec::len), Some(1));
        assert_eq!(config.css.output_encoding, Encoding::Binary);
        assert_eq!(config.css.concurrency, Some(3));
        assert_eq!(config.css.browsers.len(), 2);

        assert_eq!(config.plugins.len(), 2);
        assert_eq!(config.plugins[0].name, "selector-metadata");
        assert_eq!(
            config.plugins[0].options.get("suffix").and_then(|v| v.as_str()),
            Some(".sel.json")
        );
        assert!(config.plugins[1].options.is_empty());
        assert!(config.is_valid());
    }

    #[test]
    fn test_invalid_encoding_rejected() {
        let toml = r#"
[project]
name = "x"

[css]
input_encoding = "latin1"
"#;
        assert!(toml::from_str::<MultiCssConfig>(toml).is_err());
    }

    #[test]
    fn test_validation_empty_name() {
        let toml = r#"
[project]
name = ""
"#;
        let config: MultiCssConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "project.name"));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let toml = r#"
[project]
name = "x"
inputs = []

[css]
extensions = ["css", ""]
target_extension = ""
concurrency = 0

[[plugins]]
name = ""
"#;
        let config: MultiCssConfig = toml::from_str(toml).unwrap();
        let fields: Vec<_> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "project.inputs",
                "css.extensions[1]",
                "css.target_extension",
                "css.concurrency",
                "plugins[0].name",
            ]
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigValidationError {
            field: "css.concurrency".to_string(),
            message: "must be a positive integer".to_string(),
        };
        assert_eq!(err.to_string(), "multicss.toml: 'css.concurrency' must be a positive integer");
    }
}
