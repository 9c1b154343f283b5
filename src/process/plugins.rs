//! Built-in plugins.
//!
//! Config files refer to plugins by name; [`plugin_from_config`] maps a
//! `[[plugins]]` entry to one of the plugins below.

use super::{Plugin, PluginError, ProcessResult};
use crate::config::{ConfigError, PluginConfig};
use crate::messages::ResultMessage;
use lightningcss::rules::style::StyleRule;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{MinifyOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Names accepted in `[[plugins]]` entries.
pub const BUILTIN_PLUGINS: &[&str] = &["selector-metadata", "import-dependencies", "minify"];

/// Instantiate a built-in plugin from its config entry.
pub fn plugin_from_config(config: &PluginConfig) -> Result<Box<dyn Plugin>, ConfigError> {
    let options = toml::Value::Table(config.options.clone());
    let plugin_options = |source| ConfigError::PluginOptions { plugin: config.name.clone(), source };

    match config.name.as_str() {
        "selector-metadata" => {
            let plugin = options.try_into::<SelectorMetadata>().map_err(plugin_options)?;
            Ok(Box::new(plugin))
        }
        "import-dependencies" => Ok(Box::new(ImportDependencies)),
        "minify" => Ok(Box::new(Minify)),
        other => Err(ConfigError::UnknownPlugin(other.to_string())),
    }
}

/// Call `f` for every style rule, descending into nested, media and
/// supports blocks.
fn walk_style_rules<'i>(rules: &CssRuleList<'i>, f: &mut dyn FnMut(&StyleRule<'i>)) {
    for rule in &rules.0 {
        match rule {
            CssRule::Style(style) => {
                f(style);
                walk_style_rules(&style.rules, f);
            }
            CssRule::Media(media) => walk_style_rules(&media.rules, f),
            CssRule::Supports(supports) => walk_style_rules(&supports.rules, f),
            _ => {}
        }
    }
}

/// Metadata file written by [`SelectorMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorMetadataFile {
    pub selectors: Vec<String>,
    pub file_name: String,
}

/// Writes the selectors of a stylesheet to `<destination><suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectorMetadata {
    #[serde(default = "default_metadata_suffix")]
    pub suffix: String,
}

fn default_metadata_suffix() -> String {
    ".meta.json".to_string()
}

impl Default for SelectorMetadata {
    fn default() -> Self {
        Self { suffix: default_metadata_suffix() }
    }
}

impl Plugin for SelectorMetadata {
    fn name(&self) -> &str {
        "selector-metadata"
    }

    fn run(
        &self,
        sheet: &mut StyleSheet<'_>,
        result: &mut ProcessResult,
    ) -> Result<(), PluginError> {
        let mut selectors = Vec::new();
        let mut failure = None;
        walk_style_rules(&sheet.rules, &mut |rule| {
            match rule.selectors.to_css_string(PrinterOptions::default()) {
                Ok(selector) => selectors.push(selector),
                Err(e) => failure = Some(e.to_string()),
            }
        });
        if let Some(e) = failure {
            return Err(PluginError::new(format!("could not print selector: {}", e)));
        }

        let file_name = result
            .destination()
            .ok_or_else(|| PluginError::new("no destination to attach metadata to"))?
            .to_string();
        let path = format!("{}{}", file_name, self.suffix);
        let metadata = SelectorMetadataFile { selectors, file_name };
        let content = serde_json::to_string(&metadata).map_err(|e| PluginError::new(e.to_string()))?;

        result.push_message(ResultMessage::write_file(self.name(), path, content));
        Ok(())
    }
}

/// Declares every local `@import` target as a dependency.
///
/// A URL is resolved against the importing file's directory first, then
/// against each input root in order. The first existing candidate wins;
/// unresolvable imports are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportDependencies;

impl ImportDependencies {
    fn is_remote(url: &str) -> bool {
        url.contains("://") || url.starts_with("//") || url.starts_with("data:")
    }

    fn resolve(url: &str, importer: &Path, input_roots: &[PathBuf]) -> Option<PathBuf> {
        let relative = url.trim_start_matches('/');
        let beside = importer.parent().map(|dir| dir.join(relative));
        beside
            .into_iter()
            .chain(input_roots.iter().map(|root| root.join(relative)))
            .find(|candidate| candidate.is_file())
    }
}

impl Plugin for ImportDependencies {
    fn name(&self) -> &str {
        "import-dependencies"
    }

    fn run(
        &self,
        sheet: &mut StyleSheet<'_>,
        result: &mut ProcessResult,
    ) -> Result<(), PluginError> {
        let mut found = Vec::new();
        for rule in &sheet.rules.0 {
            let CssRule::Import(import) = rule else { continue };
            let url: &str = &import.url;
            if Self::is_remote(url) {
                continue;
            }
            match Self::resolve(url, &result.opts.absolute_path, &result.opts.input_roots) {
                Some(path) => found.push(path),
                None => tracing::debug!(url, file = %result.opts.from, "unresolved @import"),
            }
        }

        for path in found {
            let message = ResultMessage::dependency(self.name(), path.to_string_lossy());
            result.push_message(message);
        }
        Ok(())
    }
}

/// Minifies the stylesheet and prints it without whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minify;

impl Plugin for Minify {
    fn name(&self) -> &str {
        "minify"
    }

    fn run(
        &self,
        sheet: &mut StyleSheet<'_>,
        result: &mut ProcessResult,
    ) -> Result<(), PluginError> {
        sheet.minify(MinifyOptions::default()).map_err(|e| PluginError::new(e.to_string()))?;
        result.minify = true;
        Ok(())
    }
}
