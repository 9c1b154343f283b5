//! Build Test Suite
//!
//! Integration tests for the multicss build. Tests cover:
//!
//! - End-to-end builds from a config file
//! - File selection across input roots
//! - Plugin messages (extra files, extra dependencies)
//! - Incremental builds and stale output removal

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use lightningcss::stylesheet::StyleSheet;
use tempfile::TempDir;

use multicss::build::{
    BuildContext, BuildError, BuildManifest, BuildOptions, FileStatus, ManifestCache,
    MultiCssBuild,
};
use multicss::config::{load_config, ConfigError, MultiCssConfig};
use multicss::messages::{MessageError, ResultMessage, WRITE_FILE_MESSAGE};
use multicss::process::plugins::SelectorMetadata;
use multicss::process::{Plugin, PluginError, ProcessResult};

// ============================================================================
// Test Utilities
// ============================================================================

/// Create a test file with content.
fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Write multicss.toml into `dir` and load it.
fn write_config(dir: &Path, toml: &str) -> MultiCssConfig {
    let path = create_test_file(dir, "multicss.toml", toml);
    load_config(Some(&path)).expect("should load config")
}

/// Build a project rooted at `dir` from its config.
fn project_build(dir: &Path, toml: &str) -> MultiCssBuild {
    let config = write_config(dir, toml);
    BuildContext::new(config, dir.to_path_buf())
        .expect("should resolve config")
        .into_build()
        .expect("should create build")
}

fn statuses(result: &multicss::build::BuildResult) -> Vec<FileStatus> {
    result.files.iter().map(|f| f.status).collect()
}

const METADATA_PROJECT: &str = r#"
[project]
name = "site"

[[plugins]]
name = "selector-metadata"
"#;

// ============================================================================
// End-to-End
// ============================================================================

#[test]
fn test_selector_metadata_end_to_end() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/foo.css", ".test { color: red }");

    let build = project_build(temp.path(), METADATA_PROJECT);
    let result = build.build(&mut ManifestCache::new()).unwrap();

    let out = temp.path().join("dist");
    assert_eq!(result.built_count(), 1);
    assert!(fs::read_to_string(out.join("foo.css")).unwrap().contains(".test"));
    assert_eq!(
        fs::read_to_string(out.join("foo.css.meta.json")).unwrap(),
        r#"{"selectors":[".test"],"fileName":"foo.css"}"#
    );
}

#[test]
fn test_plugin_chain_runs_in_order() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/a.css", ".a {\n  color: red;\n}\n");

    let build = project_build(
        temp.path(),
        r#"
[project]
name = "site"

[[plugins]]
name = "minify"

[[plugins]]
name = "selector-metadata"
[plugins.options]
suffix = ".selectors.json"
"#,
    );
    build.build(&mut ManifestCache::new()).unwrap();

    let out = temp.path().join("dist");
    assert_eq!(fs::read_to_string(out.join("a.css")).unwrap(), ".a{color:red}");
    assert!(out.join("a.css.selectors.json").exists());
}

#[test]
fn test_target_extension_and_nested_paths() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/components/button.pcss", ".btn { color: red }");

    let build = project_build(
        temp.path(),
        r#"
[project]
name = "site"

[css]
extensions = ["pcss"]
target_extension = "css"

[[plugins]]
name = "selector-metadata"
"#,
    );
    build.build(&mut ManifestCache::new()).unwrap();

    let out = temp.path().join("dist/components");
    assert!(out.join("button.css").exists());
    assert!(!out.join("button.pcss").exists());
    let metadata = fs::read_to_string(out.join("button.css.meta.json")).unwrap();
    assert!(metadata.contains(r#""fileName":"components/button.css""#));
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_multiple_roots_and_filters() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "styles/site.css", ".site {}");
    create_test_file(temp.path(), "styles/readme.md", "# styles");
    create_test_file(temp.path(), "vendor/lib.css", ".lib {}");
    create_test_file(temp.path(), "vendor/lib.min.css", ".lib{}");
    create_test_file(temp.path(), "vendor/extra.txt", ".extra {}");

    let build = project_build(
        temp.path(),
        r#"
[project]
name = "site"
inputs = ["styles", "vendor"]

[css]
include = [{ pattern = "\\.css$" }, "extra.txt"]
exclude = [{ pattern = "\\.min\\.css$" }]

[[plugins]]
name = "minify"
"#,
    );

    let relative: Vec<_> =
        build.tokens().unwrap().iter().map(|t| t.decode().relative_path).collect();
    assert_eq!(relative, vec!["site.css", "extra.txt", "lib.css"]);

    build.build(&mut ManifestCache::new()).unwrap();
    let out = temp.path().join("dist");
    assert!(out.join("site.css").exists());
    assert!(out.join("lib.css").exists());
    assert!(out.join("extra.txt").exists());
    assert!(!out.join("lib.min.css").exists());
    assert!(!out.join("readme.md").exists());
}

#[test]
fn test_invalid_filter_fails_before_build() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        r#"
[project]
name = "site"

[css]
include = [42]

[[plugins]]
name = "minify"
"#,
    );
    let err = BuildContext::new(config, temp.path().to_path_buf()).unwrap_err();
    assert!(matches!(err, ConfigError::Filter(_)));
}

#[test]
fn test_empty_plugin_list_rejected() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "[project]\nname = \"site\"\n");
    let err = BuildContext::new(config, temp.path().to_path_buf())
        .and_then(BuildContext::into_build)
        .unwrap_err();
    assert_eq!(err.to_string(), "You must provide at least one plugin to the 'plugins' array");
}

// ============================================================================
// Plugin Messages
// ============================================================================

/// Emits a write-file message without a path.
struct BrokenWriter;

impl Plugin for BrokenWriter {
    fn name(&self) -> &str {
        "broken-writer"
    }

    fn run(&self, _: &mut StyleSheet<'_>, result: &mut ProcessResult) -> Result<(), PluginError> {
        result.push_message(ResultMessage::new(WRITE_FILE_MESSAGE, "broken-writer"));
        Ok(())
    }
}

#[test]
fn test_invalid_message_fails_build() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("src");
    create_test_file(&root, "a.css", ".a {}");

    let build = MultiCssBuild::new(
        vec![root],
        temp.path().join("dist"),
        BuildOptions::default(),
        vec![Box::new(BrokenWriter)],
    )
    .unwrap();

    let err = build.build(&mut ManifestCache::new()).unwrap_err();
    assert!(matches!(err, BuildError::Message(MessageError::MissingPath(_))));
    assert_eq!(err.to_string(), "'WriteFileMessage' is missing a valid 'path'.");
}

#[test]
fn test_parse_error_names_file() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/bad.css", "..bad { color: red }");

    let build = project_build(temp.path(), METADATA_PROJECT);
    let err = build.build(&mut ManifestCache::new()).unwrap_err();
    assert!(err.to_string().contains("bad.css"));
}

// ============================================================================
// Incremental Builds
// ============================================================================

#[test]
fn test_second_build_skips_unchanged() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/a.css", ".a {}");
    create_test_file(temp.path(), "src/b.css", ".b {}");

    let build = project_build(temp.path(), METADATA_PROJECT);
    let mut cache = ManifestCache::new();

    let first = build.build(&mut cache).unwrap();
    assert_eq!(statuses(&first), vec![FileStatus::Built, FileStatus::Built]);

    create_test_file(temp.path(), "src/b.css", ".b { color: blue }");
    let second = build.build(&mut cache).unwrap();
    assert_eq!(statuses(&second), vec![FileStatus::Skipped, FileStatus::Built]);
}

#[test]
fn test_deleted_output_triggers_rebuild() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/a.css", ".a {}");

    let build = project_build(temp.path(), METADATA_PROJECT);
    let mut cache = ManifestCache::new();
    build.build(&mut cache).unwrap();

    fs::remove_file(temp.path().join("dist/a.css.meta.json")).unwrap();
    let result = build.build(&mut cache).unwrap();
    assert_eq!(result.built_count(), 1);
    assert!(temp.path().join("dist/a.css.meta.json").exists());
}

#[test]
fn test_imported_dependency_change_triggers_rebuild() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/main.css", "@import \"_vars.css\";\n.main { color: red }");
    let vars = create_test_file(temp.path(), "src/_vars.css", ".vars { color: blue }");

    let build = project_build(
        temp.path(),
        r#"
[project]
name = "site"

[css]
exclude = [{ pattern = "^_" }]

[[plugins]]
name = "import-dependencies"
"#,
    );
    let mut cache = ManifestCache::new();
    build.build(&mut cache).unwrap();

    let out = temp.path().join("dist");
    let manifest = BuildManifest::load_from_dir(&out).unwrap().unwrap();
    let entry = manifest.entries.values().next().unwrap();
    assert!(entry.dependencies.contains_key(&vars.to_string_lossy().to_string()));

    assert_eq!(build.build(&mut cache).unwrap().skipped_count(), 1);

    create_test_file(temp.path(), "src/_vars.css", ".vars { color: green }");
    assert_eq!(build.build(&mut cache).unwrap().built_count(), 1);
}

#[test]
fn test_removed_source_outputs_deleted() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/keep.css", ".keep {}");
    let gone = create_test_file(temp.path(), "src/gone.css", ".gone {}");

    let build = project_build(temp.path(), METADATA_PROJECT);
    let mut cache = ManifestCache::new();
    build.build(&mut cache).unwrap();

    let out = temp.path().join("dist");
    assert!(out.join("gone.css").exists());

    fs::remove_file(gone).unwrap();
    let result = build.build(&mut cache).unwrap();
    assert_eq!(result.removed.len(), 2);
    assert!(!out.join("gone.css").exists());
    assert!(!out.join("gone.css.meta.json").exists());
    assert!(out.join("keep.css").exists());
}

#[test]
fn test_force_rebuilds_all() {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), "src/a.css", ".a {}");
    create_test_file(temp.path(), "src/b.css", ".b {}");

    let build = project_build(temp.path(), METADATA_PROJECT);
    build.build(&mut ManifestCache::new()).unwrap();

    let result = build.build(&mut ManifestCache::new().with_force(true)).unwrap();
    assert_eq!(result.built_count(), 2);
    assert_eq!(result.skipped_count(), 0);
}

#[test]
fn test_direct_build_without_config() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("in");
    create_test_file(&root, "x.css", ".x { color: red }");

    let build = MultiCssBuild::new(
        vec![root],
        temp.path().join("out"),
        BuildOptions { concurrency: 1, ..BuildOptions::default() },
        vec![Box::new(SelectorMetadata { suffix: ".json".to_string() })],
    )
    .unwrap();
    let result = build.build(&mut ManifestCache::new()).unwrap();

    assert_eq!(result.all_outputs().len(), 2);
    assert!(temp.path().join("out/x.css.json").exists());
}
