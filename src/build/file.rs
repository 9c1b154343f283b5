//! The per-file build routine.

use crate::build::{destination_path, BuildError, BuildOutcome, MultiCssBuild, PathToken};
use crate::messages::{partition_messages, Content, Encoding, FileToWrite};
use crate::process::{ProcessError, ProcessOptions};
use rayon::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};

impl MultiCssBuild {
    /// Build one file.
    ///
    /// Reads the source behind `token`, runs it through the plugin chain,
    /// writes the primary output and every file requested by a plugin under
    /// `out_dir`, and reports the source plus every declared dependency.
    pub fn process_file(
        &self,
        token: &PathToken,
        out_dir: &Path,
    ) -> Result<BuildOutcome, BuildError> {
        let file = token.decode();
        let css = read_source(&file.absolute_path, self.options.input_encoding)?;

        let to = destination_path(&file.relative_path, self.options.target_extension.as_deref())?;
        let opts = ProcessOptions {
            from: file.relative_path.clone(),
            to: Some(to),
            absolute_path: file.absolute_path.clone(),
            input_root: file.input_root.clone(),
            input_roots: self.input_roots.clone(),
            browsers: self.options.browsers.clone(),
        };

        let result = self.processor.process(&css, opts)?;
        let destination = result
            .destination()
            .ok_or_else(|| ProcessError::MissingDestination(file.relative_path.clone()))?
            .to_string();

        let (extra_files, extra_dependencies) = partition_messages(&result.messages)?;
        let mut files = Vec::with_capacity(extra_files.len() + 1);
        files.push(FileToWrite { path: destination, content: Content::Text(result.css), encoding: None });
        files.extend(extra_files);

        let outputs = write_files(out_dir, &files, self.options.output_encoding)?;

        let mut dependencies = Vec::with_capacity(extra_dependencies.len() + 1);
        dependencies.push(file.absolute_path);
        dependencies.extend(extra_dependencies);

        tracing::debug!(
            file = %file.relative_path,
            outputs = outputs.len(),
            dependencies = dependencies.len(),
            "built file"
        );
        Ok(BuildOutcome { dependencies, outputs })
    }
}

/// Read a source file.
///
/// Binary sources are decoded lossily since the stylesheet parser needs text.
pub fn read_source(path: &Path, encoding: Encoding) -> Result<String, BuildError> {
    match encoding {
        Encoding::Utf8 => fs::read_to_string(path).map_err(BuildError::io(path)),
        Encoding::Binary => {
            let bytes = fs::read(path).map_err(BuildError::io(path))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Resolve a plugin supplied path below `out_dir`.
///
/// Root and prefix components are dropped, so `/a.css` lands at
/// `out_dir/a.css`. `..` is resolved lexically and may not climb above
/// `out_dir`.
pub fn output_path(out_dir: &Path, path: &str) -> Result<PathBuf, BuildError> {
    let mut parts = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(BuildError::OutsideOutput(path.to_string()));
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    if parts.is_empty() {
        return Err(BuildError::OutsideOutput(path.to_string()));
    }
    Ok(parts.into_iter().fold(out_dir.to_path_buf(), |acc, part| acc.join(part)))
}

/// Write `files` under `out_dir` in parallel.
///
/// Parent directories are created as needed. Returns the written paths in
/// the order of `files`, once every write finished.
pub fn write_files(
    out_dir: &Path,
    files: &[FileToWrite],
    default_encoding: Encoding,
) -> Result<Vec<PathBuf>, BuildError> {
    files
        .par_iter()
        .map(|file| -> Result<PathBuf, BuildError> {
            let path = output_path(out_dir, &file.path)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
            }
            let bytes = file.content.encode(file.encoding.unwrap_or(default_encoding));
            fs::write(&path, bytes).map_err(BuildError::io(&path))?;
            Ok(path)
        })
        .collect()
}
