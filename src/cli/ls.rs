//! List command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{load_project, EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{destination_path, discover_all, BuildContext};
use crate::config::{merge_cli_overrides, CliOverrides};

/// Run the ls command
///
/// Prints one `source -> destination` line per selected file. Destinations
/// are the defaults; plugins may still move files during a build.
pub fn run_ls(config_path: Option<&Path>, inputs: Vec<PathBuf>) -> ExitCode {
    let (mut config, project_root) = match load_project(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    merge_cli_overrides(&mut config, &CliOverrides { inputs, ..Default::default() });

    let ctx = match BuildContext::new(config, project_root) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let files = match discover_all(&ctx.input_roots()) {
        Ok(files) => ctx.selection().select(files),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let target_extension = ctx.options().target_extension.as_deref();
    for file in &files {
        match destination_path(&file.relative_path, target_extension) {
            Ok(to) => println!("{} -> {}", file.absolute_path.display(), to),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }
    println!("{} file(s)", files.len());

    ExitCode::from(EXIT_SUCCESS)
}
