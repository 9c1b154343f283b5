//! Build command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{load_project, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{BuildContext, ManifestCache};
use crate::config::{merge_cli_overrides, CliOverrides};

/// Run the build command
pub fn run_build(
    config_path: Option<&Path>,
    out: Option<PathBuf>,
    inputs: Vec<PathBuf>,
    jobs: Option<usize>,
    force: bool,
) -> ExitCode {
    if jobs == Some(0) {
        eprintln!("Error: --jobs must be at least 1");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let (mut config, project_root) = match load_project(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let overrides = CliOverrides { out, inputs, jobs };
    merge_cli_overrides(&mut config, &overrides);

    let build = match BuildContext::new(config, project_root).and_then(|ctx| ctx.into_build()) {
        Ok(build) => build,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if force {
        println!("Building (force rebuild, ignoring manifest)...");
    } else {
        println!("Building (incremental)...");
    }

    let mut cache = ManifestCache::new().with_force(force);
    match build.build(&mut cache) {
        Ok(result) => {
            println!("{}", result.summary());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Build error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
