//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod ls;

use crate::config::{default_config, find_config, load_config, ConfigError, MultiCssConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// multicss - Run every stylesheet in a tree through a plugin chain
#[derive(Parser)]
#[command(name = "mcss")]
#[command(about = "multicss - Run every stylesheet under a set of input directories through a plugin chain")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build all selected files, skipping unchanged ones
    Build {
        /// Config file (default: nearest multicss.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Input directory; repeat for several (replaces config inputs)
        #[arg(short, long = "input")]
        inputs: Vec<PathBuf>,

        /// Maximum number of files processed at once
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Rebuild everything, ignoring the manifest
        #[arg(long)]
        force: bool,

        /// Show debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the files a build would process and where they go
    Ls {
        /// Config file (default: nearest multicss.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Input directory; repeat for several (replaces config inputs)
        #[arg(short, long = "input")]
        inputs: Vec<PathBuf>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, out, inputs, jobs, force, verbose } => {
            init_logging(verbose);
            build::run_build(config.as_deref(), out, inputs, jobs, force)
        }
        Commands::Ls { config, inputs } => {
            init_logging(false);
            ls::run_ls(config.as_deref(), inputs)
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over `verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "multicss=debug" } else { "multicss=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the config and find the project root.
///
/// An explicit path must exist. Without one the nearest multicss.toml is
/// used, falling back to defaults rooted at the current directory.
pub(crate) fn load_project(
    config_path: Option<&Path>,
) -> Result<(MultiCssConfig, PathBuf), ConfigError> {
    let cwd = std::env::current_dir()?;
    let path = config_path.map(Path::to_path_buf).or_else(find_config);

    match path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "using config");
            let config = load_config(Some(&path))?;
            let root = match crate::config::project_root(&path) {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => cwd.clone(),
            };
            Ok((config, crate::config::resolve_path(&cwd, &root)))
        }
        None => {
            tracing::debug!("no multicss.toml found, using defaults");
            Ok((default_config(), cwd))
        }
    }
}
