//! Build pipeline module for multicss
//!
//! Turns every selected file under a set of input roots into output files,
//! skipping files whose inputs did not change since the last build.
//!
//! # Overview
//!
//! The build consists of:
//! - **Discovery**: List every file under the input roots
//! - **Selection**: Keep files accepted by extensions and include/exclude filters
//! - **Tokenizing**: Pack each file into a [`PathToken`]
//! - **Caching**: A [`BuildCache`] runs the per-file routine for stale tokens
//!
//! # Example
//!
//! ```ignore
//! use multicss::build::{BuildContext, ManifestCache};
//! use multicss::config::load_config;
//!
//! let config = load_config(None)?;
//! let build = BuildContext::new(config, project_root)?.into_build()?;
//!
//! let result = build.build(&mut ManifestCache::new())?;
//! println!("{}", result.summary());
//! ```

pub mod cache;
pub mod context;
pub mod discovery;
pub mod file;
pub mod manifest;
pub mod pipeline;
pub mod result;
pub mod token;

pub use cache::*;
pub use context::*;
pub use discovery::*;
pub use file::*;
pub use manifest::*;
pub use pipeline::*;
pub use result::*;
pub use token::*;
