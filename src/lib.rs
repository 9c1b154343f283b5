//! multicss - Library for building a tree of stylesheets through a plugin chain
//!
//! This library provides functionality to:
//! - Discover files under several input roots and select them by extension
//!   or include/exclude filters
//! - Process each file with an ordered chain of lightningcss plugins
//! - Write extra files and track extra dependencies requested by plugins
//! - Skip unchanged files using a build manifest

pub mod build;
pub mod cli;
pub mod config;
pub mod extension;
pub mod filter;
pub mod messages;
pub mod process;
