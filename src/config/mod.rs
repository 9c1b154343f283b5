//! Configuration module for the multicss build
//!
//! Provides types, discovery and parsing for `multicss.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
