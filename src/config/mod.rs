//! Configuration for the slicing pipeline
//!
//! Provides the `framecut.toml` schema and the loader that discovers,
//! validates and merges it with command-line overrides.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
