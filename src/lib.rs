//! framecut - Library for slicing generated character spritesheets
//!
//! This library provides functionality to:
//! - Locate animation rows and segment them into per-pose regions
//! - Render each pose onto a shared, bottom-aligned canvas
//! - Drop near-duplicate poses and fall back gracefully on empty rows
//! - Write frames, preview sheets and JSON manifests

pub mod band;
pub mod cli;
pub mod color;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod manifest;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod segment;
pub mod spritesheet;

pub use config::SlicerConfig;
pub use error::{Diagnostic, SliceError};
pub use models::{Animation, AnimationKind, AnimationSet, Frame};
pub use pipeline::{inspect_spritesheet, slice_spritesheet, SliceOutcome};
