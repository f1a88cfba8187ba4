//! Error and diagnostic types for the slicing pipeline

use crate::config::ConfigValidationError;
use crate::models::{AnimationKind, Rect, Region};
use std::fmt;
use thiserror::Error;

/// Failure of a whole slicing run. Nothing is returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SliceError {
    /// Image has zero width or height
    #[error("image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    /// No animation rows were declared
    #[error("no animation rows declared")]
    NoRows,
    /// Thresholds or policies outside their valid ranges
    #[error("invalid configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigValidationError>),
    /// Fewer pixel rows than declared animation rows
    #[error("image height {height} cannot hold {rows} animation rows")]
    TooFewRows { rows: usize, height: u32 },
    /// A row resolved to a band with no height
    #[error("row {row} resolved to an empty band")]
    EmptyBand { row: usize },
    /// Every animation came out empty
    #[error("no frames could be extracted for any animation")]
    NoFrames,
}

fn join_errors(errors: &[ConfigValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Why a candidate region did not become a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// No content pixels inside the region
    Empty,
    /// Width/height ratio outside the accepted envelope
    AspectRatio(f32),
    /// Content shorter than the minimum fraction of row height
    TooShort { height: u32, min_height: f32 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Empty => write!(f, "no content"),
            RejectReason::AspectRatio(ratio) => write!(f, "bad aspect ratio {:.2}", ratio),
            RejectReason::TooShort { height, min_height } => {
                write!(f, "too short ({}px < {:.1}px)", height, min_height)
            }
        }
    }
}

/// A recoverable event observed during slicing.
///
/// Diagnostics never change the outcome of a run; they explain it.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Content band detection found too few bands, the fixed band was used
    BandFallback { animation: AnimationKind, row: usize },
    /// A row had no accepted region and received a synthesized frame
    NoContentDetected { animation: AnimationKind },
    /// A candidate region was dropped
    RegionRejected { animation: AnimationKind, region: Region, reason: RejectReason },
    /// A frame was dropped as a near-duplicate of an earlier one
    DuplicateDropped { animation: AnimationKind, source: Rect, similarity: f32 },
    /// An empty animation borrowed a frame from another animation
    Borrowed { animation: AnimationKind, from: AnimationKind },
    /// A derived animation selected an existing frame
    Derived { animation: AnimationKind, from: AnimationKind, index: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::BandFallback { animation, row } => {
                write!(f, "{}: no content band for row {}, using fixed division", animation, row)
            }
            Diagnostic::NoContentDetected { animation } => {
                write!(f, "{}: no usable region, using fallback frame", animation)
            }
            Diagnostic::RegionRejected { animation, region, reason } => {
                write!(f, "{}: region {} rejected, {}", animation, region, reason)
            }
            Diagnostic::DuplicateDropped { animation, source, similarity } => {
                write!(f, "{}: frame {} dropped as duplicate ({:.2})", animation, source, similarity)
            }
            Diagnostic::Borrowed { animation, from } => {
                write!(f, "{}: empty, borrowed first frame of {}", animation, from)
            }
            Diagnostic::Derived { animation, from, index } => {
                write!(f, "{}: uses {} frame {}", animation, from, index)
            }
        }
    }
}
