//! Slicing orchestration
//!
//! [`slice_spritesheet`] runs every stage for each declared row in order:
//! band location, segmentation, acceptance, then (once the shared canvas is
//! known) rendering and deduplication. A row without any accepted region
//! either gets a synthesized fallback frame or borrows the first frame of
//! another animation, as its policy says. Derived animations reuse
//! existing frames.
//!
//! # Example
//!
//! ```
//! use framecut::config::SlicerConfig;
//! use framecut::models::AnimationKind;
//! use framecut::pipeline::slice_spritesheet;
//! use image::{Rgba, RgbaImage};
//!
//! let mut sheet = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
//! for y in 20..80 {
//!     for x in 70..110 {
//!         sheet.put_pixel(x, y, Rgba([0, 0, 0, 255]));
//!         sheet.put_pixel(x, y + 100, Rgba([0, 0, 0, 255]));
//!     }
//! }
//!
//! let outcome = slice_spritesheet(&sheet, &SlicerConfig::default()).unwrap();
//! assert_eq!(outcome.set.frames(AnimationKind::Idle).len(), 1);
//! assert_eq!(outcome.set.frames(AnimationKind::Jump).len(), 1);
//! ```

use crate::band::{detect_content_bands, fixed_band, select_band};
use crate::color::parse_hex_color;
use crate::config::{BandStrategy, ClassifierConfig, EmptyRow, ExtractionMode, RowConfig, SliceMode, SlicerConfig};
use crate::dedup::Deduplicator;
use crate::error::{Diagnostic, RejectReason, SliceError};
use crate::extract::{canvas_size, check_acceptance, content_rect, render_frame};
use crate::fallback::fallback_frame;
use crate::models::{Animation, AnimationKind, AnimationSet, Frame, Rect, Region};
use crate::segment::{equal_cells, segment_band};
use image::{Rgba, RgbaImage};
use serde::Serialize;

/// Result of a successful slicing run
#[derive(Debug, Clone)]
pub struct SliceOutcome {
    pub set: AnimationSet,
    /// Recoverable events, in the order they happened
    pub diagnostics: Vec<Diagnostic>,
}

/// One candidate region of a row, as seen by [`inspect_spritesheet`]
#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    pub region: Region,
    /// Tight content box, zero-sized when the region is empty
    pub content: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
}

impl RegionReport {
    pub fn accepted(&self) -> bool {
        self.rejected.is_none()
    }
}

/// Bands and regions of one declared row
#[derive(Debug, Clone, Serialize)]
pub struct RowReport {
    pub animation: AnimationKind,
    pub band: Rect,
    /// Content band detection came up short and the fixed band was used
    pub band_fallback: bool,
    pub regions: Vec<RegionReport>,
}

/// A located band
#[derive(Debug, Clone, Copy)]
struct Band {
    rect: Rect,
    fell_back: bool,
}

/// A candidate region with its content box and acceptance verdict
struct Candidate {
    region: Region,
    content: Rect,
    verdict: Result<(), RejectReason>,
}

/// Per-row state between the scan and render passes
struct RowPlan<'a> {
    row: &'a RowConfig,
    band: Rect,
    accepted: Vec<Rect>,
}

/// Background color for a run: the configured override, else the top-left pixel.
pub fn resolve_background(image: &RgbaImage, classifier: &ClassifierConfig) -> Rgba<u8> {
    let sampled = || *image.get_pixel(0, 0);
    match &classifier.background {
        Some(hex) => match parse_hex_color(hex) {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!("Ignoring background override '{}': {}", hex, e);
                sampled()
            }
        },
        None => sampled(),
    }
}

fn validate_input(image: &RgbaImage, config: &SlicerConfig) -> Result<(), SliceError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(SliceError::EmptyImage { width, height });
    }
    if config.rows.is_empty() {
        return Err(SliceError::NoRows);
    }
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(SliceError::InvalidConfig(errors));
    }
    if (height as usize) < config.rows.len() {
        return Err(SliceError::TooFewRows { rows: config.rows.len(), height });
    }
    Ok(())
}

fn locate_bands(
    image: &RgbaImage,
    background: Rgba<u8>,
    config: &SlicerConfig,
) -> Result<Vec<Band>, SliceError> {
    let rows = config.rows.len();
    let detected = match config.layout.bands {
        BandStrategy::Fixed => None,
        BandStrategy::Content => {
            Some(detect_content_bands(image, background, &config.classifier, config.layout.min_band_height))
        }
    };

    (0..rows)
        .map(|index| {
            let fixed = fixed_band(image, index, rows);
            let band = match &detected {
                None => Band { rect: fixed, fell_back: false },
                Some(bands) => match select_band(bands, index, rows) {
                    Some(rect) => Band { rect, fell_back: false },
                    None => Band { rect: fixed, fell_back: true },
                },
            };
            if band.rect.is_empty() {
                return Err(SliceError::EmptyBand { row: index });
            }
            Ok(band)
        })
        .collect()
}

fn scan_row(
    image: &RgbaImage,
    band: Rect,
    background: Rgba<u8>,
    config: &SlicerConfig,
    row: &RowConfig,
) -> Vec<Candidate> {
    let regions = match (config.layout.mode, row.frames) {
        (SliceMode::Manual, Some(frames)) => equal_cells(band, frames),
        _ => segment_band(image, band, background, &config.classifier, &config.segmenter),
    };

    let policy = row.policy();
    regions
        .into_iter()
        .map(|region| {
            let content = content_rect(image, region, band, background, &config.classifier);
            let verdict = check_acceptance(content, band.height, &policy);
            Candidate { region, content, verdict }
        })
        .collect()
}

/// Segment every declared row without rendering anything.
pub fn inspect_spritesheet(image: &RgbaImage, config: &SlicerConfig) -> Result<Vec<RowReport>, SliceError> {
    validate_input(image, config)?;
    let background = resolve_background(image, &config.classifier);
    let bands = locate_bands(image, background, config)?;

    Ok(config
        .rows
        .iter()
        .zip(bands)
        .map(|(row, band)| RowReport {
            animation: row.kind,
            band: band.rect,
            band_fallback: band.fell_back,
            regions: scan_row(image, band.rect, background, config, row)
                .into_iter()
                .map(|c| RegionReport {
                    region: c.region,
                    content: c.content,
                    rejected: c.verdict.err().map(|reason| reason.to_string()),
                })
                .collect(),
        })
        .collect())
}

/// Slice a spritesheet into normalized animation frames.
///
/// The input image is never modified. Every frame of the returned set has
/// the same dimensions and no animation is empty.
///
/// # Errors
///
/// Fails on an empty image, on a configuration that does not validate,
/// when the image has fewer pixel rows than declared animations, or when no
/// animation yields any frame.
pub fn slice_spritesheet(image: &RgbaImage, config: &SlicerConfig) -> Result<SliceOutcome, SliceError> {
    let _span =
        tracing::info_span!("slice_spritesheet", width = image.width(), height = image.height()).entered();
    validate_input(image, config)?;

    let background = resolve_background(image, &config.classifier);
    let bands = locate_bands(image, background, config)?;
    let mut diagnostics = Vec::new();

    let mut plans = Vec::with_capacity(config.rows.len());
    for (index, (row, band)) in config.rows.iter().zip(&bands).enumerate() {
        if band.fell_back {
            tracing::debug!("{}: too few content bands, using fixed row {}", row.kind, index);
            diagnostics.push(Diagnostic::BandFallback { animation: row.kind, row: index });
        }

        let candidates = scan_row(image, band.rect, background, config, row);
        let mut accepted = Vec::new();
        for candidate in candidates {
            match candidate.verdict {
                Ok(()) => {
                    tracing::debug!("{}: region {} accepted, {}", row.kind, candidate.region, candidate.content);
                    accepted.push(candidate.content);
                }
                Err(reason) => {
                    let diagnostic =
                        Diagnostic::RegionRejected { animation: row.kind, region: candidate.region, reason };
                    tracing::debug!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }
        }

        if row.extraction == ExtractionMode::Best {
            accepted = largest(&accepted).into_iter().collect();
        }
        plans.push(RowPlan { row, band: band.rect, accepted });
    }

    let rects: Vec<Rect> = plans.iter().flat_map(|plan| plan.accepted.iter().copied()).collect();
    let max_row_height = bands.iter().map(|band| band.rect.height).max().unwrap_or(0);
    let canvas = canvas_size(&rects, max_row_height, config.canvas.padding);
    tracing::debug!("Canvas {}x{} from {} accepted regions", canvas.0, canvas.1, rects.len());

    let mut animations = Vec::with_capacity(plans.len() + 1);
    for plan in &plans {
        let animation = render_row(image, plan, canvas, background, config, &mut diagnostics);
        tracing::info!("{}: {} frames", animation.kind, animation.frames.len());
        animations.push(animation);
    }

    borrow_for_empty(&mut animations, &mut diagnostics)?;

    if config.jump.enabled && !animations.iter().any(|a| a.kind == AnimationKind::Jump) {
        if let Some((from, index, frame)) = pick_jump_frame(&animations, config.jump.run_index) {
            let diagnostic = Diagnostic::Derived { animation: AnimationKind::Jump, from, index };
            tracing::debug!("{}", diagnostic);
            diagnostics.push(diagnostic);

            let mut jump = Animation::new(AnimationKind::Jump);
            jump.frames.push(frame);
            animations.push(jump);
        }
    }

    Ok(SliceOutcome { set: AnimationSet { animations, canvas, background }, diagnostics })
}

fn render_row(
    image: &RgbaImage,
    plan: &RowPlan<'_>,
    canvas: (u32, u32),
    background: Rgba<u8>,
    config: &SlicerConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Animation {
    let kind = plan.row.kind;
    let mut animation = Animation::new(kind);
    if let Some(fps) = plan.row.fps {
        animation.fps = fps;
    }
    if let Some(looping) = plan.row.looping {
        animation.looping = looping;
    }

    if plan.accepted.is_empty() {
        // Borrowing rows stay empty until every row is rendered
        if plan.row.policy().on_empty == EmptyRow::Fallback {
            let diagnostic = Diagnostic::NoContentDetected { animation: kind };
            tracing::info!("{}", diagnostic);
            diagnostics.push(diagnostic);
            animation.frames.push(fallback_frame(image, plan.band, canvas, background));
        }
        return animation;
    }

    let mut dedup = plan.row.dedup.then(|| Deduplicator::new(background, &config.classifier, &config.dedup));
    for &rect in &plan.accepted {
        let rendered = render_frame(image, rect, canvas, background, &config.classifier, &config.canvas);
        if let Some(similarity) = dedup.as_mut().and_then(|d| d.offer(&rendered)) {
            let diagnostic = Diagnostic::DuplicateDropped { animation: kind, source: rect, similarity };
            tracing::debug!("{}", diagnostic);
            diagnostics.push(diagnostic);
            continue;
        }
        animation.frames.push(Frame { image: rendered, source: Some(rect), synthesized: false });
    }
    animation
}

/// Largest rect by area; the leftmost wins ties.
fn largest(rects: &[Rect]) -> Option<Rect> {
    rects.iter().copied().fold(None, |best, rect| match best {
        Some(b) if b.area() >= rect.area() => Some(b),
        _ => Some(rect),
    })
}

/// Give every empty animation the first frame of the first non-empty one.
fn borrow_for_empty(animations: &mut [Animation], diagnostics: &mut Vec<Diagnostic>) -> Result<(), SliceError> {
    let donor = animations
        .iter()
        .find_map(|a| a.frames.first().map(|frame| (a.kind, reused(frame))))
        .ok_or(SliceError::NoFrames)?;

    for animation in animations.iter_mut().filter(|a| a.frames.is_empty()) {
        let diagnostic = Diagnostic::Borrowed { animation: animation.kind, from: donor.0 };
        tracing::info!("{}", diagnostic);
        diagnostics.push(diagnostic);
        animation.frames.push(donor.1.clone());
    }
    Ok(())
}

/// Jump pose: the configured run frame, else the first idle frame, else
/// the first frame of anything.
fn pick_jump_frame(animations: &[Animation], run_index: usize) -> Option<(AnimationKind, usize, Frame)> {
    let frames_of = |kind| animations.iter().find(|a| a.kind == kind).map(|a| a.frames.as_slice());

    if let Some(frame) = frames_of(AnimationKind::Run).and_then(|frames| frames.get(run_index)) {
        return Some((AnimationKind::Run, run_index, reused(frame)));
    }
    if let Some(frame) = frames_of(AnimationKind::Idle).and_then(|frames| frames.first()) {
        return Some((AnimationKind::Idle, 0, reused(frame)));
    }
    animations.iter().find_map(|a| a.frames.first().map(|frame| (a.kind, 0, reused(frame))))
}

/// Copy of a frame placed into another animation
fn reused(frame: &Frame) -> Frame {
    Frame { image: frame.image.clone(), source: None, synthesized: frame.synthesized }
}
