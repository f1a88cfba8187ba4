//! Configuration schema types for `framecut.toml`
//!
//! Every tunable of the slicing pipeline lives here so that callers (and
//! tests) can pass exact threshold values into a run. All fields default to
//! values tuned for white-background generated sheets.

use crate::models::AnimationKind;
use serde::{Deserialize, Serialize};

/// How each logical row finds its vertical pixel range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BandStrategy {
    /// Divide the image height evenly between rows
    #[default]
    Fixed,
    /// Detect horizontal bands of content pixels
    Content,
}

/// Whether frame boundaries are detected or taken from frame-count hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SliceMode {
    /// Gap detection plus oversized-region splitting
    #[default]
    Auto,
    /// Equal cells per row, using each row's `frames` hint
    Manual,
}

/// Horizontal placement of content on the output canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Center the content box
    #[default]
    Center,
    /// Center the midpoint of the content's bottom fifth (the feet)
    Foot,
}

/// Which accepted regions of a row become frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Every accepted region, left to right
    #[default]
    All,
    /// Only the accepted region with the largest content area
    Best,
}

/// What a row with no accepted region falls back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyRow {
    /// Synthesize one opaque frame from the band
    Fallback,
    /// Take the first frame of another animation
    Borrow,
}

/// Pixel classifier thresholds, in normalized channel units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Pixels with alpha below this are always background
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: f32,
    /// Threshold for occupancy scans and tight bounding boxes
    #[serde(default = "default_coarse_threshold")]
    pub coarse_threshold: f32,
    /// Threshold for duplicate comparison and background keying
    #[serde(default = "default_fine_threshold")]
    pub fine_threshold: f32,
    /// Background color override (hex); the top-left pixel is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: default_alpha_threshold(),
            coarse_threshold: default_coarse_threshold(),
            fine_threshold: default_fine_threshold(),
            background: None,
        }
    }
}

fn default_alpha_threshold() -> f32 {
    0.05
}

fn default_coarse_threshold() -> f32 {
    0.36
}

fn default_fine_threshold() -> f32 {
    0.15
}

/// Sheet layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub mode: SliceMode,
    #[serde(default)]
    pub bands: BandStrategy,
    /// Detected content bands shorter than this are treated as noise
    #[serde(default = "default_min_band_height")]
    pub min_band_height: u32,
    /// Height the consumer renders frames at; only reported, never applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_height: Option<f32>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: SliceMode::default(),
            bands: BandStrategy::default(),
            min_band_height: default_min_band_height(),
            target_height: None,
        }
    }
}

fn default_min_band_height() -> u32 {
    4
}

/// Region segmentation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Columns compared on each side of a gap candidate
    #[serde(default = "default_gap_window")]
    pub gap_window: u32,
    /// Center density must be below this fraction of the side average
    #[serde(default = "default_gap_ratio")]
    pub gap_ratio: f32,
    /// Side average must exceed this many content pixels
    #[serde(default = "default_min_side_density")]
    pub min_side_density: u32,
    /// Minimum distance between two accepted gaps
    #[serde(default = "default_min_gap_distance")]
    pub min_gap_distance: u32,
    /// Regions wider than this multiple of row height are split
    #[serde(default = "default_oversize_ratio")]
    pub oversize_ratio: f32,
    /// Expected frame width as a fraction of row height, for split estimates
    #[serde(default = "default_split_width_ratio")]
    pub split_width_ratio: f32,
    /// Upper bound on the sub-frames an oversized region is split into
    #[serde(default = "default_max_split")]
    pub max_split: u32,
    /// Neighborhood radius for local minima
    #[serde(default = "default_split_window")]
    pub split_window: u32,
    /// Columns at each region edge excluded from the minima search
    #[serde(default = "default_split_margin")]
    pub split_margin: u32,
    /// Minima must be below this fraction of row height
    #[serde(default = "default_split_density_ratio")]
    pub split_density_ratio: f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            gap_window: default_gap_window(),
            gap_ratio: default_gap_ratio(),
            min_side_density: default_min_side_density(),
            min_gap_distance: default_min_gap_distance(),
            oversize_ratio: default_oversize_ratio(),
            split_width_ratio: default_split_width_ratio(),
            max_split: default_max_split(),
            split_window: default_split_window(),
            split_margin: default_split_margin(),
            split_density_ratio: default_split_density_ratio(),
        }
    }
}

fn default_gap_window() -> u32 {
    8
}

fn default_gap_ratio() -> f32 {
    0.5
}

fn default_min_side_density() -> u32 {
    5
}

fn default_min_gap_distance() -> u32 {
    40
}

fn default_oversize_ratio() -> f32 {
    1.2
}

fn default_split_width_ratio() -> f32 {
    0.6
}

fn default_max_split() -> u32 {
    8
}

fn default_split_window() -> u32 {
    5
}

fn default_split_margin() -> u32 {
    20
}

fn default_split_density_ratio() -> f32 {
    0.8
}

/// Output canvas settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Transparent margin around the largest content box
    #[serde(default = "default_padding")]
    pub padding: u32,
    #[serde(default)]
    pub anchor: Anchor,
    /// Make background-colored pixels inside copied content transparent
    #[serde(default)]
    pub key_background: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { padding: default_padding(), anchor: Anchor::default(), key_background: false }
    }
}

fn default_padding() -> u32 {
    4
}

/// Duplicate detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Frames more similar than this are duplicates
    #[serde(default = "default_similarity_cutoff")]
    pub similarity_cutoff: f32,
    /// Frames whose sizes differ by more than this are never duplicates
    #[serde(default = "default_max_size_delta")]
    pub max_size_delta: u32,
    /// Sampling stride is `min(width, height) / sample_divisor`
    #[serde(default = "default_sample_divisor")]
    pub sample_divisor: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_cutoff: default_similarity_cutoff(),
            max_size_delta: default_max_size_delta(),
            sample_divisor: default_sample_divisor(),
        }
    }
}

fn default_similarity_cutoff() -> f32 {
    0.92
}

fn default_max_size_delta() -> u32 {
    5
}

fn default_sample_divisor() -> u32 {
    32
}

/// One animation row of the sheet, top to bottom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowConfig {
    pub kind: AnimationKind,
    /// Frame-count hint, used in manual mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_max: Option<f32>,
    /// Minimum content height as a fraction of row height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height_ratio: Option<f32>,
    /// Drop near-duplicate frames within this row
    #[serde(default)]
    pub dedup: bool,
    #[serde(default)]
    pub extraction: ExtractionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub looping: Option<bool>,
    /// Handling when no region of the row is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_empty: Option<EmptyRow>,
}

impl RowConfig {
    pub fn new(kind: AnimationKind) -> Self {
        Self {
            kind,
            frames: None,
            aspect_min: None,
            aspect_max: None,
            min_height_ratio: None,
            dedup: false,
            extraction: ExtractionMode::All,
            fps: None,
            looping: None,
            on_empty: None,
        }
    }

    /// Frame-count hint builder
    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Resolve this row's acceptance policy, filling in per-kind defaults.
    ///
    /// Single-pose rows accept `[0.2, 1.5]` aspect and 30% of row height;
    /// motion rows allow wide mid-stride poses, `[0.15, 3.0]` and 25%.
    /// An idle row without accepted regions gets a fallback frame; motion
    /// rows borrow one instead.
    pub fn policy(&self) -> RowPolicy {
        let (aspect_min, aspect_max, min_height_ratio, on_empty) = match self.kind {
            AnimationKind::Idle => (0.2, 1.5, 0.3, EmptyRow::Fallback),
            AnimationKind::Run | AnimationKind::Jump => (0.15, 3.0, 0.25, EmptyRow::Borrow),
        };
        RowPolicy {
            aspect_min: self.aspect_min.unwrap_or(aspect_min),
            aspect_max: self.aspect_max.unwrap_or(aspect_max),
            min_height_ratio: self.min_height_ratio.unwrap_or(min_height_ratio),
            dedup: self.dedup,
            extraction: self.extraction,
            on_empty: self.on_empty.unwrap_or(on_empty),
        }
    }
}

/// Resolved acceptance policy of one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPolicy {
    pub aspect_min: f32,
    pub aspect_max: f32,
    pub min_height_ratio: f32,
    pub dedup: bool,
    pub extraction: ExtractionMode,
    pub on_empty: EmptyRow,
}

fn default_rows() -> Vec<RowConfig> {
    vec![RowConfig::new(AnimationKind::Idle).with_frames(4), RowConfig::new(AnimationKind::Run).with_frames(6)]
}

/// Derived jump animation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Run frame used as the jump pose when the run animation has one
    #[serde(default = "default_jump_run_index")]
    pub run_index: usize,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self { enabled: true, run_index: default_jump_run_index() }
    }
}

fn default_true() -> bool {
    true
}

fn default_jump_run_index() -> usize {
    2
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlicerConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    /// Animation rows, top to bottom
    #[serde(default = "default_rows")]
    pub rows: Vec<RowConfig>,
    #[serde(default)]
    pub jump: JumpConfig,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            layout: LayoutConfig::default(),
            segmenter: SegmenterConfig::default(),
            canvas: CanvasConfig::default(),
            dedup: DedupConfig::default(),
            rows: default_rows(),
            jump: JumpConfig::default(),
        }
    }
}

/// Validation error for config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "segmenter.gap_window")
    pub field: String,
    /// Error message
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "framecut.toml: '{}' {}", self.field, self.message)
    }
}

impl SlicerConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        let c = &self.classifier;
        if !(0.0..=1.0).contains(&c.alpha_threshold) {
            errors.push(ConfigValidationError::new(
                "classifier.alpha_threshold",
                "must be between 0.0 and 1.0",
            ));
        }
        for (field, value) in
            [("classifier.coarse_threshold", c.coarse_threshold), ("classifier.fine_threshold", c.fine_threshold)]
        {
            if !(0.0..3.0).contains(&value) {
                errors.push(ConfigValidationError::new(field, "must be between 0.0 and 3.0"));
            }
        }
        if let Some(bg) = &c.background {
            if let Err(e) = crate::color::parse_hex_color(bg) {
                errors.push(ConfigValidationError::new("classifier.background", e.to_string()));
            }
        }

        let s = &self.segmenter;
        if s.gap_window == 0 {
            errors.push(ConfigValidationError::new("segmenter.gap_window", "must be a positive integer"));
        }
        if !(s.gap_ratio > 0.0 && s.gap_ratio <= 1.0) {
            errors.push(ConfigValidationError::new("segmenter.gap_ratio", "must be in (0.0, 1.0]"));
        }
        if s.oversize_ratio <= 0.0 {
            errors.push(ConfigValidationError::new("segmenter.oversize_ratio", "must be positive"));
        }
        if s.split_width_ratio <= 0.0 {
            errors.push(ConfigValidationError::new("segmenter.split_width_ratio", "must be positive"));
        }
        if s.max_split < 2 {
            errors.push(ConfigValidationError::new("segmenter.max_split", "must be at least 2"));
        }

        let d = &self.dedup;
        if !(0.0..=1.0).contains(&d.similarity_cutoff) {
            errors.push(ConfigValidationError::new("dedup.similarity_cutoff", "must be between 0.0 and 1.0"));
        }
        if d.sample_divisor == 0 {
            errors.push(ConfigValidationError::new("dedup.sample_divisor", "must be a positive integer"));
        }

        if self.rows.is_empty() {
            errors.push(ConfigValidationError::new("rows", "must declare at least one animation row"));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if self.rows[..i].iter().any(|r| r.kind == row.kind) {
                errors.push(ConfigValidationError::new(format!("rows[{}].kind", i), "is declared twice"));
            }
            if row.kind == AnimationKind::Jump && self.jump.enabled {
                errors.push(ConfigValidationError::new(
                    format!("rows[{}].kind", i),
                    "jump is derived; disable [jump] to give it its own row",
                ));
            }
            let policy = row.policy();
            if policy.aspect_min <= 0.0 || policy.aspect_min > policy.aspect_max {
                errors.push(ConfigValidationError::new(
                    format!("rows[{}].aspect_min", i),
                    "must be positive and not above aspect_max",
                ));
            }
            if row.frames == Some(0) {
                errors.push(ConfigValidationError::new(format!("rows[{}].frames", i), "must be positive"));
            }
            if self.layout.mode == SliceMode::Manual && row.frames.is_none() {
                errors.push(ConfigValidationError::new(
                    format!("rows[{}].frames", i),
                    "is required in manual mode",
                ));
            }
            if matches!(row.fps, Some(fps) if fps <= 0.0) {
                errors.push(ConfigValidationError::new(format!("rows[{}].fps", i), "must be positive"));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SlicerConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.rows.len(), 2);
        assert_eq!(config.rows[0].kind, AnimationKind::Idle);
        assert_eq!(config.segmenter.min_gap_distance, 40);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: SlicerConfig = toml::from_str("").unwrap();
        assert_eq!(config.classifier.coarse_threshold, 0.36);
        assert_eq!(config.canvas.padding, 4);
        assert_eq!(config.rows.len(), 2);
        assert!(config.jump.enabled);
    }

    #[test]
    fn test_parse_rows_and_enums() {
        let toml_str = r##"
[classifier]
background = "#FFFFFF"

[layout]
mode = "manual"
bands = "content"

[canvas]
anchor = "foot"

[[rows]]
kind = "idle"
frames = 4
extraction = "best"

[[rows]]
kind = "run"
frames = 6
dedup = true
aspect_max = 2.5
on_empty = "fallback"
"##;
        let config: SlicerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.layout.mode, SliceMode::Manual);
        assert_eq!(config.layout.bands, BandStrategy::Content);
        assert_eq!(config.canvas.anchor, Anchor::Foot);
        assert_eq!(config.rows[0].extraction, ExtractionMode::Best);
        assert!(config.rows[1].dedup);
        assert_eq!(config.rows[1].policy().aspect_max, 2.5);
        assert_eq!(config.rows[1].policy().aspect_min, 0.15);
        assert_eq!(config.rows[1].policy().on_empty, EmptyRow::Fallback);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_row_policy_defaults_by_kind() {
        let idle = RowConfig::new(AnimationKind::Idle).policy();
        assert_eq!((idle.aspect_min, idle.aspect_max, idle.min_height_ratio), (0.2, 1.5, 0.3));
        let run = RowConfig::new(AnimationKind::Run).policy();
        assert_eq!((run.aspect_min, run.aspect_max, run.min_height_ratio), (0.15, 3.0, 0.25));
        assert!(!run.dedup);
        assert_eq!(idle.on_empty, EmptyRow::Fallback);
        assert_eq!(run.on_empty, EmptyRow::Borrow);
    }

    #[test]
    fn test_validation_collects_errors() {
        let mut config = SlicerConfig::default();
        config.segmenter.gap_window = 0;
        config.dedup.similarity_cutoff = 1.5;
        config.classifier.background = Some("white".to_string());
        config.rows.push(RowConfig::new(AnimationKind::Idle));

        let errors = config.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"segmenter.gap_window"));
        assert!(fields.contains(&"dedup.similarity_cutoff"));
        assert!(fields.contains(&"classifier.background"));
        assert!(fields.contains(&"rows[2].kind"));
    }

    #[test]
    fn test_manual_mode_requires_hints() {
        let mut config = SlicerConfig::default();
        config.layout.mode = SliceMode::Manual;
        config.rows[1].frames = None;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rows[1].frames");
        assert!(errors[0].to_string().contains("manual mode"));
    }

    #[test]
    fn test_jump_row_conflicts_with_derived_jump() {
        let mut config = SlicerConfig::default();
        config.rows.push(RowConfig::new(AnimationKind::Jump));
        assert_eq!(config.validate().len(), 1);
        config.jump.enabled = false;
        assert!(config.validate().is_empty());
    }
}
