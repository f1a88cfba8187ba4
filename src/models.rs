//! Data model shared by every pipeline stage.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned integer box. A zero-area rect means "no content".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width divided by height, `0.0` for an empty rect.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }

    /// Clamp this rect so it lies inside a `width` x `height` image.
    pub fn clamped_to(&self, width: u32, height: u32) -> Rect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Rect { x, y, width: self.width.min(width - x), height: self.height.min(height - y) }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// Half-open horizontal interval `[start_x, end_x)` inside one band,
/// hypothesized to hold a single character frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub start_x: u32,
    pub end_x: u32,
}

impl Region {
    /// Create a region, returning `None` unless `start_x < end_x`.
    pub fn new(start_x: u32, end_x: u32) -> Option<Self> {
        (start_x < end_x).then_some(Self { start_x, end_x })
    }

    pub fn width(&self) -> u32 {
        self.end_x - self.start_x
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_x, self.end_x)
    }
}

/// Closed set of animations a character sheet can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Idle,
    Run,
    Jump,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 3] = [AnimationKind::Idle, AnimationKind::Run, AnimationKind::Jump];

    pub fn name(&self) -> &'static str {
        match self {
            AnimationKind::Idle => "idle",
            AnimationKind::Run => "run",
            AnimationKind::Jump => "jump",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Default playback speed in frames per second.
    pub fn default_fps(&self) -> f32 {
        match self {
            AnimationKind::Idle => 1.0,
            AnimationKind::Run => 12.0,
            AnimationKind::Jump => 8.0,
        }
    }

    /// Whether playback loops by default.
    pub fn default_looping(&self) -> bool {
        !matches!(self, AnimationKind::Jump)
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One normalized output frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Canvas-sized image, shared dimensions across the whole set
    pub image: RgbaImage,
    /// Content rect in the source sheet, `None` when not cropped from one region
    pub source: Option<Rect>,
    /// True for frames produced by the fallback path
    pub synthesized: bool,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// An ordered list of frames plus playback metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub kind: AnimationKind,
    pub fps: f32,
    pub looping: bool,
    pub frames: Vec<Frame>,
}

impl Animation {
    pub fn new(kind: AnimationKind) -> Self {
        Self { kind, fps: kind.default_fps(), looping: kind.default_looping(), frames: Vec::new() }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Result of slicing one spritesheet.
///
/// Animations are kept in declaration order with derived animations last.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSet {
    pub animations: Vec<Animation>,
    /// Dimensions shared by every frame
    pub canvas: (u32, u32),
    /// Background color the sheet was segmented against
    pub background: Rgba<u8>,
}

impl AnimationSet {
    pub fn get(&self, kind: AnimationKind) -> Option<&Animation> {
        self.animations.iter().find(|a| a.kind == kind)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Animation> {
        AnimationKind::from_name(name).and_then(|kind| self.get(kind))
    }

    /// Frames of an animation, empty when the animation is absent.
    pub fn frames(&self, kind: AnimationKind) -> &[Frame] {
        self.get(kind).map(|a| a.frames.as_slice()).unwrap_or(&[])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.animations.iter().map(Animation::name).collect()
    }

    pub fn frame_count(&self) -> usize {
        self.animations.iter().map(|a| a.frames.len()).sum()
    }

    /// Uniform scale a renderer should apply so frames appear
    /// `target_height` pixels tall.
    pub fn visual_scale(&self, target_height: f32) -> f32 {
        if self.canvas.1 == 0 {
            return 1.0;
        }
        target_height / self.canvas.1 as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_requires_positive_width() {
        assert!(Region::new(5, 5).is_none());
        assert!(Region::new(6, 5).is_none());
        assert_eq!(Region::new(2, 9).map(|r| r.width()), Some(7));
    }

    #[test]
    fn test_rect_clamped_to_image() {
        let rect = Rect::new(90, 40, 50, 50).clamped_to(100, 60);
        assert_eq!(rect, Rect::new(90, 40, 10, 20));

        let outside = Rect::new(200, 200, 10, 10).clamped_to(100, 60);
        assert!(outside.is_empty());
    }

    #[test]
    fn test_rect_aspect_ratio() {
        assert_eq!(Rect::new(0, 0, 30, 60).aspect_ratio(), 0.5);
        assert_eq!(Rect::new(0, 0, 30, 0).aspect_ratio(), 0.0);
    }

    #[test]
    fn test_animation_kind_names() {
        for kind in AnimationKind::ALL {
            assert_eq!(AnimationKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(AnimationKind::from_name("walk"), None);
    }

    #[test]
    fn test_playback_defaults() {
        let jump = Animation::new(AnimationKind::Jump);
        assert_eq!(jump.fps, 8.0);
        assert!(!jump.looping);
        assert!(Animation::new(AnimationKind::Run).looping);
    }

    #[test]
    fn test_visual_scale() {
        let set = AnimationSet {
            animations: Vec::new(),
            canvas: (64, 200),
            background: Rgba([255, 255, 255, 255]),
        };
        assert_eq!(set.visual_scale(220.0), 1.1);
        assert!(set.frames(AnimationKind::Idle).is_empty());
    }
}
