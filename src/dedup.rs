//! Near-duplicate frame detection
//!
//! Generated sheets often repeat the same pose. Frames are compared on a
//! sparse sampling grid: a sample matches when both pixels are background,
//! or both are content and close in color.

use crate::color::{color_distance, is_content};
use crate::config::{ClassifierConfig, DedupConfig};
use image::{Rgba, RgbaImage};

/// Fraction of matching samples between two frames, in `0.0..=1.0`.
///
/// Frames whose width or height differ by more than `max_size_delta` are
/// never similar.
pub fn similarity(
    a: &RgbaImage,
    b: &RgbaImage,
    background: Rgba<u8>,
    classifier: &ClassifierConfig,
    config: &DedupConfig,
) -> f32 {
    if a.width().abs_diff(b.width()) > config.max_size_delta
        || a.height().abs_diff(b.height()) > config.max_size_delta
    {
        return 0.0;
    }

    let width = a.width().min(b.width());
    let height = a.height().min(b.height());
    let step = (width.min(height) / config.sample_divisor.max(1)).max(1) as usize;

    let is_background = |pixel: Rgba<u8>| {
        !is_content(pixel, background, classifier.alpha_threshold, classifier.fine_threshold)
    };

    let mut total = 0u32;
    let mut matching = 0u32;
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            let pa = *a.get_pixel(x, y);
            let pb = *b.get_pixel(x, y);
            let matches = match (is_background(pa), is_background(pb)) {
                (true, true) => true,
                (false, false) => color_distance(pa, pb) < classifier.fine_threshold,
                _ => false,
            };
            if matches {
                matching += 1;
            }
            total += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    matching as f32 / total as f32
}

/// Tracks the frames kept so far in one row and rejects near-copies.
pub struct Deduplicator<'a> {
    background: Rgba<u8>,
    classifier: &'a ClassifierConfig,
    config: &'a DedupConfig,
    kept: Vec<RgbaImage>,
}

impl<'a> Deduplicator<'a> {
    pub fn new(background: Rgba<u8>, classifier: &'a ClassifierConfig, config: &'a DedupConfig) -> Self {
        Self { background, classifier, config, kept: Vec::new() }
    }

    /// Offer a frame. Returns `Some(similarity)` when it duplicates a kept
    /// frame; otherwise the frame is remembered and `None` is returned.
    pub fn offer(&mut self, frame: &RgbaImage) -> Option<f32> {
        let duplicate = self.kept.iter().find_map(|kept| {
            let score = similarity(frame, kept, self.background, self.classifier, self.config);
            (score > self.config.similarity_cutoff).then_some(score)
        });
        if duplicate.is_none() {
            self.kept.push(frame.clone());
        }
        duplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([255, 255, 255, 0]);

    fn frame_with_block(x0: u32, color: Rgba<u8>) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(64, 64, CLEAR);
        for y in 10..60 {
            for x in x0..x0 + 20 {
                image.put_pixel(x, y, color);
            }
        }
        image
    }

    #[test]
    fn test_identical_frames_are_fully_similar() {
        let a = frame_with_block(20, Rgba([0, 0, 0, 255]));
        let score = similarity(&a, &a.clone(), WHITE, &ClassifierConfig::default(), &DedupConfig::default());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_size_mismatch_is_dissimilar() {
        let a = RgbaImage::from_pixel(64, 64, CLEAR);
        let b = RgbaImage::from_pixel(64, 70, CLEAR);
        let score = similarity(&a, &b, WHITE, &ClassifierConfig::default(), &DedupConfig::default());
        assert_eq!(score, 0.0);

        let c = RgbaImage::from_pixel(66, 64, CLEAR);
        let score = similarity(&a, &c, WHITE, &ClassifierConfig::default(), &DedupConfig::default());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_opaque_background_matches_transparent_canvas() {
        let a = RgbaImage::from_pixel(32, 32, WHITE);
        let b = RgbaImage::from_pixel(32, 32, CLEAR);
        let score = similarity(&a, &b, WHITE, &ClassifierConfig::default(), &DedupConfig::default());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_different_colors_do_not_match() {
        let a = frame_with_block(20, Rgba([0, 0, 0, 255]));
        let b = frame_with_block(20, Rgba([200, 0, 0, 255]));
        let score = similarity(&a, &b, WHITE, &ClassifierConfig::default(), &DedupConfig::default());
        assert!(score < 0.92, "score was {}", score);
    }

    #[test]
    fn test_deduplicator_keeps_distinct_frames() {
        let classifier = ClassifierConfig::default();
        let config = DedupConfig::default();
        let mut dedup = Deduplicator::new(WHITE, &classifier, &config);

        let pose = frame_with_block(20, Rgba([0, 0, 0, 255]));
        let other = frame_with_block(40, Rgba([0, 0, 200, 255]));

        assert_eq!(dedup.offer(&pose), None);
        assert_eq!(dedup.offer(&pose), Some(1.0));
        assert_eq!(dedup.offer(&pose), Some(1.0));
        assert_eq!(dedup.offer(&pose), Some(1.0));
        assert_eq!(dedup.offer(&other), None);
        assert_eq!(dedup.kept.len(), 2);
    }
}
