//! Region-to-frame extraction
//!
//! Turns a segmented region into a normalized frame: the tight content box
//! is located, checked against the row's acceptance policy, and copied onto
//! a transparent canvas shared by every frame of the sheet. Content is
//! centered horizontally and bottom-aligned so that feet land on the same
//! baseline in every frame.

use crate::color::is_content;
use crate::config::{Anchor, CanvasConfig, ClassifierConfig, RowPolicy};
use crate::error::RejectReason;
use crate::models::{Rect, Region};
use image::{imageops, Rgba, RgbaImage};

/// Absorbs f32 rounding in `row_height * ratio` so that content exactly at
/// the minimum height is kept.
const HEIGHT_EPSILON: f32 = 1e-3;

/// Minimal rect enclosing every coarse content pixel inside the region's
/// columns and the band's rows. Empty when there is no content.
pub fn content_rect(
    image: &RgbaImage,
    region: Region,
    band: Rect,
    background: Rgba<u8>,
    classifier: &ClassifierConfig,
) -> Rect {
    let band = band.clamped_to(image.width(), image.height());
    let x_end = region.end_x.min(band.right());

    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in band.y..band.bottom() {
        for x in region.start_x..x_end {
            let pixel = *image.get_pixel(x, y);
            if !is_content(pixel, background, classifier.alpha_threshold, classifier.coarse_threshold) {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }
    }

    match bounds {
        Some((min_x, min_y, max_x, max_y)) => {
            Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
        }
        None => Rect::default(),
    }
}

/// Check a content rect against the row's acceptance policy.
pub fn check_acceptance(rect: Rect, row_height: u32, policy: &RowPolicy) -> Result<(), RejectReason> {
    if rect.is_empty() {
        return Err(RejectReason::Empty);
    }

    let aspect = rect.aspect_ratio();
    if aspect < policy.aspect_min || aspect > policy.aspect_max {
        return Err(RejectReason::AspectRatio(aspect));
    }

    let min_height = row_height as f32 * policy.min_height_ratio;
    if (rect.height as f32) + HEIGHT_EPSILON < min_height {
        return Err(RejectReason::TooShort { height: rect.height, min_height });
    }

    Ok(())
}

/// Size of the canvas shared by every frame of a sheet.
///
/// Fits the largest accepted content box plus `padding` on each side, with
/// the height floored at the tallest row. Without any accepted content the
/// canvas is a square of the tallest row.
pub fn canvas_size(rects: &[Rect], max_row_height: u32, padding: u32) -> (u32, u32) {
    if rects.is_empty() {
        let side = max_row_height.max(1);
        return (side, side);
    }
    let max_width = rects.iter().map(|r| r.width).max().unwrap_or(0);
    let max_height = rects.iter().map(|r| r.height).max().unwrap_or(0);
    let width = (max_width + padding * 2).max(1);
    let height = (max_height + padding * 2).max(max_row_height).max(1);
    (width, height)
}

/// Horizontal midpoint of the content in the bottom fifth of `rect`
/// (at least 4 rows), as an offset from `rect.x`.
///
/// Falls back to the middle of the rect when the bottom slice is empty.
pub fn foot_anchor(
    image: &RgbaImage,
    rect: Rect,
    background: Rgba<u8>,
    classifier: &ClassifierConfig,
) -> u32 {
    let sample_height = (rect.height / 5).max(4).min(rect.height);
    let top = rect.bottom() - sample_height;

    let mut min_x = None;
    let mut max_x = None;
    for x in rect.x..rect.right() {
        let has_content = (top..rect.bottom()).any(|y| {
            is_content(
                *image.get_pixel(x, y),
                background,
                classifier.alpha_threshold,
                classifier.coarse_threshold,
            )
        });
        if has_content {
            min_x.get_or_insert(x);
            max_x = Some(x);
        }
    }

    match (min_x, max_x) {
        (Some(lo), Some(hi)) if hi > lo => (lo + hi) / 2 - rect.x,
        _ => rect.width / 2,
    }
}

/// Copy `rect` of the source onto a fresh transparent canvas.
///
/// The canvas is filled with the background color at zero alpha so that
/// filtering renderers do not pick up a colored halo.
pub fn render_frame(
    image: &RgbaImage,
    rect: Rect,
    canvas: (u32, u32),
    background: Rgba<u8>,
    classifier: &ClassifierConfig,
    canvas_config: &CanvasConfig,
) -> RgbaImage {
    let (canvas_w, canvas_h) = canvas;
    let clear = Rgba([background[0], background[1], background[2], 0]);
    let mut frame = RgbaImage::from_pixel(canvas_w, canvas_h, clear);

    let rect = rect.clamped_to(image.width(), image.height());
    if rect.is_empty() {
        return frame;
    }

    let max_x = canvas_w.saturating_sub(rect.width);
    let dest_x = match canvas_config.anchor {
        Anchor::Center => max_x / 2,
        Anchor::Foot => {
            let anchor = foot_anchor(image, rect, background, classifier);
            (canvas_w / 2).saturating_sub(anchor).min(max_x)
        }
    };
    let dest_y = canvas_h.saturating_sub(rect.height + canvas_config.padding);

    let mut content = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();
    if canvas_config.key_background {
        key_out(&mut content, background, classifier.fine_threshold);
    }
    imageops::replace(&mut frame, &content, dest_x as i64, dest_y as i64);
    frame
}

/// Make every pixel within `threshold` of the background fully transparent.
pub fn key_out(image: &mut RgbaImage, background: Rgba<u8>, threshold: f32) {
    for pixel in image.pixels_mut() {
        if !is_content(*pixel, background, 0.0, threshold) {
            pixel[3] = 0;
        }
    }
}
