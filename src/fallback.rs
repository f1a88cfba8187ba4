//! Fallback frame for rows where nothing was accepted

use crate::models::{Frame, Rect};
use image::{imageops, Rgba, RgbaImage};

/// Synthesize a frame from the top-left canvas-sized part of the band.
///
/// The canvas is filled with the opaque background and the band is copied
/// over it, clipped to whatever fits. The result is marked as synthesized.
pub fn fallback_frame(image: &RgbaImage, band: Rect, canvas: (u32, u32), background: Rgba<u8>) -> Frame {
    let (canvas_w, canvas_h) = canvas;
    let mut frame = RgbaImage::from_pixel(canvas_w, canvas_h, background);

    let source = Rect::new(band.x, band.y, band.width.min(canvas_w), band.height.min(canvas_h))
        .clamped_to(image.width(), image.height());
    if !source.is_empty() {
        let crop = imageops::crop_imm(image, source.x, source.y, source.width, source.height).to_image();
        imageops::replace(&mut frame, &crop, 0, 0);
    }

    Frame { image: frame, source: (!source.is_empty()).then_some(source), synthesized: true }
}
