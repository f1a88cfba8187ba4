//! Preview sheet rendering - lays sliced frames back out on a clean grid

use crate::models::AnimationSet;
use image::{imageops, Rgba, RgbaImage};

/// Transparent color used for empty cells
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Render an animation set as one row per animation.
///
/// Every cell is canvas-sized, so the preview doubles as an evenly gridded
/// replacement for the generated sheet. Shorter animations leave their
/// trailing cells transparent.
///
/// # Examples
///
/// ```
/// use framecut::models::{Animation, AnimationKind, AnimationSet, Frame};
/// use framecut::spritesheet::render_preview;
/// use image::{Rgba, RgbaImage};
///
/// let frame = Frame {
///     image: RgbaImage::from_pixel(2, 3, Rgba([255, 0, 0, 255])),
///     source: None,
///     synthesized: false,
/// };
/// let mut idle = Animation::new(AnimationKind::Idle);
/// idle.frames = vec![frame.clone()];
/// let mut run = Animation::new(AnimationKind::Run);
/// run.frames = vec![frame.clone(), frame.clone(), frame];
///
/// let set = AnimationSet {
///     animations: vec![idle, run],
///     canvas: (2, 3),
///     background: Rgba([255, 255, 255, 255]),
/// };
/// let sheet = render_preview(&set);
/// assert_eq!(sheet.dimensions(), (6, 6));
/// ```
pub fn render_preview(set: &AnimationSet) -> RgbaImage {
    let (cell_w, cell_h) = set.canvas;
    let columns = set.animations.iter().map(|a| a.frames.len()).max().unwrap_or(0) as u32;
    let rows = set.animations.len() as u32;
    if columns == 0 || rows == 0 || cell_w == 0 || cell_h == 0 {
        return RgbaImage::from_pixel(1, 1, TRANSPARENT);
    }

    let mut sheet = RgbaImage::from_pixel(columns * cell_w, rows * cell_h, TRANSPARENT);
    for (row, animation) in set.animations.iter().enumerate() {
        for (col, frame) in animation.frames.iter().enumerate() {
            let dest_x = col as u32 * cell_w;
            let dest_y = row as u32 * cell_h;
            imageops::replace(&mut sheet, &frame.image, dest_x as i64, dest_y as i64);
        }
    }

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Animation, AnimationKind, Frame};

    fn make_frame(color: Rgba<u8>) -> Frame {
        Frame { image: RgbaImage::from_pixel(2, 2, color), source: None, synthesized: false }
    }

    fn make_set(animations: Vec<Animation>) -> AnimationSet {
        AnimationSet { animations, canvas: (2, 2), background: Rgba([255, 255, 255, 255]) }
    }

    #[test]
    fn test_empty_set() {
        let sheet = render_preview(&make_set(Vec::new()));
        assert_eq!(sheet.dimensions(), (1, 1));
        assert_eq!(*sheet.get_pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn test_rows_follow_animation_order() {
        let red = Rgba([255, 0, 0, 255]);
        let green = Rgba([0, 255, 0, 255]);
        let blue = Rgba([0, 0, 255, 255]);

        let mut idle = Animation::new(AnimationKind::Idle);
        idle.frames = vec![make_frame(red)];
        let mut run = Animation::new(AnimationKind::Run);
        run.frames = vec![make_frame(green), make_frame(blue)];

        let sheet = render_preview(&make_set(vec![idle, run]));

        assert_eq!(sheet.dimensions(), (4, 4));
        assert_eq!(*sheet.get_pixel(0, 0), red); // Idle frame 0
        assert_eq!(*sheet.get_pixel(2, 0), TRANSPARENT); // No idle frame 1
        assert_eq!(*sheet.get_pixel(0, 2), green); // Run frame 0
        assert_eq!(*sheet.get_pixel(3, 3), blue); // Run frame 1
    }
}
