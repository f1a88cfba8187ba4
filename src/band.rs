//! Band location: which pixel rows belong to each animation row
//!
//! Two strategies are supported. [`fixed_band`] divides the sheet height
//! evenly, which is what a generator that respects the prompted layout
//! produces. [`detect_content_bands`] finds horizontal runs of content rows
//! and tolerates vertical drift at the cost of a full-image scan.

use crate::color::is_content;
use crate::config::ClassifierConfig;
use crate::models::Rect;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Band of row `index` out of `rows` equal divisions of the image.
///
/// The last row absorbs any remainder pixels. The band spans the full width.
pub fn fixed_band(image: &RgbaImage, index: usize, rows: usize) -> Rect {
    let (width, height) = image.dimensions();
    if rows == 0 || index >= rows {
        return Rect::new(0, 0, width, 0);
    }
    let row_height = height / rows as u32;
    let y = index as u32 * row_height;
    let band_height = if index + 1 == rows { height - y } else { row_height };
    Rect::new(0, y, width, band_height)
}

/// Whether each pixel row of the image contains any content pixel.
///
/// Rows are scanned in parallel; the result is indexed by y.
pub fn row_occupancy(image: &RgbaImage, background: Rgba<u8>, classifier: &ClassifierConfig) -> Vec<bool> {
    let width = image.width();
    (0..image.height())
        .into_par_iter()
        .map(|y| {
            (0..width).any(|x| {
                is_content(
                    *image.get_pixel(x, y),
                    background,
                    classifier.alpha_threshold,
                    classifier.coarse_threshold,
                )
            })
        })
        .collect()
}

/// Merge consecutive content rows into full-width bands, top to bottom.
///
/// Bands shorter than `min_height` rows are dropped as noise.
pub fn detect_content_bands(
    image: &RgbaImage,
    background: Rgba<u8>,
    classifier: &ClassifierConfig,
    min_height: u32,
) -> Vec<Rect> {
    let _span = tracing::debug_span!("detect_content_bands").entered();
    let width = image.width();
    let occupancy = row_occupancy(image, background, classifier);

    let mut bands = Vec::new();
    let mut start: Option<u32> = None;
    for (y, occupied) in occupancy.iter().enumerate() {
        let y = y as u32;
        match (start, *occupied) {
            (None, true) => start = Some(y),
            (Some(s), false) => {
                bands.push(Rect::new(0, s, width, y - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        bands.push(Rect::new(0, s, width, image.height() - s));
    }

    bands.retain(|band| band.height >= min_height.max(1));
    tracing::debug!("Found {} content bands", bands.len());
    bands
}

/// Pick the detected band for logical row `index` of `rows`.
///
/// The first row takes the topmost band and the last row the bottommost;
/// interior rows take the band at their own index. Returns `None` when fewer
/// bands than rows were detected.
pub fn select_band(bands: &[Rect], index: usize, rows: usize) -> Option<Rect> {
    if bands.len() < rows || index >= rows {
        return None;
    }
    if index == 0 {
        bands.first().copied()
    } else if index + 1 == rows {
        bands.last().copied()
    } else {
        bands.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn fill(image: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                image.put_pixel(x, y, color);
            }
        }
    }

    #[test]
    fn test_fixed_band_even_split() {
        let image = RgbaImage::from_pixel(80, 400, WHITE);
        assert_eq!(fixed_band(&image, 0, 2), Rect::new(0, 0, 80, 200));
        assert_eq!(fixed_band(&image, 1, 2), Rect::new(0, 200, 80, 200));
    }

    #[test]
    fn test_fixed_band_last_row_absorbs_remainder() {
        let image = RgbaImage::from_pixel(10, 101, WHITE);
        assert_eq!(fixed_band(&image, 0, 2), Rect::new(0, 0, 10, 50));
        assert_eq!(fixed_band(&image, 1, 2), Rect::new(0, 50, 10, 51));
    }

    #[test]
    fn test_fixed_band_out_of_range_is_empty() {
        let image = RgbaImage::from_pixel(10, 10, WHITE);
        assert!(fixed_band(&image, 3, 2).is_empty());
        assert!(fixed_band(&image, 0, 0).is_empty());
    }

    #[test]
    fn test_detect_bands_with_drift() {
        let mut image = RgbaImage::from_pixel(100, 300, WHITE);
        fill(&mut image, Rect::new(10, 30, 20, 60), BLACK);
        fill(&mut image, Rect::new(50, 40, 20, 40), BLACK);
        fill(&mut image, Rect::new(10, 170, 30, 90), BLACK);
        // Single stray pixel row, too thin to be a band
        fill(&mut image, Rect::new(0, 140, 5, 1), BLACK);

        let bands = detect_content_bands(&image, WHITE, &ClassifierConfig::default(), 4);
        assert_eq!(bands, vec![Rect::new(0, 30, 100, 60), Rect::new(0, 170, 100, 90)]);
    }

    #[test]
    fn test_detect_band_touching_bottom_edge() {
        let mut image = RgbaImage::from_pixel(20, 50, WHITE);
        fill(&mut image, Rect::new(0, 40, 20, 10), BLACK);
        let bands = detect_content_bands(&image, WHITE, &ClassifierConfig::default(), 4);
        assert_eq!(bands, vec![Rect::new(0, 40, 20, 10)]);
    }

    #[test]
    fn test_transparent_rows_are_empty() {
        let mut image = RgbaImage::from_pixel(20, 20, WHITE);
        fill(&mut image, Rect::new(0, 5, 20, 5), Rgba([0, 0, 0, 0]));
        let occupancy = row_occupancy(&image, WHITE, &ClassifierConfig::default());
        assert!(occupancy.iter().all(|o| !o));
    }

    #[test]
    fn test_select_band_top_and_bottom() {
        let bands = vec![
            Rect::new(0, 0, 10, 5),
            Rect::new(0, 10, 10, 5),
            Rect::new(0, 20, 10, 5),
        ];
        assert_eq!(select_band(&bands, 0, 2), Some(bands[0]));
        assert_eq!(select_band(&bands, 1, 2), Some(bands[2]));
        assert_eq!(select_band(&bands, 1, 3), Some(bands[1]));
        assert_eq!(select_band(&bands[..1], 1, 2), None);
    }
}
