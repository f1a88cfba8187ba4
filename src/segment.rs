//! Region segmentation within one animation band
//!
//! A band is reduced to a per-column content density profile. Frames are
//! separated in two phases:
//!
//! 1. **Gap detection** - columns markedly emptier than their neighborhood
//!    become split points. Candidates are ranked by depth and accepted
//!    greedily so that the strongest gap in any neighborhood wins.
//! 2. **Oversized splitting** - a region much wider than the row is tall
//!    most likely holds several touching frames. It is cut at density
//!    minima, or into equal slices when no usable minima exist.
//!
//! The number of frames per row is never needed up front.

use crate::color::is_content;
use crate::config::{ClassifierConfig, SegmenterConfig};
use crate::models::{Rect, Region};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// A column that looks like the empty space between two frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapCandidate {
    /// Column index into the density profile
    pub x: usize,
    /// Side average minus center density; deeper gaps score higher
    pub score: u32,
}

/// Count coarse content pixels in every column of `band`.
///
/// The profile is indexed from `band.x`. Columns are scanned in parallel and
/// collected in order.
pub fn density_profile(
    image: &RgbaImage,
    band: Rect,
    background: Rgba<u8>,
    classifier: &ClassifierConfig,
) -> Vec<u32> {
    let band = band.clamped_to(image.width(), image.height());
    (band.x..band.right())
        .into_par_iter()
        .map(|x| {
            (band.y..band.bottom())
                .filter(|&y| {
                    is_content(
                        *image.get_pixel(x, y),
                        background,
                        classifier.alpha_threshold,
                        classifier.coarse_threshold,
                    )
                })
                .count() as u32
        })
        .collect()
}

/// Leftmost and rightmost (inclusive) columns with any content.
pub fn content_extent(profile: &[u32]) -> Option<(usize, usize)> {
    let start = profile.iter().position(|&d| d > 0)?;
    let end = profile.iter().rposition(|&d| d > 0)?;
    Some((start, end))
}

/// Scan `[start + window, end - window)` for gap candidates.
///
/// A column qualifies when its density is below `gap_ratio` of the average
/// density over `window` columns on each side, and that average exceeds
/// `min_side_density`.
pub fn find_gap_candidates(
    profile: &[u32],
    start: usize,
    end: usize,
    config: &SegmenterConfig,
) -> Vec<GapCandidate> {
    let window = config.gap_window as usize;
    if window == 0 || end >= profile.len() {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for x in (start + window)..end.saturating_sub(window) {
        let left: u32 = profile[x - window..x].iter().sum();
        let right: u32 = profile[x + 1..=x + window].iter().sum();
        let avg_side = (left + right) / (window as u32 * 2);
        let center = profile[x];

        if (center as f32) < avg_side as f32 * config.gap_ratio && avg_side > config.min_side_density {
            candidates.push(GapCandidate { x, score: avg_side.saturating_sub(center) });
        }
    }
    candidates
}

/// Greedily accept the strongest candidates that keep `min_distance` from
/// every gap accepted before them. Returned gaps are sorted by x.
pub fn select_gaps(mut candidates: Vec<GapCandidate>, min_distance: u32) -> Vec<usize> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.x.cmp(&b.x)));

    let mut gaps: Vec<usize> = Vec::new();
    for candidate in candidates {
        let too_close = gaps.iter().any(|&g| candidate.x.abs_diff(g) < min_distance as usize);
        if !too_close {
            gaps.push(candidate.x);
        }
    }
    gaps.sort_unstable();
    gaps
}

/// Split `[start, end)` at the given sorted interior points, skipping
/// degenerate intervals.
fn split_at(start: usize, end: usize, points: &[usize]) -> Vec<Region> {
    let mut bounds = Vec::with_capacity(points.len() + 2);
    bounds.push(start);
    bounds.extend(points.iter().copied().filter(|&p| p > start && p < end));
    bounds.push(end);
    bounds.windows(2).filter_map(|w| Region::new(w[0] as u32, w[1] as u32)).collect()
}

/// Split a region that is too wide to hold a single frame.
///
/// Returns the region unchanged when it is within `oversize_ratio` of
/// `row_height`. Coordinates are profile indices.
pub fn split_oversized(
    profile: &[u32],
    region: Region,
    row_height: u32,
    config: &SegmenterConfig,
) -> Vec<Region> {
    let width = region.width();
    let row_height = row_height as f32;
    if row_height <= 0.0 || width as f32 <= config.oversize_ratio * row_height {
        return vec![region];
    }

    let estimated = ((width as f32 / (config.split_width_ratio * row_height)).ceil() as u32)
        .clamp(2, config.max_split.max(2)) as usize;
    let start = region.start_x as usize;
    let end = (region.end_x as usize).min(profile.len());

    tracing::debug!("Region {} too wide ({}px), splitting into {} parts", region, width, estimated);

    // Local minima strictly inside the region, away from its edges
    let window = config.split_window as usize;
    let margin = config.split_margin as usize;
    let density_cap = config.split_density_ratio * row_height;
    let mut minima: Vec<(usize, u32)> = Vec::new();
    for x in (start + margin)..end.saturating_sub(margin) {
        let value = profile[x];
        let lo = x.saturating_sub(window);
        let hi = (x + window).min(profile.len() - 1);
        let is_minimum = (lo..=hi).filter(|&n| n != x).all(|n| profile[n] >= value);
        if is_minimum && (value as f32) < density_cap {
            minima.push((x, value));
        }
    }
    minima.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let min_split_distance = width as usize / (estimated + 1);
    let mut splits: Vec<usize> = Vec::new();
    for (x, _) in minima {
        if splits.len() >= estimated - 1 {
            break;
        }
        let near_split = splits.iter().any(|&sp| x.abs_diff(sp) < min_split_distance);
        let near_edge = x - start < min_split_distance / 2 || end - x < min_split_distance / 2;
        if !near_split && !near_edge {
            splits.push(x);
        }
    }

    if splits.len() < estimated - 1 {
        let slice = width as usize / estimated;
        splits = (1..estimated).map(|i| start + i * slice).collect();
    }
    splits.sort_unstable();

    split_at(start, region.end_x as usize, &splits)
}

/// Find frame regions from a density profile.
///
/// Regions are in profile coordinates, ordered and non-overlapping. An
/// empty profile gives no regions, and intervals without a single content
/// column (the space between two gaps flanking a wide blank) are dropped.
pub fn find_regions(profile: &[u32], row_height: u32, config: &SegmenterConfig) -> Vec<Region> {
    let Some((start, end)) = content_extent(profile) else {
        return Vec::new();
    };

    let candidates = find_gap_candidates(profile, start, end, config);
    let gaps = select_gaps(candidates, config.min_gap_distance);
    tracing::debug!("Found {} gaps at positions: {:?}", gaps.len(), gaps);

    split_at(start, end + 1, &gaps)
        .into_iter()
        .filter(|region| has_content(profile, *region))
        .flat_map(|region| split_oversized(profile, region, row_height, config))
        .filter(|region| has_content(profile, *region))
        .collect()
}

fn has_content(profile: &[u32], region: Region) -> bool {
    let end = (region.end_x as usize).min(profile.len());
    profile.get(region.start_x as usize..end).is_some_and(|columns| columns.iter().any(|&d| d > 0))
}

/// Segment one band of the sheet into frame regions, in image coordinates.
pub fn segment_band(
    image: &RgbaImage,
    band: Rect,
    background: Rgba<u8>,
    classifier: &ClassifierConfig,
    config: &SegmenterConfig,
) -> Vec<Region> {
    let _span = tracing::debug_span!("segment_band", y = band.y, height = band.height).entered();
    let profile = density_profile(image, band, background, classifier);
    let regions = find_regions(&profile, band.height, config);

    regions
        .into_iter()
        .filter_map(|r| Region::new(r.start_x + band.x, r.end_x + band.x))
        .collect()
}

/// Divide a band into `count` equal cells; the last cell absorbs the remainder.
pub fn equal_cells(band: Rect, count: u32) -> Vec<Region> {
    if count == 0 {
        return Vec::new();
    }
    let cell = band.width / count;
    let points: Vec<usize> = (1..count).map(|i| (band.x + i * cell) as usize).collect();
    split_at(band.x as usize, band.right() as usize, &points)
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

    fn region(start: u32, end: u32) -> Region {
        Region::new(start, end).expect("valid region")
    }

    #[test]
    fn test_density_profile_counts_column_content() {
        let mut image = RgbaImage::from_pixel(10, 20, WHITE);
        fill(&mut image, Rect::new(2, 5, 3, 4), BLACK);
        // Outside the band, must not count
        fill(&mut image, Rect::new(7, 15, 1, 5), BLACK);

        let band = Rect::new(0, 0, 10, 10);
        let profile = density_profile(&image, band, WHITE, &ClassifierConfig::default());
        assert_eq!(profile, vec![0, 0, 4, 4, 4, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_content_extent() {
        assert_eq!(content_extent(&[0, 0, 3, 0, 1, 0]), Some((2, 4)));
        assert_eq!(content_extent(&[0, 0, 0]), None);
    }

    #[test]
    fn test_gap_candidates_in_valley() {
        // Two blocks of density 20 separated by a 4-column gap
        let mut profile = vec![20u32; 60];
        for d in &mut profile[28..32] {
            *d = 0;
        }
        let candidates = find_gap_candidates(&profile, 0, 59, &SegmenterConfig::default());
        let xs: Vec<usize> = candidates.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![28, 29, 30, 31]);
        assert!(candidates.iter().all(|c| c.score > 0));
    }

    #[test]
    fn test_gap_candidates_need_side_activity() {
        // Sides average 3, below the activity floor
        let mut profile = vec![3u32; 60];
        profile[30] = 0;
        assert!(find_gap_candidates(&profile, 0, 59, &SegmenterConfig::default()).is_empty());
    }

    #[test]
    fn test_gap_ratio_above_one_scores_denser_center_as_zero() {
        let mut profile = vec![20u32; 60];
        profile[30] = 24;
        let mut config = SegmenterConfig::default();
        config.gap_ratio = 1.5;
        let candidates = find_gap_candidates(&profile, 0, 59, &config);
        let center = candidates.iter().find(|c| c.x == 30).unwrap();
        assert_eq!(center.score, 0);
    }

    #[test]
    fn test_select_gaps_strongest_wins() {
        let candidates = vec![
            GapCandidate { x: 100, score: 10 },
            GapCandidate { x: 120, score: 30 },
            GapCandidate { x: 200, score: 5 },
            GapCandidate { x: 159, score: 8 },
        ];
        // 100 is within 40 of 120; 159 is too close to 120 as well
        assert_eq!(select_gaps(candidates, 40), vec![120, 200]);
    }

    #[test]
    fn test_select_gaps_exact_separation_is_allowed() {
        let candidates = vec![GapCandidate { x: 50, score: 9 }, GapCandidate { x: 90, score: 9 }];
        assert_eq!(select_gaps(candidates, 40), vec![50, 90]);
    }

    #[test]
    fn test_empty_profile_has_no_regions() {
        let profile = vec![0u32; 100];
        assert!(find_regions(&profile, 50, &SegmenterConfig::default()).is_empty());
    }

    #[test]
    fn test_blank_interval_between_gaps_is_dropped() {
        // Two blocks 100 apart: a gap is found on each side of the blank
        let mut profile = vec![0u32; 300];
        for x in (20..80).chain(180..240) {
            profile[x] = 50;
        }
        let regions = find_regions(&profile, 100, &SegmenterConfig::default());
        assert_eq!(regions, vec![region(20, 80), region(179, 240)]);
    }

    #[test]
    fn test_single_block_single_region() {
        let mut profile = vec![0u32; 200];
        for d in &mut profile[40..100] {
            *d = 50;
        }
        let regions = find_regions(&profile, 100, &SegmenterConfig::default());
        assert_eq!(regions, vec![region(40, 100)]);
    }

    #[test]
    fn test_evenly_spaced_blocks() {
        let mut image = RgbaImage::from_pixel(600, 100, WHITE);
        let starts = [30, 180, 330, 480];
        for &x in &starts {
            fill(&mut image, Rect::new(x, 20, 60, 70), BLACK);
        }

        let band = Rect::new(0, 0, 600, 100);
        let regions = segment_band(
            &image,
            band,
            WHITE,
            &ClassifierConfig::default(),
            &SegmenterConfig::default(),
        );

        // One region per block, matching it within 2px; blank stretches between
        // the flanking gaps are dropped
        assert_eq!(regions.len(), starts.len(), "regions: {:?}", regions);
        for (region, &x) in regions.iter().zip(&starts) {
            assert!(region.start_x.abs_diff(x) <= 2, "{:?} vs block at {}", region, x);
            assert!(region.end_x.abs_diff(x + 60) <= 2, "{:?} vs block at {}", region, x);
        }
        // Regions never overlap and are ordered
        for pair in regions.windows(2) {
            assert!(pair[0].end_x <= pair[1].start_x);
        }
    }

    #[test]
    fn test_oversized_equal_split_without_minima() {
        // Flat density 90 over 130 columns, row height 100: no minima below 80
        let profile = vec![90u32; 130];
        let parts = split_oversized(&profile, region(0, 130), 100, &SegmenterConfig::default());
        // ceil(130 / 60) = 3 equal slices of 43
        assert_eq!(parts, vec![region(0, 43), region(43, 86), region(86, 130)]);
    }

    #[test]
    fn test_oversized_split_at_minima() {
        let mut profile = vec![90u32; 300];
        for valley in [100usize, 200] {
            for d in 0..=5usize {
                let value = 10 + 10 * d as u32;
                profile[valley - d] = value;
                profile[valley + d] = value;
            }
        }
        let mut config = SegmenterConfig::default();
        config.split_width_ratio = 1.0;

        let parts = split_oversized(&profile, region(0, 300), 100, &config);
        assert_eq!(parts, vec![region(0, 100), region(100, 200), region(200, 300)]);
    }

    #[test]
    fn test_narrow_region_not_split() {
        let profile = vec![90u32; 120];
        let parts = split_oversized(&profile, region(0, 120), 100, &SegmenterConfig::default());
        assert_eq!(parts, vec![region(0, 120)]);
    }

    #[test]
    fn test_split_count_is_clamped() {
        let profile = vec![90u32; 2000];
        let parts = split_oversized(&profile, region(0, 2000), 100, &SegmenterConfig::default());
        assert_eq!(parts.len(), 8);
        assert_eq!(parts.last().map(|r| r.end_x), Some(2000));
    }

    #[test]
    fn test_equal_cells() {
        let cells = equal_cells(Rect::new(0, 0, 100, 10), 3);
        assert_eq!(cells, vec![region(0, 33), region(33, 66), region(66, 100)]);
        assert!(equal_cells(Rect::new(0, 0, 100, 10), 0).is_empty());
    }
}
