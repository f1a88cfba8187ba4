//! Pixel classification and color utilities
//!
//! Every decision about "is this pixel part of a character" goes through
//! [`is_content`]. Distances are normalized so that each channel contributes
//! at most 1.0, giving a range of `0.0..=3.0` for the RGB sum.
//!
//! Also parses hex color strings (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`)
//! for the background override in `framecut.toml`.

use image::Rgba;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// Normalized RGB distance between two colors (alpha ignored).
///
/// ```
/// use framecut::color::color_distance;
/// use image::Rgba;
///
/// let white = Rgba([255, 255, 255, 255]);
/// let black = Rgba([0, 0, 0, 255]);
/// assert_eq!(color_distance(white, black), 3.0);
/// assert_eq!(color_distance(white, white), 0.0);
/// ```
pub fn color_distance(a: Rgba<u8>, b: Rgba<u8>) -> f32 {
    let sum: u32 = (0..3).map(|i| (a[i] as i32 - b[i] as i32).unsigned_abs()).sum();
    sum as f32 / 255.0
}

/// Decide whether a pixel is character content rather than background.
///
/// Pixels whose normalized alpha is below `alpha_threshold` are never content.
/// Otherwise the pixel is content when its distance from `background`
/// exceeds `color_threshold`.
pub fn is_content(
    pixel: Rgba<u8>,
    background: Rgba<u8>,
    alpha_threshold: f32,
    color_threshold: f32,
) -> bool {
    if (pixel[3] as f32 / 255.0) < alpha_threshold {
        return false;
    }
    color_distance(pixel, background) > color_threshold
}

/// Format a color as `#RRGGBBAA`.
pub fn to_hex(color: Rgba<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}{:02X}", color[0], color[1], color[2], color[3])
}

/// Parse a hex color string into an RGBA color.
///
/// # Examples
///
/// ```
/// use framecut::color::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_hex_color("#FFFFFF80").unwrap(), image::Rgba([255, 255, 255, 128]));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, lacks the leading `#`, has the
/// wrong length or contains a non-hex character.
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;

    let digits = hex.chars().map(parse_hex_digit).collect::<Result<Vec<u8>, ColorError>>()?;

    match digits.as_slice() {
        // #RGB -> doubled digits, alpha = 255
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r2, g1, g2, b1, b2] => Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255])),
        [r1, r2, g1, g2, b1, b2, a1, a2] => {
            Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, a1 * 16 + a2]))
        }
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    c.to_digit(16).map(|d| d as u8).ok_or(ColorError::InvalidHex(c))
}
