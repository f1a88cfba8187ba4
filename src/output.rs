//! PNG input/output and file path generation

use crate::models::AnimationKind;
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image decoding or encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Decode an image file into RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage, OutputError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Save an RGBA image to a PNG file.
///
/// Parent directories are created as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Directory the outputs of `input` are written to.
///
/// The `-o` argument wins; otherwise outputs land next to the input.
pub fn output_dir(input: &Path, output_arg: Option<&Path>) -> PathBuf {
    match output_arg {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    }
}

/// File stem used to prefix every output of `input`.
pub fn input_stem(input: &Path) -> String {
    input.file_stem().and_then(|s| s.to_str()).unwrap_or("sheet").to_string()
}

/// Generate the path of one frame.
///
/// | Output | Path |
/// |--------|------|
/// | Frame 0 of "idle" for `hero.png` | `hero_idle_0.png` |
/// | Preview sheet | `hero_sheet.png` |
/// | Manifest | `hero.json` |
pub fn frame_path(dir: &Path, stem: &str, animation: &str, index: usize) -> PathBuf {
    dir.join(format!("{}_{}_{}.png", stem, animation, index))
}

/// Path of the preview sheet.
pub fn sheet_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}_sheet.png", stem))
}

/// Path of the JSON manifest.
pub fn manifest_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.json", stem))
}

/// Whether a file name matches a frame or preview sheet this tool writes.
pub fn is_output_name(file_name: &str) -> bool {
    let Some(base) = file_name.strip_suffix(".png") else {
        return false;
    };
    if base.strip_suffix("_sheet").is_some_and(|stem| !stem.is_empty()) {
        return true;
    }
    let mut parts = base.rsplitn(3, '_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(index), Some(animation), Some(stem)) => {
            !stem.is_empty()
                && !index.is_empty()
                && index.bytes().all(|b| b.is_ascii_digit())
                && AnimationKind::from_name(animation).is_some()
        }
        _ => false,
    }
}
