//! JSON manifest describing a sliced sheet.
//!
//! The manifest sits next to the frame PNGs and tells a renderer which
//! files make up each animation and how to play them.
//!
//! # Example Output
//!
//! ```json
//! {
//!   "source": "hero.png",
//!   "canvas": [68, 200],
//!   "background": "#FFFFFFFF",
//!   "animations": [
//!     {
//!       "name": "idle",
//!       "fps": 1.0,
//!       "loop": true,
//!       "frames": [
//!         { "file": "hero_idle_0.png", "source": { "x": 20, "y": 70, "width": 60, "height": 60 } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::color::to_hex;
use crate::models::{AnimationSet, Rect};
use crate::output::frame_path;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error type for manifest export.
#[derive(Debug)]
pub enum ManifestError {
    /// IO error during file writing
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Io(e) => write!(f, "IO error: {}", e),
            ManifestError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ManifestError {}

impl From<std::io::Error> for ManifestError {
    fn from(e: std::io::Error) -> Self {
        ManifestError::Io(e)
    }
}

impl From<serde_json::Error> for ManifestError {
    fn from(e: serde_json::Error) -> Self {
        ManifestError::Serialization(e.to_string())
    }
}

/// Top-level manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Input file name
    pub source: String,
    /// Shared frame size `[width, height]`
    pub canvas: [u32; 2],
    /// Background color the sheet was segmented against, `#RRGGBBAA`
    pub background: String,
    /// Scale that brings the canvas to the configured target height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_scale: Option<f32>,
    pub animations: Vec<ManifestAnimation>,
}

/// One animation in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestAnimation {
    pub name: String,
    pub fps: f32,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub frames: Vec<ManifestFrame>,
}

/// One frame file in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFrame {
    /// Frame PNG, relative to the manifest
    pub file: String,
    /// Content rect in the source sheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Rect>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthesized: bool,
}

impl Manifest {
    /// Describe `set` as written with the given file stem.
    pub fn from_set(set: &AnimationSet, source: &str, stem: &str, target_height: Option<f32>) -> Self {
        let animations = set
            .animations
            .iter()
            .map(|animation| ManifestAnimation {
                name: animation.name().to_string(),
                fps: animation.fps,
                looping: animation.looping,
                frames: animation
                    .frames
                    .iter()
                    .enumerate()
                    .map(|(i, frame)| ManifestFrame {
                        file: frame_path(Path::new(""), stem, animation.name(), i).display().to_string(),
                        source: frame.source,
                        synthesized: frame.synthesized,
                    })
                    .collect(),
            })
            .collect();

        Self {
            source: source.to_string(),
            canvas: [set.canvas.0, set.canvas.1],
            background: to_hex(set.background),
            visual_scale: target_height.map(|h| set.visual_scale(h)),
            animations,
        }
    }

    /// Serialize the manifest to a JSON string.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, ManifestError> {
        let json = if pretty { serde_json::to_string_pretty(self)? } else { serde_json::to_string(self)? };
        Ok(json)
    }

    /// Write the manifest, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let json = self.to_json_string(true)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}
