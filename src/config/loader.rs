//! Configuration loading and discovery for `framecut.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{BandStrategy, SliceMode, SlicerConfig};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for
pub const CONFIG_FILE_NAME: &str = "framecut.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse framecut.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Serialization error when writing a config
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Force manual (frame-count hint) slicing
    pub manual: Option<bool>,
    /// Force content band detection
    pub content_bands: Option<bool>,
    /// Override canvas padding
    pub padding: Option<u32>,
    /// Override background color (hex)
    pub background: Option<String>,
}

/// Find framecut.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for framecut.toml
/// 2. Check XDG_CONFIG_HOME/framecut/framecut.toml (or ~/.config/framecut/framecut.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find framecut.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("framecut").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find framecut.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a framecut.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("sheets/framecut.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<SlicerConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            tracing::debug!("Loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(SlicerConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<SlicerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<SlicerConfig, ConfigError> {
    let config: SlicerConfig = toml::from_str(contents)?;
    check(config)
}

/// Run validation, turning any problems into `ConfigError::Validation`.
pub fn check(config: SlicerConfig) -> Result<SlicerConfig, ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

/// Render the default configuration as TOML, for `framecut init`.
pub fn default_config_toml() -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(&SlicerConfig::default())?)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut SlicerConfig, overrides: &CliOverrides) {
    if let Some(manual) = overrides.manual {
        config.layout.mode = if manual { SliceMode::Manual } else { SliceMode::Auto };
    }

    if let Some(content_bands) = overrides.content_bands {
        config.layout.bands = if content_bands { BandStrategy::Content } else { BandStrategy::Fixed };
    }

    if let Some(padding) = overrides.padding {
        config.canvas.padding = padding;
    }

    if let Some(ref background) = overrides.background {
        config.classifier.background = Some(background.clone());
    }
}
