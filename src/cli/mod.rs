//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod init;
mod inspect;
mod slice;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::output::is_output_name;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path has a PNG extension.
pub fn is_png_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Find all PNG files in a directory (recursively), in sorted order.
///
/// Frames and preview sheets written by earlier runs are skipped.
pub fn find_png_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let dir_str = dir.display().to_string();

    if let Ok(paths) = glob(&format!("{}/**/*.png", dir_str)) {
        files.extend(paths.filter_map(Result::ok).filter(|path| {
            !path.file_name().and_then(|n| n.to_str()).is_some_and(is_output_name)
        }));
    }

    files.sort();
    files
}

/// framecut - Slice generated character spritesheets into animation frames
#[derive(Parser)]
#[command(name = "framecut")]
#[command(about = "framecut - Slice generated character spritesheets into normalized animation frames")]
#[command(version)]
pub struct Cli {
    /// Log every segmentation decision
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Slice spritesheets into per-animation frame PNGs
    Slice {
        /// Input PNG files or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (default: nearest framecut.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Split rows into equal cells using the configured frame counts
        #[arg(long)]
        manual: bool,

        /// Locate rows by detecting content bands instead of dividing evenly
        #[arg(long)]
        bands: bool,

        /// Transparent margin around frame content (pixels)
        #[arg(long)]
        padding: Option<u32>,

        /// Background color override (e.g., "#FFFFFF")
        #[arg(long)]
        background: Option<String>,

        /// Also write a preview sheet with one row per animation
        #[arg(long)]
        sheet: bool,

        /// Also write a JSON manifest
        #[arg(long)]
        manifest: bool,

        /// Number of files processed in parallel (default: all cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Show bands and candidate regions without writing anything
    Inspect {
        /// Input PNG file
        input: PathBuf,

        /// Config file (default: nearest framecut.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a default framecut.toml in the current directory
    Init {
        /// Overwrite an existing framecut.toml
        #[arg(long)]
        force: bool,
    },
}

/// Install the log subscriber. Logs go to stderr so stdout stays parseable.
fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Slice {
            inputs,
            output,
            config,
            manual,
            bands,
            padding,
            background,
            sheet,
            manifest,
            jobs,
        } => slice::run_slice(slice::SliceArgs {
            inputs,
            output,
            config,
            manual,
            bands,
            padding,
            background,
            sheet,
            manifest,
            jobs,
        }),
        Commands::Inspect { input, config, json } => {
            inspect::run_inspect(&input, config.as_deref(), json)
        }
        Commands::Init { force } => init::run_init(force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_png_file() {
        assert!(is_png_file(Path::new("hero.png")));
        assert!(is_png_file(Path::new("path/to/HERO.PNG")));
        assert!(!is_png_file(Path::new("hero.jpg")));
        assert!(!is_png_file(Path::new("png")));
        assert!(!is_png_file(Path::new("hero")));
    }

    #[test]
    fn test_find_png_files() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();

        fs::write(dir_path.join("b.png"), "").unwrap();
        fs::write(dir_path.join("a.png"), "").unwrap();
        fs::write(dir_path.join("notes.txt"), "ignored").unwrap();

        let sub_dir = dir_path.join("subdir");
        fs::create_dir(&sub_dir).unwrap();
        fs::write(sub_dir.join("nested.png"), "").unwrap();

        let files = find_png_files(dir_path);
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a.png"));
        assert!(files.iter().all(|f| is_png_file(f)));
    }

    #[test]
    fn test_find_png_files_skips_outputs() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();

        fs::write(dir_path.join("hero.png"), "").unwrap();
        fs::write(dir_path.join("hero_idle_0.png"), "").unwrap();
        fs::write(dir_path.join("hero_run_5.png"), "").unwrap();
        fs::write(dir_path.join("hero_sheet.png"), "").unwrap();

        let files = find_png_files(dir_path);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("hero.png"));
    }

    #[test]
    fn test_cli_parses_slice_flags() {
        let cli = Cli::try_parse_from([
            "framecut", "-v", "slice", "hero.png", "-o", "out", "--manual", "--sheet", "--jobs", "2",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Slice { inputs, output, manual, sheet, manifest, jobs, .. } => {
                assert_eq!(inputs, vec![PathBuf::from("hero.png")]);
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(manual && sheet && !manifest);
                assert_eq!(jobs, Some(2));
            }
            _ => panic!("expected slice command"),
        }
    }

    #[test]
    fn test_cli_slice_requires_input() {
        assert!(Cli::try_parse_from(["framecut", "slice"]).is_err());
    }
}
