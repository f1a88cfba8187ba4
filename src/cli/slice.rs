//! Slice command implementation

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{find_png_files, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::color::parse_hex_color;
use crate::config::{check, load_config, merge_cli_overrides, CliOverrides, SlicerConfig};
use crate::manifest::Manifest;
use crate::output::{frame_path, input_stem, load_image, manifest_path, output_dir, save_png, sheet_path};
use crate::pipeline::slice_spritesheet;
use crate::spritesheet::render_preview;

/// Arguments of the slice command
pub struct SliceArgs {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub manual: bool,
    pub bands: bool,
    pub padding: Option<u32>,
    pub background: Option<String>,
    pub sheet: bool,
    pub manifest: bool,
    pub jobs: Option<usize>,
}

/// What was written for one input
struct FileSummary {
    animations: usize,
    frames: usize,
    canvas: (u32, u32),
    synthesized: usize,
}

/// Execute the slice command
pub fn run_slice(args: SliceArgs) -> ExitCode {
    if let Some(bg) = &args.background {
        if let Err(e) = parse_hex_color(bg) {
            eprintln!("Error: --background '{}': {}", bg, e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }
    if args.jobs == Some(0) {
        eprintln!("Error: --jobs must be at least 1");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let overrides = CliOverrides {
        manual: args.manual.then_some(true),
        content_bands: args.bands.then_some(true),
        padding: args.padding,
        background: args.background.clone(),
    };
    merge_cli_overrides(&mut config, &overrides);
    let config = match check(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let files = match collect_inputs(&args.inputs) {
        Ok(files) => files,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let process = || -> Vec<Result<FileSummary, String>> {
        files.par_iter().map(|input| slice_file(input, &args, &config)).collect()
    };
    let results = match args.jobs {
        None => process(),
        Some(jobs) => match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => pool.install(process),
            Err(e) => {
                eprintln!("Error: Failed to start worker pool: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
    };

    let mut failed = 0;
    for (input, result) in files.iter().zip(results) {
        match result {
            Ok(summary) => {
                println!(
                    "Sliced: {} ({} animations, {} frames, {}x{})",
                    input.display(),
                    summary.animations,
                    summary.frames,
                    summary.canvas.0,
                    summary.canvas.1
                );
                if summary.synthesized > 0 {
                    eprintln!(
                        "Warning: {}: {} fallback frame(s), no usable region found",
                        input.display(),
                        summary.synthesized
                    );
                }
            }
            Err(e) => {
                eprintln!("Error: {}: {}", input.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Expand directories into the PNG files they contain.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = find_png_files(input);
            if found.is_empty() {
                return Err(format!("No PNG files found in '{}'", input.display()));
            }
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(format!("Input '{}' not found", input.display()));
        }
    }
    Ok(files)
}

fn slice_file(input: &Path, args: &SliceArgs, config: &SlicerConfig) -> Result<FileSummary, String> {
    let image = load_image(input).map_err(|e| e.to_string())?;
    let outcome = slice_spritesheet(&image, config).map_err(|e| e.to_string())?;
    let set = &outcome.set;

    let dir = output_dir(input, args.output.as_deref());
    let stem = input_stem(input);

    let mut synthesized = 0;
    for animation in &set.animations {
        for (i, frame) in animation.frames.iter().enumerate() {
            let path = frame_path(&dir, &stem, animation.name(), i);
            save_png(&frame.image, &path)
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            if frame.synthesized {
                synthesized += 1;
            }
        }
    }

    if args.sheet {
        let path = sheet_path(&dir, &stem);
        save_png(&render_preview(set), &path)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    }

    if args.manifest {
        let path = manifest_path(&dir, &stem);
        let source = input.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        Manifest::from_set(set, &source, &stem, config.layout.target_height)
            .write(&path)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    }

    Ok(FileSummary {
        animations: set.animations.len(),
        frames: set.frame_count(),
        canvas: set.canvas,
        synthesized,
    })
}
