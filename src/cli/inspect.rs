//! Inspect command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::load_config;
use crate::output::load_image;
use crate::pipeline::{inspect_spritesheet, RowReport};

/// Execute the inspect command
pub fn run_inspect(input: &Path, config_path: Option<&Path>, json: bool) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let image = match load_image(input) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let reports = match inspect_spritesheet(&image, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        match serde_json::to_string_pretty(&reports) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print!("{}", format_reports(&reports));
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Human-readable table of bands and regions.
fn format_reports(reports: &[RowReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let accepted = report.regions.iter().filter(|r| r.accepted()).count();
        out.push_str(&format!(
            "{}: band {}{}, {} regions, {} accepted\n",
            report.animation,
            report.band,
            if report.band_fallback { " (fixed fallback)" } else { "" },
            report.regions.len(),
            accepted
        ));
        for region in &report.regions {
            let verdict = match &region.rejected {
                None => format!("ok {}", region.content),
                Some(reason) => format!("rejected: {}", reason),
            };
            out.push_str(&format!("  {:>11}  {}\n", region.region.to_string(), verdict));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimationKind, Rect, Region};
    use crate::pipeline::RegionReport;

    #[test]
    fn test_format_reports() {
        let reports = vec![RowReport {
            animation: AnimationKind::Run,
            band: Rect::new(0, 100, 300, 100),
            band_fallback: true,
            regions: vec![
                RegionReport {
                    region: Region { start_x: 10, end_x: 60 },
                    content: Rect::new(12, 120, 40, 60),
                    rejected: None,
                },
                RegionReport {
                    region: Region { start_x: 60, end_x: 120 },
                    content: Rect::default(),
                    rejected: Some("no content".to_string()),
                },
            ],
        }];

        let text = format_reports(&reports);
        assert!(text.starts_with("run: band 300x100 @ (0, 100) (fixed fallback), 2 regions, 1 accepted\n"));
        assert!(text.contains("10-60  ok 40x60 @ (12, 120)"));
        assert!(text.contains("60-120  rejected: no content"));
    }
}
