//! framecut - Command-line tool for slicing generated spritesheets into animation frames

use std::process::ExitCode;

use framecut::cli;

fn main() -> ExitCode {
    cli::run()
}
