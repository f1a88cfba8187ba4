//! Init command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::{default_config_toml, CONFIG_FILE_NAME};

/// Execute the init command
pub fn run_init(force: bool) -> ExitCode {
    match write_default_config(Path::new(CONFIG_FILE_NAME), force) {
        Ok(()) => {
            println!("Created: {}", CONFIG_FILE_NAME);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn write_default_config(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!("'{}' already exists (use --force to overwrite)", path.display()));
    }
    let contents = default_config_toml().map_err(|e| e.to_string())?;
    std::fs::write(path, contents).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_write_default_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);

        write_default_config(&path, false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(parse_config(&text).is_ok());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "# mine").unwrap();

        let err = write_default_config(&path, false).unwrap_err();
        assert!(err.contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");

        write_default_config(&path, true).unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "# mine");
    }
}
