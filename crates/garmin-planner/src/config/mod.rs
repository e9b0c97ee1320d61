mod credentials;

pub use credentials::CredentialStore;

use crate::error::{PlannerError, Result};
use std::path::PathBuf;

/// Default configuration directory name
const CONFIG_DIR_NAME: &str = "garmin-planner";

/// Get the configuration directory path
/// Returns ~/.config/garmin-planner on Unix, ~/Library/Application Support/garmin-planner on macOS
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(CONFIG_DIR_NAME))
        .ok_or_else(|| PlannerError::config("Could not determine config directory"))
}

/// Get the data directory path for storing session tokens
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(CONFIG_DIR_NAME))
        .ok_or_else(|| PlannerError::config("Could not determine data directory"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_exists() {
        let dir = config_dir();
        assert!(dir.is_ok());
        assert!(dir.unwrap().ends_with("garmin-planner"));
    }

    #[test]
    fn test_data_dir_exists() {
        let dir = data_dir();
        assert!(dir.is_ok());
        assert!(dir.unwrap().ends_with("garmin-planner"));
    }
}
