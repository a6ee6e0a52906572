mod preferences;

pub use preferences::{
    DisplayPreferences, FilterPreferences, Preferences, ThemePreferences, TimerPreferences,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Overrides the configuration directory entirely.
pub const CONFIG_DIR_ENV: &str = "CLEARWATCH_CONFIG_DIR";

/// `dev` selects the development directory.
pub const ENV_SELECTOR: &str = "CLEARWATCH_ENV";

/// Returns `~/.config/clearwatch[-dev]/` based on CLEARWATCH_ENV, or
/// CLEARWATCH_CONFIG_DIR when set. The directory is created if missing.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var(ENV_SELECTOR).unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("clearwatch-dev")
            } else {
                base_dir.join("clearwatch")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirectoryUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
