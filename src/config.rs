use anyhow::{Context, Result};
use std::path::PathBuf;

/// Name of the directory holding all stack-sync state
const APP_DIR_NAME: &str = "stack-sync";

/// Environment variable that overrides the configuration directory
pub const HOME_ENV_VAR: &str = "STACK_SYNC_HOME";

/// Cross-platform configuration directory manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the main configuration directory path following platform conventions:
    /// - `$STACK_SYNC_HOME` when set (any platform)
    /// - Linux: $XDG_CONFIG_HOME/stack-sync or ~/.config/stack-sync
    /// - macOS: ~/Library/Application Support/stack-sync
    /// - Windows: %APPDATA%\stack-sync
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(custom) = std::env::var(HOME_ENV_VAR) {
            if !custom.is_empty() {
                return Ok(PathBuf::from(custom));
            }
        }

        #[cfg(target_os = "linux")]
        {
            // Follow XDG Base Directory Specification
            if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
                Ok(PathBuf::from(xdg_config).join(APP_DIR_NAME))
            } else {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                Ok(home.join(".config").join(APP_DIR_NAME))
            }
        }

        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home
                .join("Library")
                .join("Application Support")
                .join(APP_DIR_NAME))
        }

        #[cfg(target_os = "windows")]
        {
            Ok(dirs::config_dir()
                .context("Failed to get Windows config directory")?
                .join(APP_DIR_NAME))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(".stack-sync"))
        }
    }

    /// Get the repository profile file path (config.toml)
    pub fn repositories_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the sync history file path
    pub fn history_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("history.json"))
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("stack-sync.log"))
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;
        Ok(config_dir)
    }
}
