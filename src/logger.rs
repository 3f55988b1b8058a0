use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;

use crate::config::ConfigManager;

/// Log files larger than this are rotated to `stack-sync.log.old`
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Initialize the logging system
///
/// Sets up logging to both console and a log file in the config directory.
///
/// **Console logging** is controlled via the `RUST_LOG` environment variable
/// (`error`, `warn`, `info`, `debug`, `trace`, `off`). The default is `info`.
///
/// **File logging** goes through [`log_to_file`] and lands in
/// `stack-sync.log` inside [`ConfigManager::config_dir`].
///
/// ```bash
/// # Show every diff entry the engine classifies
/// RUST_LOG=debug stack-sync sync my-protos --diff
/// ```
pub fn init_logger() -> Result<()> {
    ConfigManager::ensure_config_dir()?;

    let default_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(default_level)
        .target(env_logger::Target::Stderr)
        .try_init()
        .ok(); // already initialized in tests

    rotate_log_if_needed()?;
    log_to_file(&format!("Logger initialized with level: {default_level:?}"))?;

    Ok(())
}

/// Append a line to the persistent log file
pub fn log_to_file(message: &str) -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )
    .with_context(|| format!("Failed to write log file: {}", log_path.display()))?;

    Ok(())
}

/// Rotate the log file once it exceeds 10MB
pub fn rotate_log_if_needed() -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;

    if log_path.exists() {
        let metadata = std::fs::metadata(&log_path)?;

        if metadata.len() > MAX_LOG_SIZE {
            let old_log_path = log_path.with_extension("log.old");

            if old_log_path.exists() {
                std::fs::remove_file(&old_log_path)?;
            }

            std::fs::rename(&log_path, &old_log_path)?;

            log::info!("Log file rotated to {}", old_log_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HOME_ENV_VAR;
    use serial_test::serial;
    use std::fs::File;
    use tempfile::TempDir;

    fn with_temp_home() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::env::set_var(HOME_ENV_VAR, temp.path());
        temp
    }

    #[test]
    #[serial]
    fn test_init_logger_succeeds() {
        let _home = with_temp_home();
        assert!(init_logger().is_ok());
        std::env::remove_var(HOME_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_log_to_file() -> Result<()> {
        let _home = with_temp_home();
        log_to_file("Test log message")?;

        let log_path = ConfigManager::log_file_path()?;
        let contents = std::fs::read_to_string(&log_path)?;
        assert!(contents.contains("Test log message"));

        std::env::remove_var(HOME_ENV_VAR);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_rotate_log_creates_backup() -> Result<()> {
        let _home = with_temp_home();
        let log_path = ConfigManager::log_file_path()?;
        let mut file = File::create(&log_path)?;

        let data = vec![b'a'; 11 * 1024 * 1024];
        file.write_all(&data)?;
        drop(file);

        rotate_log_if_needed()?;

        let old_log_path = log_path.with_extension("log.old");
        assert!(old_log_path.exists());
        assert!(!log_path.exists());

        std::env::remove_var(HOME_ENV_VAR);
        Ok(())
    }
}
