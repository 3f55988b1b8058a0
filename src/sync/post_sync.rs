use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::repository::RepositoryConfig;

/// Run the repository's post-sync commands in ascending `order`
///
/// Stops at the first command that fails to start or exits unsuccessfully.
pub fn run_post_sync_commands(repository: &RepositoryConfig) -> Result<()> {
    let commands = repository.ordered_post_sync_commands();
    if commands.is_empty() {
        return Ok(());
    }

    let total = commands.len();
    println!("Executing {} post-sync commands...", total);

    for (i, command) in commands.into_iter().enumerate() {
        let directory = resolve_directory(&repository.target_dir, &command.directory);
        println!(
            "[{}/{}] Running: cd {} && {}",
            i + 1,
            total,
            directory.display(),
            command.command.cyan()
        );

        let status = shell(&command.command)
            .current_dir(&directory)
            .status()
            .with_context(|| {
                format!(
                    "Failed to start post-sync command in {}: {}",
                    directory.display(),
                    command.command
                )
            })?;

        if !status.success() {
            bail!("Post-sync command failed ({}): {}", status, command.command);
        }

        log::info!("Post-sync command completed: {}", command.command);
        println!("[{}/{}] {} {}", i + 1, total, "✓".green(), command.command);
    }

    Ok(())
}

/// Blank means the target root; relative paths resolve against it
fn resolve_directory(target_root: &Path, directory: &Path) -> PathBuf {
    if directory.as_os_str().is_empty() {
        target_root.to_path_buf()
    } else if directory.is_absolute() {
        directory.to_path_buf()
    } else {
        target_root.join(directory)
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::PostSyncCommand;

    #[test]
    fn test_resolve_directory() {
        let target = Path::new("/work/target");

        assert_eq!(resolve_directory(target, Path::new("")), target);
        assert_eq!(
            resolve_directory(target, Path::new("sub")),
            Path::new("/work/target/sub")
        );
        assert_eq!(
            resolve_directory(target, Path::new("/elsewhere")),
            Path::new("/elsewhere")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_commands_run_in_order_until_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut repo = RepositoryConfig::new("demo", dir.path(), dir.path());
        for (command, order) in [
            ("echo second >> order.log", 2),
            ("echo first >> order.log", 1),
            ("exit 3", 3),
            ("echo never >> order.log", 4),
        ] {
            repo.post_sync_commands.push(PostSyncCommand {
                directory: PathBuf::new(),
                command: command.to_string(),
                order,
            });
        }

        let err = run_post_sync_commands(&repo).unwrap_err();
        assert!(err.to_string().contains("exit 3"));

        let log = std::fs::read_to_string(dir.path().join("order.log")).unwrap();
        assert_eq!(log, "first\nsecond\n");
    }

    #[test]
    fn test_no_commands_is_ok() {
        let repo = RepositoryConfig::new("demo", "/s", "/t");
        assert!(run_post_sync_commands(&repo).is_ok());
    }
}
