//! Repository profile and init command handlers

use anyhow::{Context, Result};
use colored::Colorize;
use inquire::{Confirm, Select};

use crate::config::ConfigManager;
use crate::repository::{RepositoryConfig, SyncConfig};
use crate::select::is_interactive;

/// Handle repos list command
pub fn handle_repos_list() -> Result<()> {
    let config = SyncConfig::load().context("Failed to load repository config")?;

    if config.repositories.is_empty() {
        println!("{}", "No repositories configured.".yellow());
        println!(
            "{}",
            "Add one with 'stack-sync repos add' or run 'stack-sync init'.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Repositories".cyan().bold());
    println!("{}", "=".repeat(80).cyan());

    for repo in &config.repositories {
        println!("\n{} @ {}", repo.name.bold(), repo.branch);
        println!("   {} {}", "Source:".dimmed(), repo.source_dir.display());
        println!("   {} {}", "Target:".dimmed(), repo.target_dir.display());
        println!("   {} {}", "Include:".dimmed(), repo.file_patterns.join(", "));
        if !repo.exclude_patterns.is_empty() {
            println!("   {} {}", "Exclude:".dimmed(), repo.exclude_patterns.join(", "));
        }
        if !repo.post_sync_commands.is_empty() {
            println!(
                "   {} {}",
                "Post-sync:".dimmed(),
                repo.post_sync_commands.len()
            );
        }
    }

    Ok(())
}

/// Handle repos add command
pub fn handle_repos_add(repository: RepositoryConfig) -> Result<()> {
    let mut config = SyncConfig::load().context("Failed to load repository config")?;
    let name = repository.name.clone();

    config.add_repository(repository)?;
    config.save().context("Failed to save repository config")?;

    log::info!("Added repository '{name}'");
    println!("{} Added repository '{}'", "✓".green(), name);
    Ok(())
}

/// Handle repos remove command, confirming first unless `yes`
pub fn handle_repos_remove(name: &str, yes: bool) -> Result<()> {
    let mut config = SyncConfig::load().context("Failed to load repository config")?;

    if config.get_repository(name).is_none() {
        anyhow::bail!("Repository '{}' not found", name);
    }

    if !yes {
        let confirmed = Confirm::new(&format!("Remove repository '{name}'?"))
            .with_default(false)
            .prompt()
            .context("Failed to get confirmation")?;
        if !confirmed {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    config.remove_repository(name)?;
    config.save().context("Failed to save repository config")?;

    log::info!("Removed repository '{name}'");
    println!("{} Removed repository '{}'", "✓".green(), name);
    Ok(())
}

/// Handle init command: write a starter config.toml
pub fn handle_init(force: bool) -> Result<()> {
    ConfigManager::ensure_config_dir()?;
    let path = ConfigManager::repositories_config_path()?;

    if path.exists() && !force {
        let overwrite = Confirm::new(&format!("{} already exists. Overwrite?", path.display()))
            .with_default(false)
            .prompt()
            .context("Failed to get confirmation")?;
        if !overwrite {
            println!("{}", "Keeping existing configuration.".yellow());
            return Ok(());
        }
    }

    SyncConfig::example().save_to(&path)?;

    println!("{} Wrote {}", "✓".green(), path.display());
    println!(
        "{}",
        "Edit the example repository, then run 'stack-sync sync'.".dimmed()
    );
    Ok(())
}

/// Ask the operator which configured repository to sync
pub fn pick_repository(config: &SyncConfig) -> Result<RepositoryConfig> {
    match config.repositories.as_slice() {
        [] => anyhow::bail!(
            "No repositories configured. Run 'stack-sync init' or pass --source and --target."
        ),
        [only] => Ok(only.clone()),
        _ => {
            if !is_interactive() {
                anyhow::bail!(
                    "Several repositories configured; name one of: {}",
                    config.names().join(", ")
                );
            }

            let name = Select::new("Select repository to sync:", config.names())
                .with_help_message("Use arrow keys to navigate, Enter to select")
                .prompt()
                .context("Failed to select repository")?;

            config
                .get_repository(name)
                .cloned()
                .with_context(|| format!("Repository '{}' not found", name))
        }
    }
}
