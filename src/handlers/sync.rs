//! Sync command handler

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use super::repos::pick_repository;
use crate::logger;
use crate::repository::{RepositoryConfig, SyncConfig};
use crate::select::TerminalOperator;
use crate::sync::{sync_repository, SyncOptions, SyncOutcome};

/// Repository name recorded for `--source/--target` runs
pub const ADHOC_REPOSITORY: &str = "adhoc";

/// Arguments of the sync command
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    /// Configured repository name
    pub repository: Option<String>,
    /// Pre-filter keyword
    pub keyword: Option<String>,
    /// Non-interactive number/range selection
    pub numbers: Option<String>,
    /// Use the diff preview
    pub diff: bool,
    /// Ad-hoc source directory
    pub source: Option<PathBuf>,
    /// Ad-hoc target directory
    pub target: Option<PathBuf>,
    /// Include patterns for ad-hoc runs
    pub include: Vec<String>,
    /// Exclude patterns for ad-hoc runs
    pub exclude: Vec<String>,
}

/// Handle sync command
pub fn handle_sync(args: SyncArgs) -> Result<()> {
    let repository = resolve_repository(&args)?;
    let options = SyncOptions {
        keyword: args.keyword.clone(),
        numbers: args.numbers.clone(),
        diff: args.diff,
        ..SyncOptions::default()
    };

    let mut operator = TerminalOperator::new();
    let result = sync_repository(&repository, &options, &mut operator);

    let log_line = match &result {
        Ok(SyncOutcome::Synced(changes)) => {
            format!("sync {}: {} file(s) applied", repository.name, changes.len())
        }
        Ok(outcome) => format!("sync {}: {:?}", repository.name, outcome),
        Err(e) => format!("sync {}: failed: {:#}", repository.name, e),
    };
    if let Err(e) = logger::log_to_file(&log_line) {
        log::debug!("Failed to write log file: {:#}", e);
    }

    match result? {
        SyncOutcome::Synced(_) => {}
        SyncOutcome::UpToDate => println!("{} {} is up to date", "✓".green(), repository.name),
        SyncOutcome::NothingSelected => println!("{}", "Nothing to sync.".yellow()),
        SyncOutcome::Cancelled => println!("{}", "Sync cancelled; nothing recorded.".yellow()),
    }
    Ok(())
}

fn resolve_repository(args: &SyncArgs) -> Result<RepositoryConfig> {
    if let (Some(source), Some(target)) = (&args.source, &args.target) {
        let mut repository = RepositoryConfig::new(ADHOC_REPOSITORY, source, target);
        if !args.include.is_empty() {
            repository.file_patterns = args.include.clone();
        }
        repository.exclude_patterns = args.exclude.clone();
        return Ok(repository);
    }

    let config = SyncConfig::load().context("Failed to load repository config")?;
    match &args.repository {
        Some(name) => config
            .get_repository(name)
            .cloned()
            .with_context(|| format!("Repository '{}' not found", name)),
        None => pick_repository(&config),
    }
}
