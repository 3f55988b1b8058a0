//! Sync orchestration: Scan/Diff → Select → Apply → Log for one repository.
//!
//! Each call is one synchronization attempt. Applied attempts and failures
//! are recorded in the history log exactly once; no-op outcomes and operator
//! cancellation are not recorded at all.

mod post_sync;
mod summary;

pub use post_sync::run_post_sync_commands;
pub use summary::print_summary;

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::apply::{apply_entries, apply_paths, FileChange};
use crate::diff::{self, DiffEntry};
use crate::error::SelectionError;
use crate::history::{SyncHistoryEntry, SyncHistoryStore};
use crate::repository::RepositoryConfig;
use crate::scanner;
use crate::select::{
    self, filter_by_keyword, matches_keyword, parse_selection, pick, Operator, Selection,
};

/// How one synchronization attempt is driven
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Narrow candidates by keyword before selecting
    pub keyword: Option<String>,

    /// Number/range selection applied without prompting
    pub numbers: Option<String>,

    /// Select from a diff preview instead of a plain scan
    pub diff: bool,

    /// History file; `None` uses the default location
    pub history_path: Option<PathBuf>,

    /// Run the repository's post-sync commands after success
    pub run_post_sync: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            keyword: None,
            numbers: None,
            diff: false,
            history_path: None,
            run_post_sync: true,
        }
    }
}

/// How an attempt ended, short of failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Selection applied and recorded
    Synced(Vec<FileChange>),
    /// No candidates, or an empty diff
    UpToDate,
    /// Operator confirmed an empty selection, or the keyword matched nothing
    NothingSelected,
    /// Operator aborted
    Cancelled,
}

/// Confirmed work for the applier
enum Plan {
    Paths(Vec<String>),
    Entries(Vec<DiffEntry>),
}

enum Prepared {
    Apply(Plan),
    Done(SyncOutcome),
}

/// Run one synchronization attempt for `repository`
///
/// Filesystem failures are recorded as failed history entries, carrying any
/// changes applied before the failure, and then returned. A rejected `-n`
/// selection is returned without being recorded.
pub fn sync_repository(
    repository: &RepositoryConfig,
    options: &SyncOptions,
    operator: &mut dyn Operator,
) -> Result<SyncOutcome> {
    println!(
        "{}",
        format!("Syncing {} @ {}...", repository.name, repository.branch)
            .cyan()
            .bold()
    );
    log::info!(
        "Sync attempt for '{}': {} -> {}",
        repository.name,
        repository.source_dir.display(),
        repository.target_dir.display()
    );

    let started = Instant::now();
    let plan = match prepare(repository, options, operator) {
        Ok(Prepared::Apply(plan)) => plan,
        Ok(Prepared::Done(outcome)) => {
            log::info!("Sync of '{}' ended without changes: {:?}", repository.name, outcome);
            return Ok(outcome);
        }
        Err(e) => {
            if e.downcast_ref::<SelectionError>().is_none() {
                let entry = SyncHistoryEntry::failure(
                    &repository.name,
                    &repository.branch,
                    Vec::new(),
                    elapsed_ms(started),
                    format!("{:#}", e),
                );
                record_history(entry, options.history_path.clone());
            }
            return Err(e);
        }
    };

    let started = Instant::now();
    let result = match &plan {
        Plan::Paths(paths) => {
            println!(
                "Syncing {} selected files from {} to {}...",
                paths.len(),
                repository.source_dir.display(),
                repository.target_dir.display()
            );
            apply_paths(&repository.source_dir, &repository.target_dir, paths)
        }
        Plan::Entries(entries) => {
            println!("Applying {} diff entries...", entries.len());
            apply_entries(&repository.source_dir, &repository.target_dir, entries)
        }
    };
    let duration_ms = elapsed_ms(started);

    match result {
        Ok(changes) => {
            print_summary(&changes);
            record_history(
                SyncHistoryEntry::success(
                    &repository.name,
                    &repository.branch,
                    changes.clone(),
                    duration_ms,
                ),
                options.history_path.clone(),
            );
            println!(
                "{} Synced {} files in {}ms",
                "✓".green(),
                changes.len(),
                duration_ms
            );

            if options.run_post_sync {
                if let Err(e) = run_post_sync_commands(repository) {
                    log::warn!("Post-sync command failed for '{}': {:#}", repository.name, e);
                    println!("{} post-sync command failed: {:#}", "Warning:".yellow(), e);
                }
            }

            Ok(SyncOutcome::Synced(changes))
        }
        Err(e) => {
            print_summary(&e.applied);
            record_history(
                SyncHistoryEntry::failure(
                    &repository.name,
                    &repository.branch,
                    e.applied.clone(),
                    duration_ms,
                    e.to_string(),
                ),
                options.history_path.clone(),
            );
            Err(anyhow::Error::new(e))
                .with_context(|| format!("Failed to sync repository '{}'", repository.name))
        }
    }
}

fn prepare(
    repository: &RepositoryConfig,
    options: &SyncOptions,
    operator: &mut dyn Operator,
) -> Result<Prepared> {
    let prepared = if options.diff {
        prepare_entries(repository, options, operator)?
    } else {
        prepare_paths(repository, options, operator)?
    };

    if matches!(prepared, Prepared::Apply(_)) {
        fs::create_dir_all(&repository.target_dir).with_context(|| {
            format!(
                "Failed to create target directory: {}",
                repository.target_dir.display()
            )
        })?;
    }
    Ok(prepared)
}

fn prepare_paths(
    repository: &RepositoryConfig,
    options: &SyncOptions,
    operator: &mut dyn Operator,
) -> Result<Prepared> {
    println!("Scanning files in {}...", repository.source_dir.display());
    let mut candidates = scanner::scan(&repository.source_dir, &repository.patterns())?;

    if candidates.is_empty() {
        println!(
            "No files found matching patterns: {:?}",
            repository.file_patterns
        );
        return Ok(Prepared::Done(SyncOutcome::UpToDate));
    }

    if let Some(keyword) = &options.keyword {
        candidates = filter_by_keyword(&candidates, keyword);
        if candidates.is_empty() {
            println!("No files match keyword '{}'", keyword);
            return Ok(Prepared::Done(SyncOutcome::NothingSelected));
        }
        println!(
            "Pre-filtered to {} files matching '{}'",
            candidates.len(),
            keyword
        );
    }

    println!("Found {} files to sync", candidates.len());

    let selection = match &options.numbers {
        Some(numbers) => Selection::Confirmed(pick(
            &candidates,
            &parse_number_option(numbers, candidates.len())?,
        )),
        None => select::select_paths(&candidates, operator)?,
    };

    Ok(match selection {
        Selection::Cancelled => {
            println!("Selection cancelled");
            Prepared::Done(SyncOutcome::Cancelled)
        }
        Selection::Confirmed(paths) if paths.is_empty() => {
            println!("No files selected for sync");
            Prepared::Done(SyncOutcome::NothingSelected)
        }
        Selection::Confirmed(paths) => Prepared::Apply(Plan::Paths(paths)),
    })
}

fn prepare_entries(
    repository: &RepositoryConfig,
    options: &SyncOptions,
    operator: &mut dyn Operator,
) -> Result<Prepared> {
    println!(
        "Comparing {} with {}...",
        repository.source_dir.display(),
        repository.target_dir.display()
    );
    let mut entries = diff::diff(
        &repository.source_dir,
        &repository.target_dir,
        &repository.patterns(),
    )?;

    if entries.is_empty() {
        println!("{} Up to date", "✓".green());
        return Ok(Prepared::Done(SyncOutcome::UpToDate));
    }

    if let Some(keyword) = &options.keyword {
        entries.retain(|entry| matches_keyword(&entry.path, keyword));
        if entries.is_empty() {
            println!("No changed files match keyword '{}'", keyword);
            return Ok(Prepared::Done(SyncOutcome::NothingSelected));
        }
    }

    let selection = match &options.numbers {
        Some(numbers) => Selection::Confirmed(pick(
            &entries,
            &parse_number_option(numbers, entries.len())?,
        )),
        None => select::select_entries(
            &entries,
            &repository.source_dir,
            &repository.target_dir,
            operator,
        )?,
    };

    Ok(match selection {
        Selection::Cancelled => {
            println!("Diff preview cancelled");
            Prepared::Done(SyncOutcome::Cancelled)
        }
        Selection::Confirmed(entries) if entries.is_empty() => {
            println!("No files selected for sync");
            Prepared::Done(SyncOutcome::NothingSelected)
        }
        Selection::Confirmed(entries) => Prepared::Apply(Plan::Entries(entries)),
    })
}

fn parse_number_option(numbers: &str, count: usize) -> Result<Vec<usize>> {
    parse_selection(numbers, count).with_context(|| {
        format!(
            "Invalid selection '{}': use numbers (3), lists (1,3,5) or ranges (1-5) within 1-{}",
            numbers, count
        )
    })
}

/// Append an entry to the history log; failures only warn
fn record_history(entry: SyncHistoryEntry, history_path: Option<PathBuf>) {
    let result =
        SyncHistoryStore::from_path(history_path).and_then(|mut store| store.append(entry));

    match result {
        Ok(id) => log::debug!("Recorded history entry {id}"),
        Err(e) => {
            log::warn!("Failed to save sync history: {:#}", e);
            println!("{} failed to save sync history: {:#}", "Warning:".yellow(), e);
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
