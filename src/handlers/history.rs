//! History command handler
//!
//! Lists recorded sync attempts, most recent first.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::diff::ChangeKind;
use crate::history::{SyncHistoryEntry, SyncHistoryStore};

/// Handle history list command
///
/// `limit` of zero shows everything; `show_files` adds the per-file changes.
pub fn handle_history_list(repository: Option<&str>, limit: usize, show_files: bool) -> Result<()> {
    let history = SyncHistoryStore::load().context("Failed to load sync history")?;
    let entries = history.query(repository, limit);

    if entries.is_empty() {
        match repository {
            Some(name) => println!("{}", format!("No sync history for '{name}'.").yellow()),
            None => println!("{}", "No sync history yet.".yellow()),
        }
        return Ok(());
    }

    println!("{}", "Sync History".cyan().bold());
    println!("{}", "=".repeat(80).cyan());

    for (idx, entry) in entries.iter().enumerate() {
        println!("\n{} {}", format!("{}.", idx + 1).bold(), entry_headline(entry));
        for line in entry_details(entry) {
            println!("   {line}");
        }

        if show_files && !entry.file_changes.is_empty() {
            for change in &entry.file_changes {
                let marker = change.kind.marker().to_string();
                let marker = match change.kind {
                    ChangeKind::Added => marker.green(),
                    ChangeKind::Modified => marker.yellow(),
                    ChangeKind::Deleted => marker.red(),
                };
                println!("     {} {} ({} bytes)", marker, change.path, change.size);
            }
        }
    }

    let total = history.query(repository, 0).len();
    if total > entries.len() {
        println!(
            "\n{} Showing {} of {} entries",
            "Note:".yellow(),
            entries.len(),
            total
        );
    }

    Ok(())
}

fn entry_headline(entry: &SyncHistoryEntry) -> String {
    let status = if entry.success {
        "OK".green().bold()
    } else {
        "FAILED".red().bold()
    };
    format!("{} {} @ {}", status, entry.repository.bold(), entry.branch)
}

/// Plain detail lines shown under each entry
fn entry_details(entry: &SyncHistoryEntry) -> Vec<String> {
    let short_id: String = entry.id.chars().take(8).collect();

    let mut lines = vec![
        format!("Id:       {short_id}"),
        format!("Time:     {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
        format!(
            "Files:    {} (+{} ~{} -{})",
            entry.total_files, entry.added_count, entry.modified_count, entry.deleted_count
        ),
        format!("Duration: {}ms", entry.duration_ms),
    ];
    if let Some(error) = &entry.error {
        lines.push(format!("Error:    {error}"));
    }
    lines
}
