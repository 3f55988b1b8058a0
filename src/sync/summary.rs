use colored::Colorize;

use crate::apply::{count_by_kind, FileChange};
use crate::diff::ChangeKind;

/// Colored one-line description of an applied change
pub(crate) fn format_change(change: &FileChange) -> String {
    let marker = change.kind.marker().to_string();
    let marker = match change.kind {
        ChangeKind::Added => marker.green(),
        ChangeKind::Modified => marker.yellow(),
        ChangeKind::Deleted => marker.red(),
    };
    format!("  {} {} ({} bytes)", marker, change.path, change.size)
}

/// Print totals and the per-file list of an application
pub fn print_summary(changes: &[FileChange]) {
    let (added, modified, deleted) = count_by_kind(changes);

    println!("\n{}", "=".repeat(60));
    println!("{}", "📊 Sync Change Summary".bold());
    println!("{}", "=".repeat(60));
    println!("Total files: {}", changes.len().to_string().cyan());
    println!("  {} Added:    {} files", "✓".green(), added);
    println!("  {} Modified: {} files", "~".yellow(), modified);
    println!("  {} Deleted:  {} files", "✗".red(), deleted);
    println!("{}", "-".repeat(60));

    if !changes.is_empty() {
        println!("\n{}", "Detailed changes:".bold());
        for change in changes {
            println!("{}", format_change(change));
        }
    }
    println!("{}\n", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_change_names_path_and_size() {
        colored::control::set_override(false);
        let line = format_change(&FileChange::new("api/a.proto", ChangeKind::Deleted, 42));
        assert_eq!(line, "  D api/a.proto (42 bytes)");
    }
}
