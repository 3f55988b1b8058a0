//! Diff toggle list: every entry starts selected, the operator inspects and
//! flips entries by number before confirming or aborting.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::{Operator, Selection};
use crate::diff::{render_entry_diff, ChangeKind, DiffEntry};

/// One parsed toggle-list command; indices are 1-based as typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleCommand {
    View(usize),
    Toggle(usize),
    SelectAll,
    SelectNone,
    Confirm,
    Cancel,
}

impl ToggleCommand {
    /// Parse one command line against `count` entries
    ///
    /// The error is the message to show before asking again.
    pub fn parse(line: &str, count: usize) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();

        let index = |arg: Option<&str>, example: &str| -> Result<usize, String> {
            let Some(arg) = arg else {
                return Err(format!("Enter an entry number, for example: {example}"));
            };
            match arg.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => Ok(n),
                _ => Err(format!("Invalid entry number '{arg}': expected 1-{count}")),
            }
        };

        match command.as_str() {
            "v" => index(parts.next(), "v 3").map(ToggleCommand::View),
            "t" => index(parts.next(), "t 3").map(ToggleCommand::Toggle),
            "a" => Ok(ToggleCommand::SelectAll),
            "n" => Ok(ToggleCommand::SelectNone),
            "c" => Ok(ToggleCommand::Confirm),
            "q" => Ok(ToggleCommand::Cancel),
            other => Err(format!("Unknown command '{other}': use v/t/a/n/c/q")),
        }
    }
}

/// Run the toggle list over `entries`
///
/// Confirming returns the selected entries in original order, possibly none.
/// Quitting, or running out of input, returns [`Selection::Cancelled`].
pub fn prompt(
    entries: &[DiffEntry],
    source_root: &Path,
    target_root: &Path,
    operator: &mut dyn Operator,
) -> Result<Selection<DiffEntry>> {
    let mut selected = vec![true; entries.len()];

    loop {
        print_entries(entries, &selected);

        let Some(line) =
            operator.read_line("\nCommand (v <n> / t <n> / a / n / c / q): ")?
        else {
            log::debug!("Input ended during diff preview; treating as cancel");
            return Ok(Selection::Cancelled);
        };
        if line.trim().is_empty() {
            continue;
        }

        match ToggleCommand::parse(&line, entries.len()) {
            Ok(ToggleCommand::View(n)) => {
                match render_entry_diff(&entries[n - 1], source_root, target_root) {
                    Ok(text) if text.is_empty() => println!("{}", "(no textual changes)".dimmed()),
                    Ok(text) => print_colored_diff(&text),
                    Err(e) => println!("{} Failed to show diff: {:#}", "✗".red(), e),
                }
            }
            Ok(ToggleCommand::Toggle(n)) => selected[n - 1] = !selected[n - 1],
            Ok(ToggleCommand::SelectAll) => selected.iter_mut().for_each(|s| *s = true),
            Ok(ToggleCommand::SelectNone) => selected.iter_mut().for_each(|s| *s = false),
            Ok(ToggleCommand::Confirm) => {
                let chosen = entries
                    .iter()
                    .zip(&selected)
                    .filter(|(_, keep)| **keep)
                    .map(|(entry, _)| entry.clone())
                    .collect();
                return Ok(Selection::Confirmed(chosen));
            }
            Ok(ToggleCommand::Cancel) => return Ok(Selection::Cancelled),
            Err(message) => println!("{}", message.yellow()),
        }
    }
}

fn print_entries(entries: &[DiffEntry], selected: &[bool]) {
    println!("\n{}", "=".repeat(80));
    println!(
        "{}",
        "📄  Diff Preview (v <n> view diff, t <n> toggle, a all, n none, c confirm, q cancel)"
            .bold()
    );
    println!("{}", "-".repeat(80));

    for (i, (entry, keep)) in entries.iter().zip(selected).enumerate() {
        let mark = if *keep { "[x]" } else { "[ ]" };
        let marker = match entry.kind {
            ChangeKind::Added => entry.kind.marker().to_string().green(),
            ChangeKind::Modified => entry.kind.marker().to_string().yellow(),
            ChangeKind::Deleted => entry.kind.marker().to_string().red(),
        };
        println!("{:2}. {} {} {}", i + 1, mark, marker, entry.path);
    }
}

fn print_colored_diff(text: &str) {
    for line in text.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
}
