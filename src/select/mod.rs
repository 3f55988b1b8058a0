//! Interactive Selector.
//!
//! Reduces a candidate list to the operator's final selection. Plain paths go
//! through the mode prompt ([`select_paths`]), which dispatches to keyboard,
//! number, keyword, all or none; diff entries go through the toggle list
//! ([`select_entries`]). Every path ends in either a confirmed, possibly empty,
//! subset in candidate order or an explicit [`Selection::Cancelled`].

pub mod keyboard;
pub mod keyword;
pub mod numbers;
mod operator;
pub mod toggle;

pub use keyboard::{Key, KeyTerminal, KeyboardState};
pub use keyword::{filter_by_keyword, matches_keyword};
pub use numbers::{parse_selection, pick};
pub use operator::{is_interactive, Operator, ScriptedKeys, ScriptedOperator, TerminalOperator};

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::diff::DiffEntry;
use keyword::KeywordOutcome;

/// Final result of a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    /// The chosen subset, in candidate order; may be empty
    Confirmed(Vec<T>),
    /// Operator aborted; nothing must be applied or recorded
    Cancelled,
}

impl<T> Selection<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Selection::Cancelled)
    }

    /// Confirmed items, or `None` when cancelled
    pub fn into_confirmed(self) -> Option<Vec<T>> {
        match self {
            Selection::Confirmed(items) => Some(items),
            Selection::Cancelled => None,
        }
    }
}

/// Selection mode chosen at the mode prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Arrow-key navigation with a scrolling viewport
    Keyboard,
    /// Typed numbers and ranges
    Number,
    /// Case-insensitive keyword filter with confirmation
    Keyword,
    /// Every candidate
    All,
    /// No candidates
    None,
    /// Per-entry toggling over diff entries
    DiffToggle,
    /// Anything else, kept verbatim for the number/fallback handling
    Unrecognized(String),
}

impl SelectionMode {
    /// Map the raw mode token typed by the operator
    ///
    /// A blank line means all. `d` names the diff toggle list, which only
    /// applies when the candidates are diff entries.
    pub fn parse(input: &str) -> Self {
        let token = input.trim();
        match token.to_lowercase().as_str() {
            "" | "a" => SelectionMode::All,
            "k" => SelectionMode::Keyboard,
            "n" => SelectionMode::Number,
            "f" => SelectionMode::Keyword,
            "c" => SelectionMode::None,
            "d" => SelectionMode::DiffToggle,
            _ => SelectionMode::Unrecognized(token.to_string()),
        }
    }
}

/// Tell the operator that unrecognized input selected every candidate
pub(crate) fn report_fallback(input: &str, count: usize) {
    println!(
        "{} Invalid input '{}', selecting all {} files by default",
        "!".yellow(),
        input,
        count
    );
    log::info!("Unrecognized selection input '{input}'; selecting all {count} candidates");
}

fn print_candidates(candidates: &[String]) {
    println!("\n📁 {}", "Available files to sync:".bold());
    println!("────────────────────────────────────────");
    for (i, path) in candidates.iter().enumerate() {
        println!("  {}. {}", i + 1, path);
    }
}

fn print_modes() {
    println!("\n{}", "Selection modes:".bold());
    println!("  [k] - Keyboard mode (arrow keys + space)");
    println!("  [n] - Number mode (e.g. 1,3,5 or 1-5)");
    println!("  [a] - Select all files");
    println!("  [f] - Filter by keyword");
    println!("  [c] - Cancel (select none)");
    println!("  [Enter] - Select all files");
}

/// Select among plain candidate paths through the mode prompt
///
/// Input errors re-prompt without losing the candidate list. End of input
/// cancels.
pub fn select_paths(
    candidates: &[String],
    operator: &mut dyn Operator,
) -> Result<Selection<String>> {
    if candidates.is_empty() {
        return Ok(Selection::Confirmed(Vec::new()));
    }

    print_candidates(candidates);
    print_modes();

    loop {
        let Some(line) = operator.read_line("\nChoose selection mode: ")? else {
            return Ok(Selection::Cancelled);
        };

        let mode = SelectionMode::parse(&line);
        log::debug!("Selection mode: {:?}", mode);

        match mode {
            SelectionMode::All => return Ok(Selection::Confirmed(candidates.to_vec())),
            SelectionMode::None => return Ok(Selection::Confirmed(Vec::new())),
            SelectionMode::Keyboard => match operator.keyboard()? {
                Some(mut terminal) => {
                    let indices = keyboard::run(candidates, terminal.as_mut())?;
                    return Ok(Selection::Confirmed(pick(candidates, &indices)));
                }
                None => {
                    println!(
                        "{}",
                        "Keyboard mode needs an interactive terminal; choose another mode."
                            .yellow()
                    );
                }
            },
            SelectionMode::Number => {
                return Ok(match numbers::prompt(candidates.len(), operator)? {
                    Selection::Confirmed(indices) => {
                        Selection::Confirmed(pick(candidates, &indices))
                    }
                    Selection::Cancelled => Selection::Cancelled,
                });
            }
            SelectionMode::Keyword => match keyword::prompt(candidates, operator)? {
                KeywordOutcome::Accepted(paths) => return Ok(Selection::Confirmed(paths)),
                KeywordOutcome::Aborted => return Ok(Selection::Cancelled),
                KeywordOutcome::Back => {
                    print_candidates(candidates);
                    print_modes();
                }
            },
            SelectionMode::DiffToggle => {
                println!(
                    "{}",
                    "Diff toggling needs a diff preview (sync --diff); choose another mode.".yellow()
                );
            }
            SelectionMode::Unrecognized(raw) => {
                if !numbers::looks_like_selection(&raw) {
                    report_fallback(&raw, candidates.len());
                    return Ok(Selection::Confirmed(candidates.to_vec()));
                }
                match parse_selection(&raw, candidates.len()) {
                    Ok(indices) => return Ok(Selection::Confirmed(pick(candidates, &indices))),
                    Err(e) => println!(
                        "{} {} (or choose k, n, a, f, c)",
                        "✗".red(),
                        e
                    ),
                }
            }
        }
    }
}

/// Select among diff entries through the toggle list
pub fn select_entries(
    entries: &[DiffEntry],
    source_root: &Path,
    target_root: &Path,
    operator: &mut dyn Operator,
) -> Result<Selection<DiffEntry>> {
    if entries.is_empty() {
        return Ok(Selection::Confirmed(Vec::new()));
    }
    toggle::prompt(entries, source_root, target_root, operator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn select(lines: &[&str]) -> Selection<String> {
        let mut op = ScriptedOperator::new(lines.iter().copied());
        select_paths(&candidates(), &mut op).unwrap()
    }

    fn names(items: &[&str]) -> Selection<String> {
        Selection::Confirmed(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(SelectionMode::parse(""), SelectionMode::All);
        assert_eq!(SelectionMode::parse(" A "), SelectionMode::All);
        assert_eq!(SelectionMode::parse("k"), SelectionMode::Keyboard);
        assert_eq!(SelectionMode::parse("N"), SelectionMode::Number);
        assert_eq!(SelectionMode::parse("f"), SelectionMode::Keyword);
        assert_eq!(SelectionMode::parse("c"), SelectionMode::None);
        assert_eq!(SelectionMode::parse("D"), SelectionMode::DiffToggle);
        assert_eq!(
            SelectionMode::parse("1-2"),
            SelectionMode::Unrecognized("1-2".to_string())
        );
    }

    #[test]
    fn test_enter_selects_all() {
        assert_eq!(select(&[""]), Selection::Confirmed(candidates()));
    }

    #[test]
    fn test_cancel_letter_selects_none() {
        assert_eq!(select(&["c"]), names(&[]));
    }

    #[test]
    fn test_direct_numbers_at_mode_prompt() {
        assert_eq!(select(&["1,3"]), names(&["a.txt", "c.txt"]));
    }

    #[test]
    fn test_bad_numbers_reprompt() {
        assert_eq!(select(&["7", "2"]), names(&["b.txt"]));
    }

    #[test]
    fn test_unrecognized_falls_back_to_all() {
        assert_eq!(select(&["zzz"]), Selection::Confirmed(candidates()));
    }

    #[test]
    fn test_number_mode() {
        assert_eq!(select(&["n", "2-3"]), names(&["b.txt", "c.txt"]));
    }

    #[test]
    fn test_keyword_declined_returns_to_mode_prompt() {
        assert_eq!(select(&["f", "a.", "n", "n", "5"]), names(&["e.txt"]));
    }

    #[test]
    fn test_keyword_accepted() {
        assert_eq!(select(&["f", "D.TXT", "y"]), names(&["d.txt"]));
    }

    #[test]
    fn test_diff_toggle_on_plain_paths_reprompts() {
        assert_eq!(select(&["d", "2"]), names(&["b.txt"]));
    }

    #[test]
    fn test_keyboard_without_terminal_reprompts() {
        assert_eq!(select(&["k", "a"]), Selection::Confirmed(candidates()));
    }

    #[test]
    fn test_keyboard_with_scripted_keys() {
        let mut op = ScriptedOperator::new(["k"]).with_keys([
            Key::Down,
            Key::Toggle,
            Key::Up,
            Key::Up,
            Key::Toggle,
            Key::Confirm,
        ]);
        let selection = select_paths(&candidates(), &mut op).unwrap();
        assert_eq!(selection, names(&["b.txt", "e.txt"]));
    }

    #[test]
    fn test_end_of_input_cancels() {
        assert!(select(&[]).is_cancelled());
    }

    #[test]
    fn test_empty_candidates_confirm_nothing() {
        let mut op = ScriptedOperator::new(Vec::<String>::new());
        assert_eq!(select_paths(&[], &mut op).unwrap(), names(&[]));
        assert!(op.prompts.is_empty());
    }

    #[test]
    fn test_into_confirmed() {
        assert_eq!(names(&["x"]).into_confirmed(), Some(vec!["x".to_string()]));
        assert_eq!(Selection::<String>::Cancelled.into_confirmed(), None);
    }
}
