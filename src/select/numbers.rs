//! Number/range selection: `3`, `1,3,5`, `2-4`, or any comma-separated mix.

use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeSet;

use super::{report_fallback, Operator, Selection};
use crate::error::SelectionError;

/// Whether `input` uses only selection characters (digits, commas, hyphens, spaces)
pub fn looks_like_selection(input: &str) -> bool {
    input
        .chars()
        .all(|c| c.is_ascii_digit() || c == ',' || c == '-' || c == ' ')
}

/// Parse a number/range selection against `count` candidates
///
/// Returns 0-based indices, deduplicated and ascending. Blank input selects
/// every candidate. Any malformed or out-of-range token rejects the whole
/// input.
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>, SelectionError> {
    let input = input.trim();

    if input.is_empty() {
        return Ok((0..count).collect());
    }
    if let Some(bad) = input
        .chars()
        .find(|c| !(c.is_ascii_digit() || *c == ',' || *c == '-' || *c == ' '))
    {
        return Err(SelectionError::InvalidCharacter(bad));
    }
    if count == 0 {
        return Err(SelectionError::Empty);
    }

    let mut indices = BTreeSet::new();

    for token in input.split(',').map(str::trim) {
        if token.contains('-') {
            let (start, end) = parse_range(token)?;
            if start == 0 {
                return Err(SelectionError::OutOfBounds { index: start, count });
            }
            if end > count {
                return Err(SelectionError::OutOfBounds { index: end, count });
            }
            indices.extend(start - 1..end);
        } else {
            let number: usize = token
                .parse()
                .map_err(|_| SelectionError::InvalidNumber(token.to_string()))?;
            if number == 0 || number > count {
                return Err(SelectionError::OutOfBounds { index: number, count });
            }
            indices.insert(number - 1);
        }
    }

    Ok(indices.into_iter().collect())
}

fn parse_range(token: &str) -> Result<(usize, usize), SelectionError> {
    let invalid = || SelectionError::InvalidRange(token.to_string());

    let mut bounds = token.split('-');
    let (Some(start), Some(end), None) = (bounds.next(), bounds.next(), bounds.next()) else {
        return Err(invalid());
    };

    let start: usize = start.trim().parse().map_err(|_| invalid())?;
    let end: usize = end.trim().parse().map_err(|_| invalid())?;

    if start > end {
        return Err(invalid());
    }
    Ok((start, end))
}

/// Map indices back to the candidates they name
pub fn pick<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices
        .iter()
        .filter_map(|&index| items.get(index).cloned())
        .collect()
}

/// Interactive number mode
///
/// A malformed selection is reported and asked for again; text that is not
/// selection syntax at all falls back to every candidate.
pub fn prompt(count: usize, operator: &mut dyn Operator) -> Result<Selection<usize>> {
    println!("\n{}", "Number selection options:".bold());
    println!("  [1-9]   - Select specific file by number");
    println!("  [1,3,5] - Select multiple files (comma-separated)");
    println!("  [1-5]   - Select range of files");
    println!("  [a]     - Select all files");
    println!("  [n]     - Select none (cancel)");
    println!("  [Enter] - Select all files");

    loop {
        let Some(line) = operator.read_line("\nEnter your choice: ")? else {
            return Ok(Selection::Cancelled);
        };
        let line = line.trim();

        match line.to_lowercase().as_str() {
            "" | "a" => return Ok(Selection::Confirmed((0..count).collect())),
            "n" => return Ok(Selection::Confirmed(Vec::new())),
            _ => {}
        }

        if !looks_like_selection(line) {
            report_fallback(line, count);
            return Ok(Selection::Confirmed((0..count).collect()));
        }

        match parse_selection(line, count) {
            Ok(indices) => return Ok(Selection::Confirmed(indices)),
            Err(e) => {
                println!("{} {}", "✗".red(), e);
                log::debug!("Rejected number selection '{line}': {e}");
            }
        }
    }
}
