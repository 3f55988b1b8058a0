use anyhow::{Context, Result};
use similar::TextDiff;
use std::fs;
use std::path::Path;

use super::{ChangeKind, DiffEntry};

/// Lines of unchanged context around each hunk
const DIFF_CONTEXT_LINES: usize = 3;

/// Label used for the missing side of an added or deleted file
const EMPTY_SIDE: &str = "/dev/null";

/// Render a unified diff of one entry against the opposing root
///
/// Added files are compared against an empty file, deleted files likewise,
/// modified files directly target-to-source.
pub fn render_entry_diff(entry: &DiffEntry, source_root: &Path, target_root: &Path) -> Result<String> {
    let source_path = source_root.join(&entry.path);
    let target_path = target_root.join(&entry.path);

    let old_label = format!("a/{}", entry.path);
    let new_label = format!("b/{}", entry.path);

    let (old, new, old_label, new_label) = match entry.kind {
        ChangeKind::Added => (
            Vec::new(),
            read_side(&source_path)?,
            EMPTY_SIDE.to_string(),
            new_label,
        ),
        ChangeKind::Deleted => (
            read_side(&target_path)?,
            Vec::new(),
            old_label,
            EMPTY_SIDE.to_string(),
        ),
        ChangeKind::Modified => (
            read_side(&target_path)?,
            read_side(&source_path)?,
            old_label,
            new_label,
        ),
    };

    match (std::str::from_utf8(&old), std::str::from_utf8(&new)) {
        (Ok(old_text), Ok(new_text)) => {
            Ok(render_text_diff(old_text, new_text, &old_label, &new_label))
        }
        _ => Ok(format!("Binary files {old_label} and {new_label} differ\n")),
    }
}

/// Unified diff of two texts; empty when they are identical
pub fn render_text_diff(old: &str, new: &str, old_label: &str, new_label: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    diff.unified_diff()
        .context_radius(DIFF_CONTEXT_LINES)
        .header(old_label, new_label)
        .to_string()
}

fn read_side(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read file for diff: {}", path.display()))
}
