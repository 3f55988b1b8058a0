//! Tree Diff Engine.
//!
//! Classifies every pattern-matching path between a source root and a target
//! root as added, modified or deleted. A path present on both sides is always
//! reported as modified: no content comparison is attempted, so a sync never
//! silently skips a changed file.

mod render;

pub use render::{render_entry_diff, render_text_diff};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::filter::PatternSet;
use crate::scanner::{self, collect_files};

/// Classification of one path between source and target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present in source, absent in target
    Added,
    /// Present on both sides
    Modified,
    /// Present in target, absent in source
    Deleted,
}

impl ChangeKind {
    /// Returns a human-readable string representation
    pub fn as_str(&self) -> &str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        }
    }

    /// Single-letter status marker (`A`, `M`, `D`)
    pub fn marker(&self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Modified => 'M',
            ChangeKind::Deleted => 'D',
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One path's classified delta between source and target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiffEntry {
    /// Slash-normalized relative path
    pub path: String,
    /// How the path differs
    pub kind: ChangeKind,
}

impl DiffEntry {
    /// Create a new diff entry
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        DiffEntry {
            path: path.into(),
            kind,
        }
    }
}

/// Compare `source_root` against `target_root` restricted to `patterns`
///
/// Entries come in source scan order followed by target-only paths in target
/// scan order. A missing target root is treated as empty. An empty result
/// means the target is already in sync.
pub fn diff(source_root: &Path, target_root: &Path, patterns: &PatternSet) -> Result<Vec<DiffEntry>> {
    let matcher = patterns.matcher();

    let source_files = scanner::scan(source_root, patterns)?;
    let target_files = if target_root.is_dir() {
        collect_files(target_root, &matcher)?
    } else {
        log::debug!(
            "Target {} does not exist yet; treating as empty",
            target_root.display()
        );
        Vec::new()
    };

    let entries = dedup_by_path(classify(&source_files, &target_files));

    log::debug!(
        "Diff {} -> {}: {} entries",
        source_root.display(),
        target_root.display(),
        entries.len()
    );

    Ok(entries)
}

/// Report each path once per root it appears under
fn classify(source_files: &[String], target_files: &[String]) -> Vec<DiffEntry> {
    let source_set: HashSet<&str> = source_files.iter().map(String::as_str).collect();
    let target_set: HashSet<&str> = target_files.iter().map(String::as_str).collect();

    let from_source = source_files.iter().map(|path| {
        let kind = if target_set.contains(path.as_str()) {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        DiffEntry::new(path.clone(), kind)
    });

    let from_target = target_files.iter().map(|path| {
        let kind = if source_set.contains(path.as_str()) {
            ChangeKind::Modified
        } else {
            ChangeKind::Deleted
        };
        DiffEntry::new(path.clone(), kind)
    });

    from_source.chain(from_target).collect()
}

/// Keep only the first occurrence of every path
pub fn dedup_by_path(entries: Vec<DiffEntry>) -> Vec<DiffEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.path.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_diff_classifies_all_three_kinds() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(source.path(), "new.proto", "new");
        write(source.path(), "shared.proto", "v2");
        write(target.path(), "shared.proto", "v1");
        write(target.path(), "old.proto", "old");

        let entries = diff(source.path(), target.path(), &PatternSet::default()).unwrap();

        assert_eq!(
            entries,
            vec![
                DiffEntry::new("new.proto", ChangeKind::Added),
                DiffEntry::new("shared.proto", ChangeKind::Modified),
                DiffEntry::new("old.proto", ChangeKind::Deleted),
            ]
        );
    }

    #[test]
    fn test_identical_files_are_still_modified() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(source.path(), "same.txt", "identical");
        write(target.path(), "same.txt", "identical");

        let entries = diff(source.path(), target.path(), &PatternSet::default()).unwrap();
        assert_eq!(entries, vec![DiffEntry::new("same.txt", ChangeKind::Modified)]);
    }

    #[test]
    fn test_diff_respects_patterns_on_both_sides() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(source.path(), "a.txt", "0123456789");
        write(source.path(), "b.log", "01234");
        write(target.path(), "stale.log", "x");
        write(target.path(), "local-only.txt", "x");

        let set = PatternSet::new(vec!["*.txt".to_string()], Vec::new());
        let entries = diff(source.path(), target.path(), &set).unwrap();

        assert_eq!(
            entries,
            vec![
                DiffEntry::new("a.txt", ChangeKind::Added),
                DiffEntry::new("local-only.txt", ChangeKind::Deleted),
            ]
        );
        assert!(entries.iter().all(|e| set.allows(&e.path)));
    }

    #[test]
    fn test_diff_never_repeats_a_path() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        for name in ["a", "b", "c", "d"] {
            write(source.path(), &format!("{name}.txt"), name);
            write(target.path(), &format!("{name}.txt"), name);
        }
        write(target.path(), "nested/e.txt", "e");

        let entries = diff(source.path(), target.path(), &PatternSet::default()).unwrap();
        let unique: HashSet<_> = entries.iter().map(|e| e.path.clone()).collect();
        assert_eq!(unique.len(), entries.len());
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn test_missing_target_means_everything_added() {
        let source = TempDir::new().unwrap();
        write(source.path(), "x/y.txt", "y");
        let missing = source.path().join("does-not-exist");

        let entries = diff(source.path(), &missing, &PatternSet::default()).unwrap();
        assert_eq!(entries, vec![DiffEntry::new("x/y.txt", ChangeKind::Added)]);
    }

    #[test]
    fn test_empty_diff_when_both_trees_empty() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        let entries = diff(source.path(), target.path(), &PatternSet::default()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let entries = vec![
            DiffEntry::new("a", ChangeKind::Added),
            DiffEntry::new("a", ChangeKind::Deleted),
            DiffEntry::new("b", ChangeKind::Modified),
        ];

        assert_eq!(
            dedup_by_path(entries),
            vec![
                DiffEntry::new("a", ChangeKind::Added),
                DiffEntry::new("b", ChangeKind::Modified),
            ]
        );
    }

    #[test]
    fn test_change_kind_serde_and_marker() {
        assert_eq!(serde_json::to_string(&ChangeKind::Deleted).unwrap(), r#""deleted""#);
        let kind: ChangeKind = serde_json::from_str(r#""added""#).unwrap();
        assert_eq!(kind, ChangeKind::Added);
        assert_eq!(ChangeKind::Modified.marker(), 'M');
        assert_eq!(ChangeKind::Added.to_string(), "added");
    }
}
