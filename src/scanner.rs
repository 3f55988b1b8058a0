//! Tree Scanner: enumerate candidate files under a root.
//!
//! Traversal is depth-first with entries sorted by file name at every level,
//! so repeated scans of an unchanged tree number their files identically.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::filter::{PatternMatcher, PatternSet};

/// Version-control metadata directory pruned at the root of every tree
pub const VCS_METADATA_DIR: &str = ".git";

/// One entry produced by [`TreeWalker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Slash-normalized path relative to the walk root
    pub relative_path: String,
    /// Absolute (root-joined) path on disk
    pub path: PathBuf,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Depth below the root (direct children are 1)
    pub depth: usize,
}

/// Lazy depth-first walk over a directory tree
///
/// Yields every file and directory below the root (never the root itself).
/// After receiving a directory, the caller may call [`TreeWalker::skip_current_dir`]
/// to keep the walk from descending into it.
pub struct TreeWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl TreeWalker {
    /// Start a walk at `root`
    pub fn new(root: &Path) -> Self {
        let inner = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        TreeWalker {
            root: root.to_path_buf(),
            inner,
        }
    }

    /// Do not descend into the directory most recently yielded
    pub fn skip_current_dir(&mut self) {
        self.inner.skip_current_dir();
    }
}

impl Iterator for TreeWalker {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| self.root.display().to_string());
                return Some(Err(anyhow::Error::new(e).context(format!(
                    "Failed to read directory entry: {path}"
                ))));
            }
        };

        let relative_path = match entry.path().strip_prefix(&self.root) {
            Ok(rel) => to_relative_string(rel),
            Err(_) => {
                return Some(Err(anyhow::anyhow!(
                    "Entry {} escaped walk root {}",
                    entry.path().display(),
                    self.root.display()
                )))
            }
        };

        Some(Ok(TreeEntry {
            relative_path,
            path: entry.path().to_path_buf(),
            is_dir: entry.file_type().is_dir(),
            depth: entry.depth(),
        }))
    }
}

/// Join path components with `/` regardless of platform
pub fn to_relative_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scan `source_root` and return every file path allowed by `patterns`
///
/// - the root-level `.git` directory is never entered
/// - an excluded directory is pruned with everything below it
/// - directories are never returned, and a directory name never counts as an include match
pub fn scan(source_root: &Path, patterns: &PatternSet) -> Result<Vec<String>> {
    if !source_root.is_dir() {
        bail!("Source directory does not exist: {}", source_root.display());
    }

    let matcher = patterns.matcher();
    let files = collect_files(source_root, &matcher)?;

    log::debug!(
        "Scanned {}: {} matching files",
        source_root.display(),
        files.len()
    );

    Ok(files)
}

/// Walk `root` applying the matcher; shared by the scanner and the diff engine
pub(crate) fn collect_files(root: &Path, matcher: &PatternMatcher) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let mut walker = TreeWalker::new(root);

    while let Some(entry) = walker.next() {
        let entry =
            entry.with_context(|| format!("Failed to scan files in {}", root.display()))?;

        if entry.is_dir {
            let is_vcs_dir = entry.depth == 1 && entry.relative_path == VCS_METADATA_DIR;
            if is_vcs_dir || matcher.is_excluded(&entry.relative_path) {
                walker.skip_current_dir();
            }
            continue;
        }

        if matcher.allows(&entry.relative_path) {
            files.push(entry.relative_path);
        }
    }

    Ok(files)
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

    fn sample_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "a.txt", "0123456789");
        write(root, "b.log", "01234");
        write(root, "docs/guide.txt", "guide");
        write(root, "docs/img/logo.png", "png");
        write(root, "build/out.txt", "out");
        write(root, ".git/HEAD", "ref: refs/heads/main");
        write(root, ".git/notes.txt", "internal");
        temp
    }

    #[test]
    fn test_scan_applies_include_patterns() {
        let temp = sample_tree();
        let set = PatternSet::new(vec!["*.txt".to_string()], Vec::new());

        let files = scan(temp.path(), &set).unwrap();
        assert_eq!(files, vec!["a.txt", "build/out.txt", "docs/guide.txt"]);
    }

    #[test]
    fn test_scan_prunes_vcs_metadata() {
        let temp = sample_tree();
        let files = scan(temp.path(), &PatternSet::default()).unwrap();

        assert!(files.iter().all(|f| !f.starts_with(".git")));
        assert_eq!(files.len(), 5);
    }

    #[test]
    fn test_scan_prunes_excluded_directories() {
        let temp = sample_tree();
        let set = PatternSet::new(vec!["*".to_string()], vec!["build".to_string()]);

        let files = scan(temp.path(), &set).unwrap();
        assert!(!files.contains(&"build/out.txt".to_string()));
        assert!(files.contains(&"docs/guide.txt".to_string()));
    }

    #[test]
    fn test_directory_name_is_not_an_include_match() {
        let temp = sample_tree();
        let set = PatternSet::new(vec!["docs".to_string()], Vec::new());

        let files = scan(temp.path(), &set).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp = sample_tree();
        let set = PatternSet::default();

        let first = scan(temp.path(), &set).unwrap();
        let second = scan(temp.path(), &set).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scan_missing_root_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let err = scan(&missing, &PatternSet::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_walker_skip_current_dir() {
        let temp = sample_tree();
        let mut walker = TreeWalker::new(temp.path());
        let mut seen = Vec::new();

        while let Some(entry) = walker.next() {
            let entry = entry.unwrap();
            if entry.is_dir && entry.relative_path == "docs" {
                walker.skip_current_dir();
            }
            seen.push(entry.relative_path);
        }

        assert!(seen.contains(&"docs".to_string()));
        assert!(!seen.iter().any(|p| p.starts_with("docs/")));
    }
}
