//! Change Applier: execute a final selection against the target tree.
//!
//! Application stops at the first failing file. Files applied before the
//! failure are not rolled back; they travel inside [`ApplyError::applied`]
//! so the caller can record a partial history entry.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::diff::{ChangeKind, DiffEntry};
use crate::error::{ApplyError, ApplyOperation};

/// Record of one file actually copied or removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Slash-normalized relative path
    pub path: String,

    /// What happened to the file
    #[serde(rename = "change_type")]
    pub kind: ChangeKind,

    /// Bytes copied, or the target size immediately before removal
    pub size: u64,
}

impl FileChange {
    /// Create a new file change record
    pub fn new(path: impl Into<String>, kind: ChangeKind, size: u64) -> Self {
        FileChange {
            path: path.into(),
            kind,
            size,
        }
    }
}

/// Copy plain selected paths from source to target
///
/// A missing destination is recorded as added, an existing one as modified;
/// existing destinations are always re-copied.
pub fn apply_paths(
    source_root: &Path,
    target_root: &Path,
    selection: &[String],
) -> Result<Vec<FileChange>, ApplyError> {
    let mut changes = Vec::with_capacity(selection.len());

    for rel_path in selection {
        let destination = target_root.join(rel_path);
        let kind = match fs::symlink_metadata(&destination) {
            Ok(_) => ChangeKind::Modified,
            Err(e) if e.kind() == io::ErrorKind::NotFound => ChangeKind::Added,
            Err(e) => return Err(failure(rel_path, ApplyOperation::Stat, e, changes)),
        };

        match copy_into(source_root, target_root, rel_path) {
            Ok(size) => changes.push(FileChange::new(rel_path.clone(), kind, size)),
            Err((operation, e)) => return Err(failure(rel_path, operation, e, changes)),
        }
    }

    Ok(changes)
}

/// Apply diff entries: copy added/modified, remove deleted
pub fn apply_entries(
    source_root: &Path,
    target_root: &Path,
    selection: &[DiffEntry],
) -> Result<Vec<FileChange>, ApplyError> {
    let mut changes = Vec::with_capacity(selection.len());

    for entry in selection {
        let result = match entry.kind {
            ChangeKind::Deleted => remove_from(target_root, &entry.path),
            ChangeKind::Added | ChangeKind::Modified => {
                copy_into(source_root, target_root, &entry.path)
            }
        };

        match result {
            Ok(size) => changes.push(FileChange::new(entry.path.clone(), entry.kind, size)),
            Err((operation, e)) => return Err(failure(&entry.path, operation, e, changes)),
        }
    }

    Ok(changes)
}

fn failure(
    path: &str,
    operation: ApplyOperation,
    source: io::Error,
    applied: Vec<FileChange>,
) -> ApplyError {
    log::warn!(
        "Failed to {} {path} after {} change(s): {source}",
        operation.as_str(),
        applied.len()
    );
    ApplyError {
        path: path.to_string(),
        operation,
        source,
        applied,
    }
}

/// Copy one file, creating parent directories; returns the source size
fn copy_into(
    source_root: &Path,
    target_root: &Path,
    rel_path: &str,
) -> Result<u64, (ApplyOperation, io::Error)> {
    let source = source_root.join(rel_path);
    let destination = target_root.join(rel_path);

    let size = fs::metadata(&source)
        .map_err(|e| (ApplyOperation::Stat, e))?
        .len();

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| (ApplyOperation::CreateDir, e))?;
    }

    // fs::copy carries the permission bits over
    fs::copy(&source, &destination).map_err(|e| (ApplyOperation::Copy, e))?;

    log::debug!("Copied {rel_path} ({size} bytes)");
    Ok(size)
}

/// Remove one target file; an already-missing file counts as removed with size 0
fn remove_from(target_root: &Path, rel_path: &str) -> Result<u64, (ApplyOperation, io::Error)> {
    let destination = target_root.join(rel_path);

    let size = match fs::symlink_metadata(&destination) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{rel_path} already absent from target");
            return Ok(0);
        }
        Err(e) => return Err((ApplyOperation::Stat, e)),
    };

    match fs::remove_file(&destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err((ApplyOperation::Remove, e)),
    }

    log::debug!("Deleted {rel_path} ({size} bytes)");
    Ok(size)
}

/// Count changes by kind: (added, modified, deleted)
pub fn count_by_kind(changes: &[FileChange]) -> (usize, usize, usize) {
    changes
        .iter()
        .fold((0, 0, 0), |(added, modified, deleted), change| match change.kind {
            ChangeKind::Added => (added + 1, modified, deleted),
            ChangeKind::Modified => (added, modified + 1, deleted),
            ChangeKind::Deleted => (added, modified, deleted + 1),
        })
}
