//! Typed errors raised by the selection and application stages.
//!
//! Orchestration code wraps these in `anyhow::Error` with extra context; the
//! variants stay matchable for callers that need to tell a bad selection
//! apart from a filesystem failure.

use std::io;

use crate::apply::FileChange;

/// Why a number/range selection string was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Input contained something other than digits, commas, hyphens and spaces
    #[error("invalid character '{0}': expected numbers, commas, ranges like 1-5")]
    InvalidCharacter(char),

    /// A comma-separated token was empty or not a number
    #[error("invalid number '{0}': expected a file number such as 3")]
    InvalidNumber(String),

    /// A `start-end` token was malformed or reversed
    #[error("invalid range '{0}': expected a range such as 1-5")]
    InvalidRange(String),

    /// An index fell outside `1..=count`
    #[error("number {index} out of bounds (1-{count})")]
    OutOfBounds {
        /// The offending 1-based index
        index: usize,
        /// Number of candidates available
        count: usize,
    },

    /// There were no candidates to select from
    #[error("nothing to select from")]
    Empty,
}

/// Filesystem operation that failed while applying a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOperation {
    /// Reading metadata of the source or target file
    Stat,
    /// Creating the destination directory
    CreateDir,
    /// Copying source to destination, permission bits included
    Copy,
    /// Removing the target-side file
    Remove,
}

impl ApplyOperation {
    /// Returns a human-readable string representation
    pub fn as_str(&self) -> &str {
        match self {
            ApplyOperation::Stat => "stat",
            ApplyOperation::CreateDir => "create directory for",
            ApplyOperation::Copy => "copy",
            ApplyOperation::Remove => "delete",
        }
    }
}

/// A single file failed to apply; everything before it stays applied
#[derive(Debug, thiserror::Error)]
#[error("failed to {} {path}: {source} ({} change(s) applied before failure)", .operation.as_str(), .applied.len())]
pub struct ApplyError {
    /// Relative path of the file that failed
    pub path: String,
    /// What was being attempted
    pub operation: ApplyOperation,
    /// Underlying I/O cause
    #[source]
    pub source: io::Error,
    /// Changes successfully applied before the failure, in selection order
    pub applied: Vec<FileChange>,
}

impl ApplyError {
    /// Number of changes applied before the failure
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}
