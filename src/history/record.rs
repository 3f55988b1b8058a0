use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::apply::{count_by_kind, FileChange};

/// Immutable audit record of one synchronization attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncHistoryEntry {
    /// Unique identifier; assigned by the store when left empty
    #[serde(default)]
    pub id: String,

    /// Repository profile name
    pub repository: String,

    /// Branch of the source snapshot
    pub branch: String,

    /// When the attempt finished
    pub timestamp: DateTime<Utc>,

    /// Whether every selected change was applied
    pub success: bool,

    /// Failure description, when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Changes applied, in selection order (partial on failure)
    #[serde(default)]
    pub file_changes: Vec<FileChange>,

    /// Number of entries in `file_changes`
    pub total_files: usize,

    /// Files added to the target
    pub added_count: usize,

    /// Files re-copied over an existing target file
    pub modified_count: usize,

    /// Files removed from the target
    pub deleted_count: usize,

    /// Wall-clock duration in milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

impl SyncHistoryEntry {
    /// Record a successful attempt
    pub fn success(
        repository: impl Into<String>,
        branch: impl Into<String>,
        file_changes: Vec<FileChange>,
        duration_ms: u64,
    ) -> Self {
        Self::build(repository.into(), branch.into(), file_changes, duration_ms, None)
    }

    /// Record a failed attempt with whatever changes were applied before the failure
    pub fn failure(
        repository: impl Into<String>,
        branch: impl Into<String>,
        file_changes: Vec<FileChange>,
        duration_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self::build(
            repository.into(),
            branch.into(),
            file_changes,
            duration_ms,
            Some(error.into()),
        )
    }

    fn build(
        repository: String,
        branch: String,
        file_changes: Vec<FileChange>,
        duration_ms: u64,
        error: Option<String>,
    ) -> Self {
        let (added_count, modified_count, deleted_count) = count_by_kind(&file_changes);

        Self {
            id: String::new(),
            repository,
            branch,
            timestamp: Utc::now(),
            success: error.is_none(),
            error,
            total_files: file_changes.len(),
            file_changes,
            added_count,
            modified_count,
            deleted_count,
            duration_ms,
        }
    }

    /// One-line description for listings
    pub fn summary(&self) -> String {
        format!(
            "{} @ {} at {} ({}: {} files, +{} ~{} -{}, {}ms)",
            self.repository,
            self.branch,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            if self.success { "ok" } else { "failed" },
            self.total_files,
            self.added_count,
            self.modified_count,
            self.deleted_count,
            self.duration_ms
        )
    }
}
