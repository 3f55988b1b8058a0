use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::SyncHistoryEntry;
use crate::config::ConfigManager;

/// Maximum number of history entries retained on disk
pub const MAX_HISTORY_SIZE: usize = 1000;

/// Persistent, capped history of synchronization attempts
///
/// Entries are kept most recent first. The whole document is rewritten after
/// every append.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncHistoryStore {
    /// Recorded attempts, most recent first
    #[serde(default)]
    pub histories: Vec<SyncHistoryEntry>,

    /// File this store was loaded from and saves back to
    #[serde(skip)]
    location: Option<PathBuf>,
}

impl SyncHistoryStore {
    fn history_file_path() -> Result<PathBuf> {
        ConfigManager::history_path()
    }

    /// Load history from the configured location or a specific path
    ///
    /// A missing file yields an empty store bound to that path.
    pub fn from_path(path: Option<PathBuf>) -> Result<Self> {
        let file_path = match path {
            Some(p) => p,
            None => Self::history_file_path()?,
        };

        if !file_path.exists() {
            log::debug!(
                "No history file at {}; starting empty",
                file_path.display()
            );
            return Ok(Self {
                histories: Vec::new(),
                location: Some(file_path),
            });
        }

        let content = fs::read_to_string(&file_path).with_context(|| {
            format!(
                "Failed to read sync history file from: {}",
                file_path.display()
            )
        })?;

        let mut store: SyncHistoryStore = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse sync history JSON from: {}",
                file_path.display()
            )
        })?;
        store.location = Some(file_path);

        Ok(store)
    }

    /// Load history from the default location
    pub fn load() -> Result<Self> {
        Self::from_path(None)
    }

    /// Save history to a specific path, or the default location
    pub fn save_to(&self, path: Option<PathBuf>) -> Result<()> {
        let file_path = match path {
            Some(p) => p,
            None => Self::history_file_path()?,
        };

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create history directory: {}", parent.display())
            })?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize sync history")?;

        fs::write(&file_path, content).with_context(|| {
            format!(
                "Failed to write sync history file to: {}",
                file_path.display()
            )
        })?;

        Ok(())
    }

    /// Save history back to where it was loaded from
    pub fn save(&self) -> Result<()> {
        self.save_to(self.location.clone())
    }

    /// Record an attempt and persist the store
    ///
    /// Assigns a fresh identifier when the entry has none, places it first
    /// and drops the oldest entries beyond [`MAX_HISTORY_SIZE`]. Returns the
    /// identifier of the stored entry.
    pub fn append(&mut self, mut entry: SyncHistoryEntry) -> Result<String> {
        if entry.id.is_empty() {
            entry.id = uuid::Uuid::new_v4().to_string();
        }
        let id = entry.id.clone();

        self.histories.insert(0, entry);
        if self.histories.len() > MAX_HISTORY_SIZE {
            self.histories.truncate(MAX_HISTORY_SIZE);
        }

        self.save()?;
        log::debug!("Recorded sync history entry {id}");
        Ok(id)
    }

    /// Most recent entries, optionally restricted to one repository
    ///
    /// A `limit` of zero returns every match.
    pub fn query(&self, repository: Option<&str>, limit: usize) -> Vec<&SyncHistoryEntry> {
        let matching = self
            .histories
            .iter()
            .filter(|entry| repository.map_or(true, |name| entry.repository == name));

        if limit == 0 {
            matching.collect()
        } else {
            matching.take(limit).collect()
        }
    }

    /// Entries for one repository, most recent first
    pub fn for_repository(&self, repository: &str, limit: usize) -> Vec<&SyncHistoryEntry> {
        self.query(Some(repository), limit)
    }

    /// Entries across all repositories, most recent first
    pub fn all(&self, limit: usize) -> Vec<&SyncHistoryEntry> {
        self.query(None, limit)
    }

    /// Get the number of recorded attempts
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}
