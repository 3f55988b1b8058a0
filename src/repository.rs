use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::{PatternSet, MATCH_ALL};

fn default_branch() -> String {
    "main".to_string()
}

fn default_file_patterns() -> Vec<String> {
    vec![MATCH_ALL.to_string()]
}

/// A shell command run after a successful sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSyncCommand {
    /// Working directory; relative paths resolve against the target directory
    #[serde(default)]
    pub directory: PathBuf,

    /// Command line handed to the platform shell
    pub command: String,

    /// Commands run in ascending order
    #[serde(default)]
    pub order: i32,
}

/// One repository profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Unique profile name, recorded in history
    pub name: String,

    /// Branch the source snapshot was checked out from
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Materialised source snapshot
    pub source_dir: PathBuf,

    /// Local directory kept in sync
    pub target_dir: PathBuf,

    /// Include globs
    #[serde(default = "default_file_patterns")]
    pub file_patterns: Vec<String>,

    /// Exclude globs
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    #[serde(default)]
    pub post_sync_commands: Vec<PostSyncCommand>,
}

impl RepositoryConfig {
    /// Profile with default branch and patterns
    pub fn new(
        name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
    ) -> Self {
        RepositoryConfig {
            name: name.into(),
            branch: default_branch(),
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            file_patterns: default_file_patterns(),
            exclude_patterns: Vec::new(),
            post_sync_commands: Vec::new(),
        }
    }

    /// The include/exclude rules of this profile
    pub fn patterns(&self) -> PatternSet {
        PatternSet::new(self.file_patterns.clone(), self.exclude_patterns.clone())
    }

    /// Post-sync commands sorted by `order`, ties keeping file order
    pub fn ordered_post_sync_commands(&self) -> Vec<&PostSyncCommand> {
        let mut commands: Vec<&PostSyncCommand> = self.post_sync_commands.iter().collect();
        commands.sort_by_key(|c| c.order);
        commands
    }
}

/// All repository profiles (config.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

impl SyncConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&crate::config::ConfigManager::repositories_config_path()?)
    }

    /// Load configuration from a specific file; a missing file is an empty config
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: SyncConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&crate::config::ConfigManager::repositories_config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Look up a profile by name
    pub fn get_repository(&self, name: &str) -> Option<&RepositoryConfig> {
        self.repositories.iter().find(|r| r.name == name)
    }

    /// Add a profile; names must be unique
    pub fn add_repository(&mut self, repository: RepositoryConfig) -> Result<()> {
        if self.get_repository(&repository.name).is_some() {
            bail!("Repository '{}' already exists", repository.name);
        }
        self.repositories.push(repository);
        Ok(())
    }

    /// Remove a profile by name, returning it
    pub fn remove_repository(&mut self, name: &str) -> Result<RepositoryConfig> {
        let Some(position) = self.repositories.iter().position(|r| r.name == name) else {
            bail!("Repository '{}' not found", name);
        };
        Ok(self.repositories.remove(position))
    }

    /// Profile names in file order
    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }

    /// Starter config written by `init`
    pub fn example() -> Self {
        let mut repository = RepositoryConfig::new(
            "protos",
            "/path/to/checkout/protos",
            "/path/to/project/protos",
        );
        repository.file_patterns = vec!["*.proto".to_string()];
        repository.exclude_patterns = vec!["internal/*".to_string()];
        repository.post_sync_commands = vec![PostSyncCommand {
            directory: PathBuf::from("."),
            command: "echo synced".to_string(),
            order: 1,
        }];

        SyncConfig {
            repositories: vec![repository],
        }
    }
}
