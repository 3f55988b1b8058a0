use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stack_sync::filter::parse_pattern_list;
use stack_sync::handlers;
use stack_sync::logger;
use stack_sync::repository::{PostSyncCommand, RepositoryConfig};

#[derive(Parser)]
#[command(name = "stack-sync")]
#[command(about = "Selectively sync files from a source snapshot into a local directory", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a configured repository, or an ad-hoc source/target pair
    Sync {
        /// Repository name (prompted for when several are configured)
        repo: Option<String>,

        /// Pre-filter candidate files by keyword (case-insensitive)
        #[arg(short = 'f', long = "filter")]
        keyword: Option<String>,

        /// Select files by number without prompting, e.g. "1,3,5-7"
        #[arg(short = 'n', long = "numbers")]
        numbers: Option<String>,

        /// Preview added/modified/deleted files and toggle them before syncing
        #[arg(long)]
        diff: bool,

        /// Ad-hoc source directory (requires --target)
        #[arg(long, requires = "target", conflicts_with = "repo")]
        source: Option<PathBuf>,

        /// Ad-hoc target directory (requires --source)
        #[arg(long, requires = "source")]
        target: Option<PathBuf>,

        /// Include patterns for ad-hoc runs (comma-separated)
        #[arg(long, requires = "source")]
        include: Option<String>,

        /// Exclude patterns for ad-hoc runs (comma-separated)
        #[arg(long, requires = "source")]
        exclude: Option<String>,
    },

    /// Show sync history, most recent first
    History {
        /// Only show entries for this repository
        #[arg(short, long)]
        repo: Option<String>,

        /// Maximum number of entries (0 for all)
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Also list every file change
        #[arg(long)]
        files: bool,
    },

    /// Manage repository profiles
    Repos {
        #[command(subcommand)]
        action: ReposAction,
    },

    /// Write a starter config.toml
    Init {
        /// Overwrite an existing config without asking
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ReposAction {
    /// List configured repositories
    List,

    /// Add a repository profile
    Add {
        /// Unique profile name
        name: String,

        /// Source snapshot directory
        #[arg(long)]
        source: PathBuf,

        /// Target directory
        #[arg(long)]
        target: PathBuf,

        /// Branch of the source snapshot
        #[arg(short, long, default_value = "main")]
        branch: String,

        /// Include patterns (comma-separated)
        #[arg(long)]
        include: Option<String>,

        /// Exclude patterns (comma-separated)
        #[arg(long)]
        exclude: Option<String>,

        /// Command to run after each successful sync (repeatable, run in order)
        #[arg(long = "post-sync")]
        post_sync: Vec<String>,
    },

    /// Remove a repository profile
    Remove {
        /// Profile name
        name: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    if let Err(e) = logger::init_logger() {
        eprintln!("Warning: failed to initialize logging: {e:#}");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            repo,
            keyword,
            numbers,
            diff,
            source,
            target,
            include,
            exclude,
        } => {
            handlers::handle_sync(handlers::SyncArgs {
                repository: repo,
                keyword,
                numbers,
                diff,
                source,
                target,
                include: include.as_deref().map(parse_pattern_list).unwrap_or_default(),
                exclude: exclude.as_deref().map(parse_pattern_list).unwrap_or_default(),
            })?;
        }
        Commands::History { repo, limit, files } => {
            handlers::handle_history_list(repo.as_deref(), limit, files)?;
        }
        Commands::Repos { action } => match action {
            ReposAction::List => handlers::handle_repos_list()?,
            ReposAction::Add {
                name,
                source,
                target,
                branch,
                include,
                exclude,
                post_sync,
            } => {
                let mut repository = RepositoryConfig::new(name, source, target);
                repository.branch = branch;
                if let Some(include) = include.as_deref() {
                    repository.file_patterns = parse_pattern_list(include);
                }
                if let Some(exclude) = exclude.as_deref() {
                    repository.exclude_patterns = parse_pattern_list(exclude);
                }
                repository.post_sync_commands = post_sync
                    .into_iter()
                    .zip(1..)
                    .map(|(command, order)| PostSyncCommand {
                        directory: PathBuf::new(),
                        command,
                        order,
                    })
                    .collect();
                handlers::handle_repos_add(repository)?;
            }
            ReposAction::Remove { name, yes } => handlers::handle_repos_remove(&name, yes)?,
        },
        Commands::Init { force } => handlers::handle_init(force)?,
    }

    Ok(())
}
