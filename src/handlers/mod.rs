//! Command handler modules
//!
//! Each `stack-sync` subcommand has one handler here; `main.rs` only parses
//! arguments and dispatches.

pub mod history;
pub mod repos;
pub mod sync;

pub use history::handle_history_list;
pub use repos::{handle_init, handle_repos_add, handle_repos_list, handle_repos_remove};
pub use sync::{handle_sync, SyncArgs};
