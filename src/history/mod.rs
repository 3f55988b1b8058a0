//! Synchronization history log.
//!
//! Every synchronization attempt, successful or failed, is recorded once as a
//! [`SyncHistoryEntry`]. The [`SyncHistoryStore`] keeps the most recent 1000
//! entries, most recent first, in a single JSON document that is rewritten
//! on every append.

mod record;
mod storage;

pub use record::SyncHistoryEntry;
pub use storage::{SyncHistoryStore, MAX_HISTORY_SIZE};
