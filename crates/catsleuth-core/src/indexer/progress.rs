/// Index progress reporting — lightweight messages sent from the walk to
/// whoever is watching it, via a crossbeam channel.
use std::time::Duration;

/// Progress updates emitted while a storage is being indexed.
///
/// The catalog itself is owned by the caller; these messages carry only
/// counters and per-entry failures.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexProgress {
    /// Periodic update with running totals.
    Update {
        files_found: u64,
        dirs_found: u64,
        current_path: String,
    },
    /// A non-fatal failure. The entry was skipped and the walk went on.
    Error { path: String, message: String },
    /// Indexing finished and the storage has been aggregated.
    Complete { duration: Duration, error_count: u64 },
}
