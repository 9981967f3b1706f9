use std::fmt;

use serde::Serialize;

/// Counters for a single run over a music directory
///
/// Owned by the caller of the scan and handed to each file by `&mut`.
/// Only files are counted: directories are walked but never show up in
/// `skipped`, so the totals are lower than those of tools that count every
/// directory entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// Files for which a lyrics file was written
    pub fetched: u64,
    /// Files that were not processed
    pub skipped: u64,
    /// Files that failed
    pub errors: u64,
}

impl FetchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetched(&mut self) {
        self.fetched += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Number of files seen in total
    pub fn total(&self) -> u64 {
        self.fetched + self.skipped + self.errors
    }
}

impl fmt::Display for FetchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "successfully_fetched={} files_skipped={} errors={}",
            self.fetched, self.skipped, self.errors
        )
    }
}
