pub mod processor;
pub mod scanner;

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::info;

use crate::config::FetcherConfig;
use crate::data::stats::FetchStats;
use crate::helpers::audio_metadata::LoftyMetadataSource;
use crate::helpers::lrclib::LrclibClient;
use crate::helpers::lyrics::LyricsFetcher;

pub use processor::{FileProcessor, ProcessError, Processed};
pub use scanner::{sidecar_path, Candidate, LibraryScanner, ScanError};

/// Options of a single run that are not part of the config file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Cleared to stop the run after the current file
    pub running: Option<Arc<AtomicBool>>,
}

/// Fetch lyrics for every audio file below `root`, one file at a time
///
/// Per-file failures only show up in the returned counters. The error
/// case is reserved for a music directory that cannot be read.
pub fn fetch_library(
    config: &FetcherConfig,
    root: &Path,
    options: &RunOptions,
) -> Result<FetchStats, ScanError> {
    let client = LrclibClient::new(&config.endpoint, config.timeout_secs);
    let fetcher =
        LyricsFetcher::new(client).with_retries(config.max_attempts, config.retry_delay());
    let processor =
        FileProcessor::new(fetcher, LoftyMetadataSource::new()).with_dry_run(options.dry_run);

    let mut scanner = LibraryScanner::new(config);
    if let Some(running) = &options.running {
        scanner = scanner.with_running_flag(running.clone());
    }

    info!("Starting lyrics fetcher for {} using {}", root.display(), config.endpoint);

    let mut stats = FetchStats::new();
    scanner.scan(root, &mut stats, |path, sidecar, stats| {
        processor.process_file(path, sidecar, stats)
    })?;

    Ok(stats)
}
