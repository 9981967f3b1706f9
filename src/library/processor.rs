use std::fs;
use std::path::Path;

use log::{debug, error, info};
use thiserror::Error;

use crate::data::stats::FetchStats;
use crate::helpers::audio_metadata::{MetadataError, MetadataSource};
use crate::helpers::lyrics::{LookupClient, LyricsError, LyricsFetcher};

/// Reasons a single file could not get a lyrics file
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to read song metadata: {0}")]
    Metadata(#[from] MetadataError),

    #[error("failed to retrieve lyrics: {0}")]
    Lyrics(#[from] LyricsError),

    #[error("failed to write lyrics file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

impl ProcessError {
    /// Short error category for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::Metadata(MetadataError::UnsupportedFormat(_)) => "unsupported_format",
            ProcessError::Metadata(_) => "metadata",
            ProcessError::Lyrics(LyricsError::NotFound(_)) => "not_found",
            ProcessError::Lyrics(LyricsError::Exhausted { .. }) => "exhausted",
            ProcessError::Lyrics(_) => "lyrics",
            ProcessError::Write { .. } => "write",
        }
    }
}

/// What happened to a file that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processed {
    /// The lyrics file was written, empty for instrumentals
    Written,
    /// Dry run, nothing was fetched or written
    DryRun,
}

/// Fetches lyrics for one audio file at a time and stores them in its sidecar
pub struct FileProcessor<C: LookupClient, M: MetadataSource> {
    fetcher: LyricsFetcher<C>,
    metadata: M,
    dry_run: bool,
}

impl<C: LookupClient, M: MetadataSource> FileProcessor<C, M> {
    pub fn new(fetcher: LyricsFetcher<C>, metadata: M) -> Self {
        Self {
            fetcher,
            metadata,
            dry_run: false,
        }
    }

    /// Only read metadata, never query the lookup service or write files
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn fetcher(&self) -> &LyricsFetcher<C> {
        &self.fetcher
    }

    /// Process one file and update the counters; failures are logged, never returned
    pub fn process_file(&self, path: &Path, sidecar: &Path, stats: &mut FetchStats) {
        match self.try_process(path, sidecar) {
            Ok(Processed::Written) => stats.record_fetched(),
            Ok(Processed::DryRun) => stats.record_skipped(),
            Err(e) => {
                error!("[{}] {} (file: {})", e.kind(), e, path.display());
                stats.record_error();
            }
        }
    }

    pub fn try_process(&self, path: &Path, sidecar: &Path) -> Result<Processed, ProcessError> {
        let track = self.metadata.read(path)?;
        debug!("Processing song {}: {}", path.display(), track);

        if self.dry_run {
            info!("Dry run: would fetch lyrics for {} into {}", track, sidecar.display());
            return Ok(Processed::DryRun);
        }

        let lyrics = self
            .fetcher
            .retrieve_lyrics(&track.artist, &track.album, &track.title, track.duration_secs())
            .into_sidecar_content()?;

        fs::write(sidecar, &lyrics).map_err(|source| ProcessError::Write {
            path: sidecar.display().to_string(),
            source,
        })?;

        debug!("Wrote lyrics for {} to {}", track, sidecar.display());
        Ok(Processed::Written)
    }
}
