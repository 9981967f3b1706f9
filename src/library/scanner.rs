use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::FetcherConfig;
use crate::data::stats::FetchStats;

/// Errors that stop a scan
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read music directory {path}: {source}")]
    Root {
        path: String,
        source: std::io::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(String),
}

/// What to do with a single directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Not an audio file with a supported extension
    Unsupported,
    /// A lyrics file exists already
    HasSidecar(PathBuf),
    /// Lyrics should be fetched and written to the given path
    Process(PathBuf),
}

/// Path of the lyrics file for an audio file: same name, other extension
pub fn sidecar_path(path: &Path, sidecar_extension: &str) -> PathBuf {
    path.with_extension(sidecar_extension)
}

/// Walks a music directory and hands every audio file without lyrics to a callback
pub struct LibraryScanner {
    config: FetcherConfig,
    running: Option<Arc<AtomicBool>>,
}

impl LibraryScanner {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            config: config.clone(),
            running: None,
        }
    }

    /// Stop between two files once the flag is cleared
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    /// Decide whether a file should be processed
    pub fn classify(&self, path: &Path) -> Candidate {
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.config.is_supported_extension(ext))
            .unwrap_or(false);
        if !supported {
            return Candidate::Unsupported;
        }

        let sidecar = sidecar_path(path, &self.config.sidecar_extension);
        if sidecar.exists() {
            Candidate::HasSidecar(sidecar)
        } else {
            Candidate::Process(sidecar)
        }
    }

    /// Walk `root` and call `process` with the audio path and its sidecar path
    ///
    /// Skipped files are counted here. Failures below the root are logged and
    /// counted as errors, only an unreadable root ends the scan with an error.
    pub fn scan<F>(
        &self,
        root: &Path,
        stats: &mut FetchStats,
        mut process: F,
    ) -> Result<(), ScanError>
    where
        F: FnMut(&Path, &Path, &mut FetchStats),
    {
        let metadata = fs::metadata(root).map_err(|source| ScanError::Root {
            path: root.display().to_string(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.display().to_string()));
        }

        // Sorted walks read a directory completely before yielding its
        // entries, sidecars written meanwhile are not visited
        for entry in WalkDir::new(root).sort_by_file_name() {
            if !self.is_running() {
                info!("Shutdown requested, stopping scan");
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let path = root.display().to_string();
                    return Err(ScanError::Root {
                        path,
                        source: e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("walk failed")),
                    });
                }
                Err(e) => {
                    error!("Failed to walk directory entry: {}", e);
                    stats.record_error();
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            match self.classify(path) {
                Candidate::Unsupported => {
                    debug!("Skipping non-audio file {}", path.display());
                    stats.record_skipped();
                }
                Candidate::HasSidecar(sidecar) => {
                    warn!(
                        "Lyrics file {} already exists, skipping retrieval for {}",
                        sidecar.display(),
                        path.display()
                    );
                    stats.record_skipped();
                }
                Candidate::Process(sidecar) => process(path, &sidecar, stats),
            }
        }

        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(true)
    }
}
