/// Data structures shared by the lyrics fetcher
pub mod data;

/// HTTP, LRCLIB, retry and audio metadata helpers
pub mod helpers;

/// Directory scanning and per-file processing
pub mod library;

/// Configuration file handling
pub mod config;

/// Logger setup
pub mod logging;

pub use config::FetcherConfig;
pub use data::{AudioFormat, FetchStats, TrackMetadata};
pub use helpers::lyrics::{LyricsError, LyricsFetcher, RetrievalOutcome};
pub use library::fetch_library;
