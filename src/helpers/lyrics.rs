//! Lyrics retrieval with bounded retries on top of a lookup client

use std::time::Duration;

use log::{debug, error, warn};
use thiserror::Error;

use crate::helpers::http_client::HttpClientError;
use crate::helpers::lrclib::{LookupQuery, LookupResult};
use crate::helpers::retry::{thread_sleeper, RetryHandler, Sleeper};

/// Default number of lookup attempts per track
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Default delay between two lookup attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Error type for lyrics operations
#[derive(Debug, Error)]
pub enum LyricsError {
    /// The lookup service could not be reached or sent an unreadable reply
    #[error("transport error: {0}")]
    Transport(#[from] HttpClientError),

    /// The catalog has no entry for the track
    #[error("{0}")]
    NotFound(String),

    /// Non-success status other than 404
    #[error("lookup service returned HTTP {0}")]
    Upstream(u16),

    /// Successful reply without synced lyrics for a non-instrumental track
    #[error("lookup response carried no synced lyrics")]
    MissingSyncedLyrics,

    #[error("failed to retrieve lyrics from LRCLIB after {attempts} attempts: {last}")]
    Exhausted {
        attempts: usize,
        last: Box<LyricsError>,
    },
}

/// Result of retrieving lyrics for one track
#[derive(Debug)]
pub enum RetrievalOutcome {
    /// Synced lyrics were found
    Found(String),
    /// The track has no vocals, an empty sidecar should be written
    Instrumental,
    /// The lookup service has no entry for the track
    NotFound(String),
    /// Every attempt failed; carries the error of the last one
    Exhausted {
        attempts: usize,
        last_error: LyricsError,
    },
}

impl RetrievalOutcome {
    /// Content to store in the sidecar file, or the reason there is none
    pub fn into_sidecar_content(self) -> Result<String, LyricsError> {
        match self {
            RetrievalOutcome::Found(lyrics) => Ok(lyrics),
            RetrievalOutcome::Instrumental => Ok(String::new()),
            RetrievalOutcome::NotFound(reason) => Err(LyricsError::NotFound(reason)),
            RetrievalOutcome::Exhausted { attempts, last_error } => Err(LyricsError::Exhausted {
                attempts,
                last: Box::new(last_error),
            }),
        }
    }
}

/// A single round-trip to a lyrics lookup service
///
/// Implementations report every received response as `Ok` together with its
/// HTTP status, and use `Err` only when no usable response arrived.
pub trait LookupClient: Send + Sync {
    fn lookup(&self, query: &LookupQuery) -> Result<(LookupResult, u16), LyricsError>;
}

/// Retrieves lyrics for a track, retrying transient failures
///
/// A 404 ends the retrieval immediately. Transport errors, other error
/// statuses and replies without synced lyrics are retried until the attempt
/// budget is used up. Nothing is kept between two retrievals.
pub struct LyricsFetcher<C: LookupClient> {
    client: C,
    max_attempts: usize,
    retry_delay: Duration,
    sleeper: Sleeper,
}

impl<C: LookupClient> LyricsFetcher<C> {
    /// Create a fetcher with the default retry policy (3 attempts, 1 second apart)
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            sleeper: thread_sleeper(),
        }
    }

    pub fn with_retries(mut self, max_attempts: usize, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay = retry_delay;
        self
    }

    /// Replace the function used to wait between attempts
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Retrieve synced lyrics for a track
    pub fn retrieve_lyrics(
        &self,
        artist: &str,
        album: &str,
        track: &str,
        duration_secs: f64,
    ) -> RetrievalOutcome {
        let query = LookupQuery::new(track, artist, album, duration_secs);
        self.retrieve(&query)
    }

    /// Run the retry loop for a prepared query
    pub fn retrieve(&self, query: &LookupQuery) -> RetrievalOutcome {
        let mut retry = RetryHandler::new(self.max_attempts, self.retry_delay)
            .with_sleeper(self.sleeper.clone());
        let mut last_error = None;

        loop {
            let attempt = retry.attempt() + 1;

            match self.client.lookup(query) {
                Err(e) => {
                    error!(
                        "Failed to retrieve lyrics from LRCLIB API (attempt {}/{}): {}",
                        attempt,
                        retry.max_attempts(),
                        e
                    );
                    last_error = Some(e);
                }
                Ok((_, 404)) => {
                    let reason = format!(
                        "no lyrics found for song '{} - {} ({})'",
                        query.artist_name(),
                        query.track_name(),
                        query.album_name()
                    );
                    debug!("{}", reason);
                    return RetrievalOutcome::NotFound(reason);
                }
                Ok((_, status)) if !(200..300).contains(&status) => {
                    let e = LyricsError::Upstream(status);
                    error!(
                        "Failed to retrieve lyrics from LRCLIB API (attempt {}/{}): {}",
                        attempt,
                        retry.max_attempts(),
                        e
                    );
                    last_error = Some(e);
                }
                Ok((result, _)) => {
                    if result.instrumental {
                        warn!(
                            "Song '{} - {} ({})' is an instrumental, writing empty lyrics file",
                            query.artist_name(),
                            query.track_name(),
                            query.album_name()
                        );
                        return RetrievalOutcome::Instrumental;
                    }
                    if !result.synced_lyrics.is_empty() {
                        debug!(
                            "Found synced lyrics for '{} - {}' on attempt {}",
                            query.artist_name(),
                            query.track_name(),
                            attempt
                        );
                        return RetrievalOutcome::Found(result.synced_lyrics);
                    }
                    debug!(
                        "Response for '{} - {}' has no synced lyrics",
                        query.artist_name(),
                        query.track_name()
                    );
                    last_error = Some(LyricsError::MissingSyncedLyrics);
                }
            }

            if !retry.should_retry() {
                break;
            }
            debug!(
                "Retrying in {:?} (retry {} of {})",
                retry.get_delay(),
                attempt,
                retry.max_attempts() - 1
            );
            retry.wait();
        }

        RetrievalOutcome::Exhausted {
            attempts: retry.max_attempts(),
            last_error: last_error.unwrap_or(LyricsError::MissingSyncedLyrics),
        }
    }
}
