//! Client for the LRCLIB lyrics lookup API
//!
//! See <https://lrclib.net/docs> for the API description. Only the exact
//! signature lookup (`/api/get`) is used.

use log::debug;
use serde::{Deserialize, Deserializer};

use crate::helpers::http_client::{new_http_client, HttpClient, HttpClientError};
use crate::helpers::lyrics::{LookupClient, LyricsError};

/// Default LRCLIB lookup endpoint
pub const LRCLIB_ENDPOINT: &str = "https://lrclib.net/api/get";

/// Default request timeout in seconds
pub const LRCLIB_TIMEOUT_SECS: u64 = 30;

/// Track signature sent to the lookup endpoint
///
/// Built once per file and reused unchanged by every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    track_name: String,
    artist_name: String,
    album_name: String,
    duration_secs: u64,
}

impl LookupQuery {
    /// Create a query, rounding the duration to the nearest whole second
    pub fn new(track_name: &str, artist_name: &str, album_name: &str, duration_secs: f64) -> Self {
        Self {
            track_name: track_name.to_string(),
            artist_name: artist_name.to_string(),
            album_name: album_name.to_string(),
            duration_secs: round_seconds(duration_secs),
        }
    }

    pub fn track_name(&self) -> &str {
        &self.track_name
    }

    pub fn artist_name(&self) -> &str {
        &self.artist_name
    }

    pub fn album_name(&self) -> &str {
        &self.album_name
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Duration parameter as sent on the wire: integer seconds, no decimals
    pub fn duration_param(&self) -> String {
        self.duration_secs.to_string()
    }

    /// Build the full request URL for the given endpoint
    pub fn to_url(&self, endpoint: &str) -> String {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}track_name={}&artist_name={}&album_name={}&duration={}",
            endpoint,
            separator,
            urlencoding::encode(&self.track_name),
            urlencoding::encode(&self.artist_name),
            urlencoding::encode(&self.album_name),
            self.duration_param()
        )
    }
}

fn round_seconds(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        secs.round() as u64
    } else {
        0
    }
}

/// Lyrics record returned by the lookup endpoint
///
/// Absent fields and JSON `null` both map to the empty value. An empty
/// `synced_lyrics` only means there are no timed lyrics, an instrumental
/// track is flagged by `instrumental`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupResult {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub track_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub artist_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub album_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub duration: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub instrumental: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub plain_lyrics: String,
    #[serde(deserialize_with = "null_as_default")]
    pub synced_lyrics: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// LRCLIB lookup client
///
/// Every call issues exactly one GET request. The only state is the HTTP
/// client, whose connection pool is shared by all calls.
#[derive(Debug, Clone)]
pub struct LrclibClient {
    endpoint: String,
    client: Box<dyn HttpClient>,
}

impl LrclibClient {
    /// Create a client for `endpoint` using a pooled ureq agent
    pub fn new(endpoint: &str, timeout_secs: u64) -> Self {
        Self::with_client(endpoint, new_http_client(timeout_secs))
    }

    /// Create a client that sends its requests through `client`
    pub fn with_client(endpoint: &str, client: Box<dyn HttpClient>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for LrclibClient {
    fn default() -> Self {
        Self::new(LRCLIB_ENDPOINT, LRCLIB_TIMEOUT_SECS)
    }
}

impl LookupClient for LrclibClient {
    fn lookup(&self, query: &LookupQuery) -> Result<(LookupResult, u16), LyricsError> {
        let url = query.to_url(&self.endpoint);
        let response = self.client.get(&url)?;

        if response.is_success() {
            let result = serde_json::from_str::<LookupResult>(&response.body).map_err(|e| {
                HttpClientError::ParseError(format!("invalid LRCLIB response: {}", e))
            })?;
            return Ok((result, response.status));
        }

        // Error bodies are informational only, the status code decides
        let result = serde_json::from_str::<LookupResult>(&response.body).unwrap_or_else(|e| {
            debug!("Ignoring unparseable body of HTTP {} response: {}", response.status, e);
            LookupResult::default()
        });
        Ok((result, response.status))
    }
}
