use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Audio container formats lyrics can be fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Aac,
    Mp4,
    Flac,
    Vorbis,
    /// DSD stream file (.dsf / .dsd)
    Dsf,
}

impl AudioFormat {
    /// Map a file extension (without the dot, any case) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "aac" => Some(AudioFormat::Aac),
            "mp4" | "m4a" => Some(AudioFormat::Mp4),
            "flac" => Some(AudioFormat::Flac),
            "ogg" => Some(AudioFormat::Vorbis),
            "dsf" | "dsd" => Some(AudioFormat::Dsf),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "aac",
            AudioFormat::Mp4 => "mp4",
            AudioFormat::Flac => "flac",
            AudioFormat::Vorbis => "vorbis",
            AudioFormat::Dsf => "dsf",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tags and length of a single audio file
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub duration: Duration,
    pub format: AudioFormat,
}

impl TrackMetadata {
    /// Duration in seconds as a float
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

impl fmt::Display for TrackMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}) [{:.0}s, {}]",
            self.artist,
            self.title,
            self.album,
            self.duration_secs(),
            self.format
        )
    }
}
