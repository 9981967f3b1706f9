use std::path::Path;

use log::debug;
use lofty::{Accessor, AudioFile, FileType, Probe, TaggedFileExt};
use thiserror::Error;

use crate::data::track::{AudioFormat, TrackMetadata};
use crate::helpers::dsf;

/// Error types that can occur when reading tags and duration of an audio file
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no tags found")]
    NoTags,

    #[error("invalid DSF file: {0}")]
    InvalidDsf(String),

    #[error("failed to read tags: {0}")]
    Tag(#[from] lofty::error::LoftyError),

    #[error("failed to read ID3 tag: {0}")]
    Id3(#[from] id3::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies artist, album, title and duration of an audio file
pub trait MetadataSource {
    fn read(&self, path: &Path) -> Result<TrackMetadata, MetadataError>;
}

/// Metadata source backed by lofty, with a native reader for DSF files
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyMetadataSource;

impl LoftyMetadataSource {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataSource for LoftyMetadataSource {
    fn read(&self, path: &Path) -> Result<TrackMetadata, MetadataError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        if AudioFormat::from_extension(extension) == Some(AudioFormat::Dsf) {
            return dsf::read_dsf_file(path);
        }

        let probe = Probe::open(path)?.guess_file_type()?;
        let format = match probe.file_type() {
            Some(file_type) => audio_format(file_type)?,
            None => {
                return Err(MetadataError::UnsupportedFormat(format!(
                    "unknown content in .{} file",
                    extension
                )))
            }
        };

        let tagged_file = probe.read()?;
        let duration = tagged_file.properties().duration();
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .ok_or(MetadataError::NoTags)?;

        let metadata = TrackMetadata {
            artist: tag.artist().map(|s| s.to_string()).unwrap_or_default(),
            album: tag.album().map(|s| s.to_string()).unwrap_or_default(),
            title: tag.title().map(|s| s.to_string()).unwrap_or_default(),
            duration,
            format,
        };
        debug!("Read metadata from {}: {}", path.display(), metadata);
        Ok(metadata)
    }
}

/// Map a lofty file type to one of the formats lyrics are fetched for
fn audio_format(file_type: FileType) -> Result<AudioFormat, MetadataError> {
    match file_type {
        FileType::Mpeg => Ok(AudioFormat::Mp3),
        FileType::Aac => Ok(AudioFormat::Aac),
        FileType::Mp4 => Ok(AudioFormat::Mp4),
        FileType::Flac => Ok(AudioFormat::Flac),
        FileType::Vorbis => Ok(AudioFormat::Vorbis),
        other => Err(MetadataError::UnsupportedFormat(format!("{:?}", other))),
    }
}
