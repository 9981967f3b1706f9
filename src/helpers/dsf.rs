//! Reader for DSD stream files (.dsf)
//!
//! lofty does not handle DSF, so the header is decoded here. A DSF file
//! starts with a 28 byte `DSD ` chunk followed by a 52 byte `fmt ` chunk,
//! all little-endian. Tags live in an ID3v2 block at the offset stored in
//! the `DSD ` chunk and are read with the `id3` crate.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use id3::{ErrorKind, Tag, TagLike};
use log::debug;

use crate::data::track::{AudioFormat, TrackMetadata};
use crate::helpers::audio_metadata::MetadataError;

const HEADER_LEN: usize = 80;

/// Fields of the DSF header needed to compute the track length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DsfHeader {
    pub sample_rate: u32,
    /// Samples per channel
    pub sample_count: u64,
    /// Offset of the ID3v2 block, 0 if there is none
    pub metadata_offset: u64,
}

impl DsfHeader {
    pub fn duration(&self) -> Result<Duration, MetadataError> {
        Duration::try_from_secs_f64(self.sample_count as f64 / self.sample_rate as f64)
            .map_err(|_| MetadataError::InvalidDsf("implausible sample count/rate".to_string()))
    }
}

/// Read tags and duration of a DSF file
pub fn read_dsf_file(path: &Path) -> Result<TrackMetadata, MetadataError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_dsf(&mut reader)
}

pub fn read_dsf<R: Read + Seek>(reader: &mut R) -> Result<TrackMetadata, MetadataError> {
    let mut header = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header)
        .map_err(|_| MetadataError::InvalidDsf("file too short".to_string()))?;
    let header = parse_header(&header)?;
    let duration = header.duration()?;

    if header.metadata_offset == 0 {
        return Err(MetadataError::NoTags);
    }

    reader.seek(SeekFrom::Start(header.metadata_offset))?;
    let mut block = Vec::new();
    reader.read_to_end(&mut block)?;
    if !block.starts_with(b"ID3") {
        return Err(MetadataError::NoTags);
    }

    let tag = match Tag::read_from2(Cursor::new(block)) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => return Err(MetadataError::NoTags),
        Err(e) => return Err(e.into()),
    };
    debug!(
        "DSF: {} Hz, {} samples, {:?} tag",
        header.sample_rate,
        header.sample_count,
        tag.version()
    );

    Ok(TrackMetadata {
        artist: first_value(tag.artist()),
        album: first_value(tag.album()),
        title: first_value(tag.title()),
        duration,
        format: AudioFormat::Dsf,
    })
}

pub fn parse_header(bytes: &[u8; HEADER_LEN]) -> Result<DsfHeader, MetadataError> {
    if &bytes[0..4] != b"DSD " {
        return Err(MetadataError::InvalidDsf("missing DSD chunk".to_string()));
    }
    if &bytes[28..32] != b"fmt " {
        return Err(MetadataError::InvalidDsf("missing fmt chunk".to_string()));
    }

    let metadata_offset = le_u64(&bytes[20..28]);
    let sample_rate = le_u32(&bytes[56..60]);
    let sample_count = le_u64(&bytes[64..72]);

    if sample_rate == 0 {
        return Err(MetadataError::InvalidDsf("sampling frequency is 0".to_string()));
    }

    Ok(DsfHeader {
        sample_rate,
        sample_count,
        metadata_offset,
    })
}

/// ID3v2.4 separates multiple values with NUL, keep the first one
fn first_value(text: Option<&str>) -> String {
    text.and_then(|t| t.split('\0').next())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn le_u64(b: &[u8]) -> u64 {
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::Version;

    fn id3_tag(version: Version, artist: Option<&str>, album: Option<&str>, title: Option<&str>) -> Vec<u8> {
        let mut tag = Tag::new();
        if let Some(artist) = artist {
            tag.set_artist(artist);
        }
        if let Some(album) = album {
            tag.set_album(album);
        }
        if let Some(title) = title {
            tag.set_title(title);
        }
        let mut bytes = Vec::new();
        tag.write_to(&mut bytes, version).unwrap();
        bytes
    }

    fn to_synchsafe(n: usize) -> [u8; 4] {
        [
            ((n >> 21) & 0x7f) as u8,
            ((n >> 14) & 0x7f) as u8,
            ((n >> 7) & 0x7f) as u8,
            (n & 0x7f) as u8,
        ]
    }

    fn dsf_file(sample_rate: u32, sample_count: u64, tag: Option<&[u8]>) -> Vec<u8> {
        let audio = vec![0x69u8; 4096 * 2 + 12];
        let metadata_offset = match tag {
            Some(_) => (HEADER_LEN + audio.len()) as u64,
            None => 0,
        };
        let total = HEADER_LEN + audio.len() + tag.map(|t| t.len()).unwrap_or(0);

        let mut file = Vec::new();
        file.extend_from_slice(b"DSD ");
        file.extend_from_slice(&28u64.to_le_bytes());
        file.extend_from_slice(&(total as u64).to_le_bytes());
        file.extend_from_slice(&metadata_offset.to_le_bytes());
        file.extend_from_slice(b"fmt ");
        file.extend_from_slice(&52u64.to_le_bytes());
        file.extend_from_slice(&1u32.to_le_bytes()); // version
        file.extend_from_slice(&0u32.to_le_bytes()); // DSD raw
        file.extend_from_slice(&2u32.to_le_bytes()); // stereo
        file.extend_from_slice(&2u32.to_le_bytes()); // channels
        file.extend_from_slice(&sample_rate.to_le_bytes());
        file.extend_from_slice(&1u32.to_le_bytes()); // bits per sample
        file.extend_from_slice(&sample_count.to_le_bytes());
        file.extend_from_slice(&4096u32.to_le_bytes());
        file.extend_from_slice(&0u32.to_le_bytes());
        file.extend_from_slice(&audio);
        if let Some(tag) = tag {
            file.extend_from_slice(tag);
        }
        file
    }

    #[test]
    fn test_read_dsf_with_id3v23() {
        let tag = id3_tag(Version::Id3v23, Some("Miles Davis"), Some("Kind of Blue"), Some("So What"));
        // 2.8224 MHz DSD64, 545.5 seconds
        let data = dsf_file(2_822_400, 2_822_400 * 545 + 1_411_200, Some(&tag));

        let track = read_dsf(&mut Cursor::new(data)).unwrap();
        assert_eq!(track.artist, "Miles Davis");
        assert_eq!(track.album, "Kind of Blue");
        assert_eq!(track.title, "So What");
        assert_eq!(track.duration, Duration::from_millis(545_500));
        assert_eq!(track.format, AudioFormat::Dsf);
    }

    #[test]
    fn test_read_dsf_with_id3v24() {
        let tag = id3_tag(Version::Id3v24, Some("Björk"), None, Some("Jóga"));
        let data = dsf_file(5_644_800, 5_644_800 * 300, Some(&tag));

        let track = read_dsf(&mut Cursor::new(data)).unwrap();
        assert_eq!(track.artist, "Björk");
        assert_eq!(track.title, "Jóga");
        assert_eq!(track.album, "");
        assert_eq!(track.duration, Duration::from_secs(300));
    }

    #[test]
    fn test_id3v24_data_length_indicator() {
        // TIT2 frame with the data length indicator flag set: the 4 byte
        // length precedes the encoding byte
        let text = b"Yesterday";
        let content_len = 1 + text.len();
        let mut frame = b"TIT2".to_vec();
        frame.extend_from_slice(&to_synchsafe(4 + content_len));
        frame.extend_from_slice(&[0x00, 0x01]);
        frame.extend_from_slice(&to_synchsafe(content_len));
        frame.push(3);
        frame.extend_from_slice(text);

        let mut tag = vec![b'I', b'D', b'3', 4, 0, 0];
        tag.extend_from_slice(&to_synchsafe(frame.len()));
        tag.extend_from_slice(&frame);

        let data = dsf_file(2_822_400, 2_822_400 * 125, Some(&tag));
        let track = read_dsf(&mut Cursor::new(data)).unwrap();
        assert_eq!(track.title, "Yesterday");
    }

    #[test]
    fn test_dsf_without_tags() {
        let data = dsf_file(2_822_400, 2_822_400 * 10, None);
        assert!(matches!(read_dsf(&mut Cursor::new(data)), Err(MetadataError::NoTags)));

        // Offset pointing at something that is not an ID3 block
        let data = dsf_file(2_822_400, 2_822_400 * 10, Some(b"not an id3 tag"));
        assert!(matches!(read_dsf(&mut Cursor::new(data)), Err(MetadataError::NoTags)));
    }

    #[test]
    fn test_not_a_dsf_file() {
        let mut data = dsf_file(2_822_400, 100, None);
        data[0..4].copy_from_slice(b"RIFF");
        assert!(matches!(read_dsf(&mut Cursor::new(data)), Err(MetadataError::InvalidDsf(_))));

        let short = vec![0u8; 20];
        assert!(matches!(read_dsf(&mut Cursor::new(short)), Err(MetadataError::InvalidDsf(_))));
    }

    #[test]
    fn test_zero_sample_rate() {
        let data = dsf_file(0, 100, None);
        assert!(matches!(read_dsf(&mut Cursor::new(data)), Err(MetadataError::InvalidDsf(_))));
    }

    #[test]
    fn test_implausible_sample_count() {
        let header = DsfHeader {
            sample_rate: 1,
            sample_count: u64::MAX,
            metadata_offset: 0,
        };
        assert!(matches!(header.duration(), Err(MetadataError::InvalidDsf(_))));

        let tag = id3_tag(Version::Id3v23, Some("Artist"), Some("Album"), Some("Title"));
        let data = dsf_file(1, u64::MAX, Some(&tag));
        assert!(matches!(read_dsf(&mut Cursor::new(data)), Err(MetadataError::InvalidDsf(_))));
    }

    #[test]
    fn test_multi_value_text_keeps_first() {
        assert_eq!(first_value(Some("Simon\0Garfunkel")), "Simon");
        assert_eq!(first_value(Some(" So What ")), "So What");
        assert_eq!(first_value(None), "");
    }
}
