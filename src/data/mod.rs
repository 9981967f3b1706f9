// Data structures for lrcfetch

pub mod stats;
pub mod track;

pub use stats::FetchStats;
pub use track::{AudioFormat, TrackMetadata};
