pub mod audio_metadata;
pub mod dsf;
pub mod http_client;
pub mod lrclib;
pub mod lyrics;
pub mod retry;
